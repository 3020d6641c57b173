//! Line-oriented decoding of the catalog snapshot
//!
//! The snapshot is one JSON document laid out one row per line:
//!
//! ```text
//! {"total_rows":1161662,"offset":0,"rows":[
//! {"id":"redis","key":"redis","value":{"rev":"1-abc"}},
//! {"id":"react","key":"react","value":{"rev":"7-def"}}
//! ]}
//! ```
//!
//! The header line is dropped. Each row line is parsed on its own after
//! trimming whitespace and one trailing comma. The closing `]}` line fails
//! to parse like any other fragment but is expected, so it is dropped too.
//! Every other line that does not parse, blank ones included, is reported
//! as malformed.

use futures::future;
use futures::stream::{self, Stream, StreamExt};

use crate::error::{FetchError, MalformedRecordError, SourceError};
use crate::source::traits::{DocumentStream, SourceDocument};

/// Prefix of the envelope's closing fragment
const TERMINAL_FRAGMENT: &[u8] = b"]}";

/// Outcome of decoding one row line
#[derive(Debug)]
pub enum ParsedLine {
    Document(SourceDocument),
    /// The closing fragment
    Skip,
    Malformed(MalformedRecordError),
}

/// Decode one row line of the snapshot
pub fn parse_line(raw: &[u8]) -> ParsedLine {
    let line = raw.trim_ascii();
    let line = line.strip_suffix(b",").unwrap_or(line);

    match serde_json::from_slice::<SourceDocument>(line) {
        Ok(doc) => ParsedLine::Document(doc),
        Err(_) if line.starts_with(TERMINAL_FRAGMENT) => ParsedLine::Skip,
        Err(source) => ParsedLine::Malformed(MalformedRecordError {
            line: String::from_utf8_lossy(line).into_owned(),
            source,
        }),
    }
}

struct LineSplitter<S> {
    chunks: S,
    buf: Vec<u8>,
    done: bool,
}

/// Split a stream of byte chunks into `\n`-terminated lines
///
/// The terminator is kept. A trailing fragment without a newline is yielded
/// as a final line. After a chunk error the stream ends.
pub fn split_lines<S, B>(chunks: S) -> impl Stream<Item = Result<Vec<u8>, FetchError>>
where
    S: Stream<Item = Result<B, FetchError>> + Unpin,
    B: AsRef<[u8]>,
{
    let state = LineSplitter {
        chunks,
        buf: Vec::new(),
        done: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(pos) = st.buf.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = st.buf.drain(..=pos).collect();
                return Some((Ok(line), st));
            }
            if st.done {
                if st.buf.is_empty() {
                    return None;
                }
                let line = std::mem::take(&mut st.buf);
                return Some((Ok(line), st));
            }
            match st.chunks.next().await {
                Some(Ok(chunk)) => st.buf.extend_from_slice(chunk.as_ref()),
                Some(Err(e)) => {
                    st.done = true;
                    st.buf.clear();
                    return Some((Err(e), st));
                }
                None => st.done = true,
            }
        }
    })
}

/// Turn a raw snapshot byte stream into a document stream
pub fn documents<S, B>(chunks: S) -> DocumentStream
where
    S: Stream<Item = Result<B, FetchError>> + Unpin + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    split_lines(chunks)
        .enumerate()
        .filter_map(|(index, line)| {
            let item = match line {
                Err(e) => Some(Err(SourceError::Fetch(e))),
                // Header: `{"total_rows":N,"offset":N,"rows":[`
                Ok(_) if index == 0 => None,
                Ok(line) => match parse_line(&line) {
                    ParsedLine::Document(doc) => Some(Ok(doc)),
                    ParsedLine::Skip => None,
                    ParsedLine::Malformed(e) => Some(Err(SourceError::Malformed(e))),
                },
            };
            future::ready(item)
        })
        .boxed()
}
