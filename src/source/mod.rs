//! Catalog snapshot sources
//!
//! A `DocumentSource` hands the index builder a fresh, lazily decoded
//! sequence of catalog entries on every build.

mod catalog;
mod lines;
mod traits;

pub use catalog::{HttpCatalogSource, StaticCatalog};
pub use lines::{documents, parse_line, split_lines, ParsedLine};
pub use traits::{DocumentSource, DocumentStream, SourceDocument};
