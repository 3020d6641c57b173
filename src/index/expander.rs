//! Prefix expansion for indexed names
//!
//! A name is indexed under each of its proper prefixes that are at least
//! three characters long. Boundaries are counted in `char`s so multi-byte
//! names are never split inside a code point.

/// Names with this many characters or fewer are not indexed
pub const MAX_UNINDEXED_CHARS: usize = 3;

/// Shortest prefix written as a key
pub const MIN_PREFIX_CHARS: usize = 3;

/// A prefix key and the name filed under it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrefixPair<'a> {
    pub prefix: String,
    pub name: &'a str,
}

/// Expand `name` into its (prefix, name) pairs
///
/// Produces prefixes of 3 through `len - 1` characters. The full name is
/// never a key of its own, and names of 3 characters or fewer yield nothing.
pub fn expand(name: &str) -> Vec<PrefixPair<'_>> {
    let char_count = name.chars().count();
    if char_count <= MAX_UNINDEXED_CHARS {
        return Vec::new();
    }

    let mut chars = name.chars();
    let mut prefix: String = chars.by_ref().take(MIN_PREFIX_CHARS - 1).collect();

    // Stop before the last char so the full name is not emitted
    chars
        .take(char_count - MIN_PREFIX_CHARS)
        .map(|c| {
            prefix.push(c);
            PrefixPair {
                prefix: prefix.clone(),
                name,
            }
        })
        .collect()
}
