//! Splits a raw script into ordered pages.

use crate::domain::{RawScript, Unit};

/// Split `raw` on every literal occurrence of `delimiter`.
///
/// Fragments are trimmed, empty ones are dropped, and the survivors get
/// contiguous 1-based indices in split order. A script without the delimiter
/// yields a single unit holding the whole trimmed text.
pub fn segment(raw: &RawScript, delimiter: &str) -> Vec<Unit> {
    let text = raw.as_str();

    let fragments: Box<dyn Iterator<Item = &str>> = if delimiter.is_empty() {
        Box::new(std::iter::once(text))
    } else {
        Box::new(text.split(delimiter))
    };

    fragments
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .enumerate()
        .map(|(i, fragment)| Unit {
            index: i + 1,
            text: fragment.to_string(),
        })
        .collect()
}
