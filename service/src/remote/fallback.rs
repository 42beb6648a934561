//! Built-in data used when the remote cannot be reached.

use quotesync_engine::{remote_id, Collection, Quote};

use super::REMOTE_CATEGORY;

/// The fixed collection returned by a failed pull.
///
/// Ids sit in the remote range so the set merges like any other pull and
/// re-merging it is a no-op.
pub fn fallback_collection() -> Collection {
    let quotes = [
        (1, "Code is like humor. When you have to explain it, it's bad."),
        (2, "First, solve the problem. Then, write the code."),
        (3, "Experience is the name everyone gives to their mistakes."),
    ];

    let mut collection = Collection::new();
    for (raw_id, text) in quotes {
        collection.insert(Quote::new(remote_id(raw_id), text, REMOTE_CATEGORY));
    }
    collection
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_remote_and_valid() {
        let fallback = fallback_collection();
        assert_eq!(fallback.len(), 3);
        for quote in fallback.iter() {
            assert!(quote.is_remote());
            assert!(quote.validate().is_ok());
        }
    }
}
