//! Merge policies for folding a remote snapshot into the local collection.
//!
//! Both policies are pure: the result depends only on the arguments.
//!
//! # Algorithm
//!
//! 1. Local records whose id is absent remotely pass through unchanged
//! 2. Every remote record is taken, unless a `local` resolution names its id
//!    and a local version exists
//! 3. The result is assembled by id; a duplicate id at this point is an
//!    internal invariant violation and aborts the merge

use crate::{error::Result, Choice, Collection, Error, Quote, QuoteId, Resolution};
use std::collections::HashMap;

/// Default policy: the remote version wins every collision.
pub fn merge_server_wins(local: &Collection, remote: &Collection) -> Result<Collection> {
    merge_with_resolutions(local, remote, &[])
}

/// Apply per-id choices; ids without a choice fall back to the remote version.
///
/// A `local` choice for an id that only exists remotely keeps the remote
/// record, since there is no local version to keep.
pub fn merge_with_resolutions(
    local: &Collection,
    remote: &Collection,
    resolutions: &[Resolution],
) -> Result<Collection> {
    let choices: HashMap<QuoteId, Choice> =
        resolutions.iter().map(|r| (r.id, r.choice)).collect();

    let kept_local = local.iter().filter(|q| !remote.contains(q.id));

    let from_remote = remote.iter().map(|theirs| {
        match (choices.get(&theirs.id), local.get(theirs.id)) {
            (Some(Choice::Local), Some(mine)) => mine,
            _ => theirs,
        }
    });

    assemble(kept_local.chain(from_remote))
}

/// Build the merged collection, refusing duplicate ids.
fn assemble<'a>(quotes: impl Iterator<Item = &'a Quote>) -> Result<Collection> {
    let mut merged = Collection::new();
    for quote in quotes {
        merged.insert_new(quote.clone()).map_err(|e| match e {
            Error::QuoteAlreadyExists(id) => Error::MergeInconsistency(id),
            other => other,
        })?;
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect_conflicts;

    fn collection(quotes: Vec<Quote>) -> Collection {
        Collection::from_unique(quotes).unwrap()
    }

    #[test]
    fn server_wins_scenario() {
        let local = collection(vec![Quote::new(1, "A", "X")]);
        let remote = collection(vec![Quote::new(1, "B", "X")]);

        let merged = merge_server_wins(&local, &remote).unwrap();

        assert_eq!(merged.to_vec(), vec![Quote::new(1, "B", "X")]);
    }

    #[test]
    fn local_only_records_survive() {
        let local = collection(vec![Quote::new(1, "A", "X"), Quote::new(2, "B", "Y")]);
        let remote = collection(vec![Quote::new(1, "A2", "X"), Quote::new(10, "R", "Server")]);

        let merged = merge_server_wins(&local, &remote).unwrap();

        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get(1).unwrap().text, "A2");
        assert_eq!(merged.get(2), local.get(2));
        assert_eq!(merged.get(10), remote.get(10));
    }

    #[test]
    fn empty_remote_keeps_everything() {
        let local = collection(vec![Quote::new(1, "A", "X")]);
        let merged = merge_server_wins(&local, &Collection::new()).unwrap();
        assert_eq!(merged, local);
    }

    #[test]
    fn local_choice_keeps_local_version() {
        let local = collection(vec![Quote::new(1, "A", "X"), Quote::new(2, "B", "X")]);
        let remote = collection(vec![Quote::new(1, "A2", "X"), Quote::new(2, "B2", "X")]);

        let merged =
            merge_with_resolutions(&local, &remote, &[Resolution::local(1)]).unwrap();

        assert_eq!(merged.get(1).unwrap().text, "A");
        assert_eq!(merged.get(2).unwrap().text, "B2");
    }

    #[test]
    fn server_choice_matches_default() {
        let local = collection(vec![Quote::new(1, "A", "X")]);
        let remote = collection(vec![Quote::new(1, "A2", "X")]);

        let explicit =
            merge_with_resolutions(&local, &remote, &[Resolution::server(1)]).unwrap();
        let default = merge_server_wins(&local, &remote).unwrap();

        assert_eq!(explicit, default);
    }

    #[test]
    fn local_choice_without_local_version_keeps_remote() {
        let local = Collection::new();
        let remote = collection(vec![Quote::new(5, "R", "Server")]);

        let merged =
            merge_with_resolutions(&local, &remote, &[Resolution::local(5)]).unwrap();

        assert_eq!(merged.get(5).unwrap().text, "R");
    }

    #[test]
    fn merge_deterministic() {
        let local = collection(vec![Quote::new(2, "B", "X"), Quote::new(1, "A", "X")]);
        let remote = collection(vec![Quote::new(3, "C", "X"), Quote::new(1, "A2", "X")]);

        let mut results = Vec::new();
        for _ in 0..10 {
            results.push(merge_server_wins(&local, &remote).unwrap().to_vec());
        }

        assert!(results.windows(2).all(|w| w[0] == w[1]));
        let ids: Vec<_> = results[0].iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn assemble_rejects_duplicates() {
        let a = Quote::new(1, "A", "X");
        let b = Quote::new(1, "B", "X");
        assert_eq!(
            assemble([&a, &b].into_iter()),
            Err(Error::MergeInconsistency(1))
        );
    }

    #[test]
    fn conflicts_resolved_by_default_merge() {
        let local = collection(vec![Quote::new(1, "A", "X"), Quote::new(2, "B", "X")]);
        let remote = collection(vec![Quote::new(1, "A2", "X"), Quote::new(2, "B", "X")]);

        let merged = merge_server_wins(&local, &remote).unwrap();

        assert!(detect_conflicts(&merged, &remote).is_empty());
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_quote(id: QuoteId) -> impl Strategy<Value = Quote> {
            (
                prop_oneof![Just("A"), Just("B"), Just("C")],
                prop_oneof![Just("X"), Just("Y")],
            )
                .prop_map(move |(text, category)| Quote::new(id, text, category))
        }

        fn arb_collection(ids: std::ops::Range<QuoteId>) -> impl Strategy<Value = Collection> {
            prop::collection::btree_set(ids, 0..12)
                .prop_flat_map(|ids| {
                    ids.into_iter()
                        .map(arb_quote)
                        .collect::<Vec<_>>()
                })
                .prop_map(|quotes| Collection::from_unique(quotes).unwrap())
        }

        proptest! {
            #[test]
            fn prop_disjoint_merge_keeps_everything(
                local in arb_collection(0..50),
                remote in arb_collection(50..100),
            ) {
                let merged = merge_server_wins(&local, &remote).unwrap();

                prop_assert_eq!(merged.len(), local.len() + remote.len());
                for quote in local.iter().chain(remote.iter()) {
                    prop_assert_eq!(merged.get(quote.id), Some(quote));
                }
            }

            #[test]
            fn prop_remote_version_wins_collisions(
                local in arb_collection(0..20),
                remote in arb_collection(0..20),
            ) {
                let conflicts = detect_conflicts(&local, &remote);
                let merged = merge_server_wins(&local, &remote).unwrap();

                for quote in remote.iter() {
                    prop_assert_eq!(merged.get(quote.id), Some(quote));
                }
                for quote in local.iter() {
                    let colliding = remote.contains(quote.id);
                    let reported = conflicts.iter().filter(|c| c.id == quote.id).count();
                    let differs = colliding && remote.get(quote.id).unwrap().content_differs(quote);
                    prop_assert_eq!(reported, usize::from(differs));
                }
            }

            #[test]
            fn prop_merge_idempotent(
                local in arb_collection(0..20),
                remote in arb_collection(0..20),
            ) {
                let once = merge_server_wins(&local, &remote).unwrap();
                let twice = merge_server_wins(&once, &remote).unwrap();
                prop_assert_eq!(once, twice);
            }

            #[test]
            fn prop_local_choice_applies_only_to_its_id(
                local in arb_collection(0..20),
                remote in arb_collection(0..20),
            ) {
                let conflicts = detect_conflicts(&local, &remote);
                prop_assume!(!conflicts.is_empty());
                let chosen = conflicts[0].id;

                let merged = merge_with_resolutions(
                    &local,
                    &remote,
                    &[Resolution::local(chosen)],
                ).unwrap();

                prop_assert_eq!(merged.get(chosen), local.get(chosen));
                for conflict in conflicts.iter().skip(1) {
                    prop_assert_eq!(merged.get(conflict.id), Some(&conflict.server));
                }
            }
        }
    }
}
