use proptest::prelude::*;

use std::sync::Arc;

use anchor_nullables::{anchor_at, NullVerifierFactory};
use anchor_sync::{select_anchors, AnchorStore, STALE_WINDOW};
use anchor_types::{AnchorList, Root};

fn candidate(root_idx: u8, height: u32) -> AnchorList {
    vec![anchor_at(&format!("{root_idx:02x}"), height)]
}

proptest! {
    /// Selection does not depend on the order responses arrived in.
    #[test]
    fn selection_is_order_independent(
        picks in prop::collection::vec((0u8..4, 1u32..50), 1..8),
        rotate in 0usize..8,
    ) {
        // one height per root so identical roots mean identical lists
        let lists: Vec<AnchorList> = picks
            .iter()
            .map(|(root, _)| candidate(*root, picks.iter().find(|(r, _)| r == root).unwrap().1))
            .collect();
        let mut rotated = lists.clone();
        rotated.rotate_left(rotate % lists.len());
        let mut reversed = lists.clone();
        reversed.reverse();

        let expected = select_anchors(lists).unwrap();
        prop_assert_eq!(select_anchors(rotated).unwrap(), expected.clone());
        prop_assert_eq!(select_anchors(reversed).unwrap(), expected);
    }

    /// The winner always has at least as many votes as any other group.
    #[test]
    fn selection_follows_majority(
        picks in prop::collection::vec(0u8..3, 1..10),
    ) {
        let lists: Vec<AnchorList> = picks.iter().map(|r| candidate(*r, 10)).collect();
        let winner = select_anchors(lists).unwrap();
        let votes = |root: &Root| picks.iter().filter(|r| &Root::new(format!("{:02x}", r)) == root).count();
        let winner_votes = votes(&winner[0].root);
        for r in 0u8..3 {
            let other_votes = votes(&Root::new(format!("{:02x}", r)));
            prop_assert!(winner_votes >= other_votes);
        }
    }

    /// Staleness boundary sits at the ninth-oldest anchor, or nowhere for small sets.
    #[test]
    fn staleness_threshold(
        heights in prop::collection::btree_set(1u32..10_000, 1..30),
        probe in 0u32..10_000,
    ) {
        let store = AnchorStore::new(Arc::new(NullVerifierFactory::new()));
        let anchors: AnchorList = heights
            .iter()
            .map(|h| anchor_at(&format!("{h:08x}"), *h))
            .collect();
        store.replace(anchors).unwrap();

        let ascending: Vec<u32> = heights.into_iter().collect();
        if ascending.len() > STALE_WINDOW {
            let threshold = ascending[STALE_WINDOW - 1];
            prop_assert_eq!(store.is_stale(probe), probe < threshold);
        } else {
            prop_assert!(!store.is_stale(probe));
        }
        for h in &ascending {
            prop_assert_eq!(store.lookup_version(&Root::new(format!("{h:08x}"))), Some(*h));
        }
    }
}
