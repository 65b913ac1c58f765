//! Consensus selection across independently fetched anchor lists.
//!
//! Lists whose most recent anchor shares a root are taken to describe the
//! same chain state and vote together. The group with the most votes wins;
//! equal votes go to the group whose leading anchor is higher.

use std::collections::BTreeMap;

use anchor_types::{AnchorList, Root};

use crate::AnchorError;

/// Candidate lists agreeing on one leading root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsensusGroup {
    /// The first list seen with this leading root.
    pub anchors: AnchorList,
    /// Number of candidates with this leading root.
    pub votes: usize,
}

impl ConsensusGroup {
    fn leading_height(&self) -> u32 {
        self.anchors.first().map(|a| a.height()).unwrap_or(0)
    }
}

/// Tally candidates into groups keyed by leading root. Empty lists are dropped.
pub fn group_candidates(candidates: Vec<AnchorList>) -> BTreeMap<Root, ConsensusGroup> {
    let mut groups: BTreeMap<Root, ConsensusGroup> = BTreeMap::new();
    for list in candidates {
        let Some(leading) = list.first() else {
            continue;
        };
        match groups.get_mut(&leading.root) {
            Some(group) => group.votes += 1,
            None => {
                groups.insert(
                    leading.root.clone(),
                    ConsensusGroup {
                        anchors: list,
                        votes: 1,
                    },
                );
            }
        }
    }
    groups
}

/// Pick the anchor list most candidates agree on.
pub fn select_anchors(candidates: Vec<AnchorList>) -> Result<AnchorList, AnchorError> {
    let total = candidates.len();
    let groups = group_candidates(candidates);

    // BTreeMap iteration is root-ordered, so a full tie resolves the same way
    // regardless of response order.
    let (root, winner) = groups
        .into_iter()
        .max_by(|(_, a), (_, b)| {
            a.votes
                .cmp(&b.votes)
                .then(a.leading_height().cmp(&b.leading_height()))
        })
        .ok_or(AnchorError::NoAnchorsSelected)?;

    tracing::debug!(
        %root,
        votes = winner.votes,
        candidates = total,
        height = winner.leading_height(),
        "selected anchor consensus group"
    );
    Ok(winner.anchors)
}
