//! Anchor fixtures.

use anchor_types::{Anchor, AnchorList};

/// An anchor whose block hash is derived from its height.
pub fn anchor_at(root: &str, height: u32) -> Anchor {
    Anchor::new(root, format!("{height:064x}"), height)
}

/// `count` anchors ending at `tip`, most recent first, with roots derived from the height.
pub fn anchor_chain(tip: u32, count: u32) -> AnchorList {
    (0..count)
        .map(|i| {
            let height = tip - i;
            anchor_at(&format!("{height:08x}"), height)
        })
        .collect()
}
