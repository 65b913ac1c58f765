//! Trust anchors — checkpoints pairing a root with the block it was observed at.

use serde::{Deserialize, Serialize};

use crate::Root;

/// The block an anchor root was committed in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockRef {
    /// Hex block hash.
    pub hash: String,
    /// Block height.
    pub height: u32,
}

/// A trusted checkpoint.
///
/// Wire shape: `{ "root": "<hex>", "block": { "hash": "<hex>", "height": <int> } }`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    pub root: Root,
    pub block: BlockRef,
}

impl Anchor {
    pub fn new(root: impl Into<Root>, hash: impl Into<String>, height: u32) -> Self {
        Self {
            root: root.into(),
            block: BlockRef {
                hash: hash.into(),
                height,
            },
        }
    }

    pub fn height(&self) -> u32 {
        self.block.height
    }
}

/// An ordered anchor list as returned by one source. Most recent first by convention.
pub type AnchorList = Vec<Anchor>;
