//! Verification receipts.

use serde::{Deserialize, Serialize};

use crate::{Root, SpaceOut};

/// Result of a successful verification.
///
/// Carries the anchor height (`proof_seq`) the proof was validated against,
/// so callers can later ask whether that anchor version has gone stale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub proof_seq: u32,
    pub root: Vec<u8>,
    pub spaceout: SpaceOut,
}

impl Receipt {
    pub fn root_id(&self) -> Root {
        Root::from_bytes(&self.root)
    }
}
