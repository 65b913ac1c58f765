//! Objects addressed by verification requests.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of the object a caller wants verified (a space name or outpoint).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target(String);

impl Target {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An output proven to exist under a validated root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceOut {
    pub target: Target,
    /// Locking script the message signature is checked against.
    pub script_pubkey: Vec<u8>,
    pub value: u64,
}
