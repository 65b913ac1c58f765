//! Root identifiers — the commitment a proof is checked against.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypesError;

/// Hex identifier of a verification root.
///
/// Anchor files carry roots as hex strings; proofs resolve to raw root bytes.
/// Both are normalized to lower-case hex so the two forms compare equal.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Root(String);

impl Root {
    pub fn new(hex_id: impl Into<String>) -> Self {
        Self(hex_id.into().to_ascii_lowercase())
    }

    /// Identify raw root bytes produced by a validated proof.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Decode the identifier back into raw bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TypesError> {
        hex::decode(&self.0).map_err(|_| TypesError::InvalidRootHex(self.0.clone()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Root {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Root {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<Root> for String {
    fn from(root: Root) -> Self {
        root.0
    }
}

impl fmt::Debug for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = self.0.get(..8).unwrap_or(&self.0);
        write!(f, "Root({short})")
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
