use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("invalid proof: {0}")]
    InvalidProof(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("no matching object for target {0}")]
    NoMatchingObject(String),

    #[error("unknown proof version: root {0} is not anchored")]
    UnknownProofVersion(String),

    #[error("verifier backend error: {0}")]
    Backend(String),
}
