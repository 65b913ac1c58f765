use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnchorError {
    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse anchors: {0}")]
    Parse(String),

    #[error("failed to fetch anchors from {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("all {0} anchor endpoints failed")]
    AllEndpointsFailed(usize),

    #[error("no anchors selected")]
    NoAnchorsSelected,

    #[error("anchor source returned no anchors")]
    NoAnchors,

    #[error("initial anchor refresh failed: {0}")]
    Bootstrap(Box<AnchorError>),

    #[error("anchor service destroyed")]
    Destroyed,

    #[error("verification error: {0}")]
    Verification(#[from] anchor_verification::VerificationError),
}
