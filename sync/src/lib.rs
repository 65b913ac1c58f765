//! Trust anchor synchronization.
//!
//! Keeps a locally cached set of blockchain checkpoints ("anchors") fresh and
//! verifies third-party proofs against it:
//! - [`source`]: where candidate anchor lists come from (file, endpoints, fixed list)
//! - [`consensus`]: majority selection across independently fetched lists
//! - [`store`]: the active anchor set, swapped whole on every refresh
//! - [`scheduler`]: initial load, periodic and file-change refreshes, retries, teardown
//! - [`service`]: the public surface, including `verify_put` receipts

pub mod cancel;
pub mod config;
pub mod consensus;
pub mod error;
pub mod logging;
pub mod scheduler;
pub mod service;
pub mod source;
pub mod store;
pub mod watcher;

pub use config::{AnchorConfig, RefreshTiming};
pub use consensus::select_anchors;
pub use error::AnchorError;
pub use logging::{init_logging, LogFormat};
pub use scheduler::{RefreshScheduler, SchedulerState};
pub use service::AnchorService;
pub use source::AnchorSource;
pub use store::{AnchorStatus, AnchorStore, ReplaceOutcome, STALE_WINDOW};
