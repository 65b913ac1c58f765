//! Fundamental types for anchor synchronization.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! trust anchors and their block references, root identifiers, verification
//! targets and the receipts handed back to callers.

pub mod anchor;
pub mod error;
pub mod hash;
pub mod receipt;
pub mod space;

pub use anchor::{Anchor, AnchorList, BlockRef};
pub use error::TypesError;
pub use hash::Root;
pub use receipt::Receipt;
pub use space::{SpaceOut, Target};
