//! Proof verification capability.
//!
//! The cryptography behind anchor proofs (subtree inclusion proofs and message
//! signatures) lives outside this workspace. This crate only fixes the seam:
//! a [`VerifierFactory`] binds an [`AnchorVerifier`] to a concrete anchor set,
//! and a verified proof yields a [`ValidatedSubtree`] that callers can search.

pub mod error;
pub mod method;

pub use error::VerificationError;
pub use method::{AnchorVerifier, ValidatedSubtree, VerifierFactory};
