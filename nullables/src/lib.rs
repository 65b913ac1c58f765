//! Nullable infrastructure for deterministic testing.
//!
//! The proof cryptography the anchor service relies on is external, so tests
//! plug in the backend defined here instead. It:
//! - Accepts proofs built with [`NullProof`] (plain JSON, no real cryptography)
//! - Checks signatures with a SHA-256 stand-in ([`null_sign`])
//! - Records which anchor sets it was bound to
//! - Never touches the filesystem or network
//!
//! Usage: pass a [`NullVerifierFactory`] wherever a `VerifierFactory` is expected.

pub mod anchors;
pub mod verifier;

pub use anchors::{anchor_at, anchor_chain};
pub use verifier::{null_sign, NullProof, NullVerifier, NullVerifierFactory};
