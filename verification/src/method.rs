//! Pluggable verification capability traits.
//!
//! The anchor service never inspects proofs itself. Whatever backend is
//! plugged in decides what a valid proof or signature is; the service only
//! relies on the contracts below.

use std::sync::Arc;

use anchor_types::{Anchor, SpaceOut, Target};

use crate::VerificationError;

/// The structure a proof was validated into.
pub trait ValidatedSubtree: Send {
    /// Locate the object addressed by `target`, if the proof covers it.
    fn find_object(&self, target: &Target) -> Option<SpaceOut>;

    /// Raw root the proof was validated against.
    fn root(&self) -> Vec<u8>;
}

/// A verifier bound to one anchor set.
pub trait AnchorVerifier: Send + Sync {
    /// Check a serialized proof against the bound anchors.
    fn verify_proof(&self, proof: &[u8]) -> Result<Box<dyn ValidatedSubtree>, VerificationError>;

    /// Check that `signature` over `message` was produced by the owner of `object`.
    fn verify_message(
        &self,
        object: &SpaceOut,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), VerificationError>;
}

/// Builds verifiers from anchor sets.
///
/// Called once per successful refresh with the full sorted anchor set, most
/// recent first.
pub trait VerifierFactory: Send + Sync {
    fn build(&self, anchors: &[Anchor]) -> Result<Arc<dyn AnchorVerifier>, VerificationError>;

    /// Human-readable name of this backend.
    fn name(&self) -> &str;
}
