//! Nullable verifier — deterministic proofs and signatures for testing.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use anchor_types::{Anchor, Root, SpaceOut, Target};
use anchor_verification::{AnchorVerifier, ValidatedSubtree, VerificationError, VerifierFactory};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A proof understood by [`NullVerifier`]: a root plus the objects it covers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NullProof {
    pub root: Root,
    pub objects: Vec<SpaceOut>,
}

impl NullProof {
    pub fn new(root: impl Into<Root>) -> Self {
        Self {
            root: root.into(),
            objects: Vec::new(),
        }
    }

    pub fn with_object(mut self, object: SpaceOut) -> Self {
        self.objects.push(object);
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}

/// Signature stand-in: SHA-256 over `script_pubkey || message`.
pub fn null_sign(script_pubkey: &[u8], message: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(script_pubkey);
    hasher.update(message);
    hasher.finalize().to_vec()
}

struct NullSubtree {
    root: Vec<u8>,
    objects: Vec<SpaceOut>,
}

impl ValidatedSubtree for NullSubtree {
    fn find_object(&self, target: &Target) -> Option<SpaceOut> {
        self.objects.iter().find(|o| &o.target == target).cloned()
    }

    fn root(&self) -> Vec<u8> {
        self.root.clone()
    }
}

/// A verifier bound to a fixed set of anchor roots.
pub struct NullVerifier {
    roots: HashSet<Root>,
    accept_unanchored: bool,
}

impl NullVerifier {
    pub fn new(anchors: &[Anchor], accept_unanchored: bool) -> Self {
        Self {
            roots: anchors.iter().map(|a| a.root.clone()).collect(),
            accept_unanchored,
        }
    }
}

impl AnchorVerifier for NullVerifier {
    fn verify_proof(&self, proof: &[u8]) -> Result<Box<dyn ValidatedSubtree>, VerificationError> {
        let proof: NullProof = serde_json::from_slice(proof)
            .map_err(|e| VerificationError::InvalidProof(format!("malformed proof: {e}")))?;

        if !self.accept_unanchored && !self.roots.contains(&proof.root) {
            return Err(VerificationError::InvalidProof(format!(
                "root {} is not among the bound anchors",
                proof.root
            )));
        }

        let root = proof
            .root
            .to_bytes()
            .map_err(|e| VerificationError::InvalidProof(e.to_string()))?;

        Ok(Box::new(NullSubtree {
            root,
            objects: proof.objects,
        }))
    }

    fn verify_message(
        &self,
        object: &SpaceOut,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), VerificationError> {
        if null_sign(&object.script_pubkey, message) == signature {
            Ok(())
        } else {
            Err(VerificationError::InvalidSignature(format!(
                "signature does not match owner of {}",
                object.target
            )))
        }
    }
}

/// Factory producing [`NullVerifier`]s and recording every anchor set it saw.
#[derive(Default)]
pub struct NullVerifierFactory {
    accept_unanchored: bool,
    builds: Mutex<Vec<Vec<Root>>>,
}

impl NullVerifierFactory {
    /// Proofs must reference a root among the bound anchors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept any well-formed proof, even against roots the verifier was not bound to.
    pub fn accept_unanchored() -> Self {
        Self {
            accept_unanchored: true,
            builds: Mutex::new(Vec::new()),
        }
    }

    pub fn build_count(&self) -> usize {
        self.builds.lock().map(|b| b.len()).unwrap_or(0)
    }

    /// Roots of the most recent anchor set, in the order they were bound.
    pub fn last_bound_roots(&self) -> Option<Vec<Root>> {
        self.builds.lock().ok().and_then(|b| b.last().cloned())
    }
}

impl VerifierFactory for NullVerifierFactory {
    fn build(&self, anchors: &[Anchor]) -> Result<Arc<dyn AnchorVerifier>, VerificationError> {
        if let Ok(mut builds) = self.builds.lock() {
            builds.push(anchors.iter().map(|a| a.root.clone()).collect());
        }
        Ok(Arc::new(NullVerifier::new(anchors, self.accept_unanchored)))
    }

    fn name(&self) -> &str {
        "null-verifier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor_at;

    fn object(name: &str) -> SpaceOut {
        SpaceOut {
            target: Target::new(name),
            script_pubkey: vec![0x51, 0x20, 0xab],
            value: 1_000,
        }
    }

    #[test]
    fn proof_against_bound_root_verifies() {
        let verifier = NullVerifier::new(&[anchor_at("aa", 100)], false);
        let proof = NullProof::new("aa").with_object(object("@bitcoin")).to_bytes();
        let subtree = verifier.verify_proof(&proof).unwrap();
        assert_eq!(subtree.root(), vec![0xaa]);
        assert!(subtree.find_object(&Target::new("@bitcoin")).is_some());
        assert!(subtree.find_object(&Target::new("@other")).is_none());
    }

    #[test]
    fn proof_against_foreign_root_is_rejected_unless_permissive() {
        let anchors = [anchor_at("aa", 100)];
        let proof = NullProof::new("bb").to_bytes();
        let strict = NullVerifier::new(&anchors, false);
        assert!(matches!(
            strict.verify_proof(&proof),
            Err(VerificationError::InvalidProof(_))
        ));
        let permissive = NullVerifier::new(&anchors, true);
        assert!(permissive.verify_proof(&proof).is_ok());
    }

    #[test]
    fn malformed_proof_is_rejected() {
        let verifier = NullVerifier::new(&[], true);
        assert!(verifier.verify_proof(b"not json").is_err());
    }

    #[test]
    fn signature_check() {
        let verifier = NullVerifier::new(&[], false);
        let out = object("@bitcoin");
        let sig = null_sign(&out.script_pubkey, b"hello");
        assert!(verifier.verify_message(&out, b"hello", &sig).is_ok());
        assert!(matches!(
            verifier.verify_message(&out, b"tampered", &sig),
            Err(VerificationError::InvalidSignature(_))
        ));
    }

    #[test]
    fn factory_records_bound_anchor_sets() {
        let factory = NullVerifierFactory::new();
        factory.build(&[anchor_at("aa", 2), anchor_at("bb", 1)]).unwrap();
        factory.build(&[anchor_at("cc", 3)]).unwrap();
        assert_eq!(factory.build_count(), 2);
        assert_eq!(factory.last_bound_roots(), Some(vec![Root::new("cc")]));
    }
}
