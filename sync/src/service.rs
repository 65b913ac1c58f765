//! The public anchor service: refreshed trust anchors plus verification receipts.

use std::sync::Arc;

use anchor_types::{Receipt, Root, Target};
use anchor_verification::{VerificationError, VerifierFactory};

use crate::scheduler::{RefreshScheduler, SchedulerState};
use crate::source::AnchorSource;
use crate::store::{AnchorStatus, AnchorStore, ReplaceOutcome};
use crate::{AnchorConfig, AnchorError};

/// Keeps an anchor set fresh and verifies proofs against it.
///
/// Created with [`AnchorService::create`], which does not return until an
/// initial anchor set is loaded (or fails). Call [`AnchorService::destroy`]
/// to stop background refreshes; dropping the service does the same.
pub struct AnchorService {
    store: Arc<AnchorStore>,
    scheduler: RefreshScheduler,
}

impl AnchorService {
    pub async fn create(
        config: AnchorConfig,
        factory: Arc<dyn VerifierFactory>,
    ) -> Result<Self, AnchorError> {
        let source = AnchorSource::from_config(&config)?;
        let store = Arc::new(AnchorStore::new(factory));
        let scheduler = RefreshScheduler::new(source, Arc::clone(&store), config.timing());

        scheduler.start().await?;
        tracing::info!(
            backend = store.verifier_backend(),
            anchors = store.status().anchors,
            "anchor service ready"
        );
        Ok(Self { store, scheduler })
    }

    /// Height of the anchor with this root, if it is in the active set.
    pub fn get_proof_seq(&self, root: &Root) -> Option<u32> {
        self.store.lookup_version(root)
    }

    /// Whether an anchor at `height` is too old to trust.
    pub fn is_stale(&self, height: u32) -> bool {
        self.store.is_stale(height)
    }

    pub fn status(&self) -> AnchorStatus {
        self.store.status()
    }

    pub fn state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Refresh now, outside the timer.
    pub async fn refresh(&self) -> Result<ReplaceOutcome, AnchorError> {
        self.scheduler.refresh().await
    }

    /// Verify that the owner of `target` signed `message`, using `proof` to
    /// establish who that owner is.
    ///
    /// The anchor snapshot is captured once on entry; a refresh completing
    /// mid-call does not affect the result.
    pub fn verify_put(
        &self,
        target: &Target,
        message: &[u8],
        signature: &[u8],
        proof: &[u8],
    ) -> Result<Receipt, AnchorError> {
        let snapshot = self.store.snapshot();
        let verifier = snapshot.verifier().ok_or(AnchorError::NoAnchors)?;

        let subtree = verifier.verify_proof(proof).map_err(|e| {
            tracing::debug!(%target, error = %e, "proof rejected");
            e
        })?;

        let spaceout = subtree
            .find_object(target)
            .ok_or_else(|| VerificationError::NoMatchingObject(target.to_string()))?;

        verifier
            .verify_message(&spaceout, message, signature)
            .map_err(|e| {
                tracing::debug!(%target, error = %e, "message signature rejected");
                e
            })?;

        let root = subtree.root();
        let root_id = Root::from_bytes(&root);
        let proof_seq = snapshot.lookup_version(&root_id).ok_or_else(|| {
            tracing::warn!(%target, root = %root_id, "proof verified against unknown anchor");
            VerificationError::UnknownProofVersion(root_id.to_string())
        })?;

        Ok(Receipt {
            proof_seq,
            root,
            spaceout,
        })
    }

    /// Stop all refresh triggers. Idempotent.
    pub fn destroy(&self) {
        self.scheduler.destroy();
    }

    /// Whether no background timer, watcher or refresh is still running.
    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_nullables::{anchor_at, null_sign, NullProof, NullVerifierFactory};
    use anchor_types::SpaceOut;

    fn spaceout(name: &str) -> SpaceOut {
        SpaceOut {
            target: Target::new(name),
            script_pubkey: vec![0x51, 0x20, 0x01, 0x02],
            value: 662,
        }
    }

    async fn service(factory: NullVerifierFactory) -> AnchorService {
        let config = AnchorConfig::with_static(vec![anchor_at("aa", 100), anchor_at("bb", 90)]);
        AnchorService::create(config, Arc::new(factory)).await.unwrap()
    }

    #[tokio::test]
    async fn verify_put_returns_receipt_for_anchored_root() {
        let service = service(NullVerifierFactory::new()).await;
        let out = spaceout("@bitcoin");
        let proof = NullProof::new("aa").with_object(out.clone()).to_bytes();
        let sig = null_sign(&out.script_pubkey, b"zone update");

        let receipt = service
            .verify_put(&Target::new("@bitcoin"), b"zone update", &sig, &proof)
            .unwrap();
        assert_eq!(receipt.proof_seq, 100);
        assert_eq!(receipt.root, vec![0xaa]);
        assert_eq!(receipt.spaceout, out);
        assert_eq!(service.get_proof_seq(&receipt.root_id()), Some(100));
    }

    #[tokio::test]
    async fn missing_target_is_no_matching_object() {
        let service = service(NullVerifierFactory::new()).await;
        let proof = NullProof::new("aa").with_object(spaceout("@bitcoin")).to_bytes();
        let err = service
            .verify_put(&Target::new("@other"), b"m", b"s", &proof)
            .unwrap_err();
        assert!(matches!(
            err,
            AnchorError::Verification(VerificationError::NoMatchingObject(_))
        ));
    }

    #[tokio::test]
    async fn bad_signature_is_rejected() {
        let service = service(NullVerifierFactory::new()).await;
        let out = spaceout("@bitcoin");
        let proof = NullProof::new("aa").with_object(out.clone()).to_bytes();
        let sig = null_sign(&out.script_pubkey, b"original");
        let err = service
            .verify_put(&Target::new("@bitcoin"), b"forged", &sig, &proof)
            .unwrap_err();
        assert!(matches!(
            err,
            AnchorError::Verification(VerificationError::InvalidSignature(_))
        ));
    }

    #[tokio::test]
    async fn valid_proof_against_unindexed_root_is_unknown_version() {
        let service = service(NullVerifierFactory::accept_unanchored()).await;
        let out = spaceout("@bitcoin");
        let proof = NullProof::new("cc").with_object(out.clone()).to_bytes();
        let sig = null_sign(&out.script_pubkey, b"m");
        let err = service
            .verify_put(&Target::new("@bitcoin"), b"m", &sig, &proof)
            .unwrap_err();
        assert!(matches!(
            err,
            AnchorError::Verification(VerificationError::UnknownProofVersion(_))
        ));
        assert_eq!(
            err.to_string(),
            "verification error: unknown proof version: root cc is not anchored"
        );
    }

    #[tokio::test]
    async fn verify_put_does_not_mutate_the_store() {
        let service = service(NullVerifierFactory::new()).await;
        let before = service.status();
        let proof = NullProof::new("aa").to_bytes();
        let _ = service.verify_put(&Target::new("@x"), b"m", b"s", &proof);
        assert_eq!(service.status(), before);
    }

    #[tokio::test]
    async fn empty_static_set_cannot_verify() {
        let config = AnchorConfig::with_static(vec![]);
        let service = AnchorService::create(config, Arc::new(NullVerifierFactory::new()))
            .await
            .unwrap();
        let err = service
            .verify_put(&Target::new("@x"), b"m", b"s", b"{}")
            .unwrap_err();
        assert!(matches!(err, AnchorError::NoAnchors));
    }

    #[tokio::test]
    async fn create_rejects_ambiguous_config() {
        let mut config = AnchorConfig::with_static(vec![anchor_at("aa", 1)]);
        config.remote_urls = Some(vec!["http://127.0.0.1:1/anchors".into()]);
        let result = AnchorService::create(config, Arc::new(NullVerifierFactory::new())).await;
        assert!(matches!(result, Err(AnchorError::Config(_))));
    }
}
