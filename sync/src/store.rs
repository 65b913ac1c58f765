//! The trusted, currently active anchor state.
//!
//! A [`StoreSnapshot`] bundles the verifier and the root→height index built
//! from one anchor list. Refreshes build a whole new snapshot and publish it
//! with a single pointer swap, so a reader holding a snapshot never sees a
//! verifier from one generation next to an index from another.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use anchor_types::{Anchor, AnchorList, BlockRef, Root};
use anchor_verification::{AnchorVerifier, VerifierFactory};

use crate::AnchorError;

/// Number of most recent anchors that are never considered stale.
pub const STALE_WINDOW: usize = 9;

/// One immutable generation of trusted state.
pub struct StoreSnapshot {
    verifier: Option<Arc<dyn AnchorVerifier>>,
    versions: HashMap<Root, u32>,
    anchors: AnchorList,
    stale_threshold: u32,
    generation: u64,
}

impl StoreSnapshot {
    fn empty() -> Self {
        Self {
            verifier: None,
            versions: HashMap::new(),
            anchors: Vec::new(),
            stale_threshold: 0,
            generation: 0,
        }
    }

    /// The verifier bound to this generation's anchors, if any were loaded.
    pub fn verifier(&self) -> Option<&Arc<dyn AnchorVerifier>> {
        self.verifier.as_ref()
    }

    pub fn lookup_version(&self, root: &Root) -> Option<u32> {
        self.versions.get(root).copied()
    }

    pub fn is_stale(&self, height: u32) -> bool {
        height < self.stale_threshold
    }

    pub fn stale_threshold(&self) -> u32 {
        self.stale_threshold
    }

    /// Anchors sorted most recent first.
    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Read-only summary of the active anchor set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnchorStatus {
    pub anchors: usize,
    pub tip: Option<BlockRef>,
    pub stale_threshold: u32,
    pub generation: u64,
}

/// What a replace call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplaceOutcome {
    Replaced,
    /// Empty input; prior state kept.
    Empty,
    /// Static source; the fixed list is only loaded once.
    Unchanged,
    /// A refresh that started later already published.
    Superseded,
}

/// Holder of the active [`StoreSnapshot`].
pub struct AnchorStore {
    factory: Arc<dyn VerifierFactory>,
    current: RwLock<Arc<StoreSnapshot>>,
    next_generation: AtomicU64,
}

impl AnchorStore {
    pub fn new(factory: Arc<dyn VerifierFactory>) -> Self {
        Self {
            factory,
            current: RwLock::new(Arc::new(StoreSnapshot::empty())),
            next_generation: AtomicU64::new(1),
        }
    }

    /// Stamp a refresh attempt. Stamps increase in the order attempts begin.
    pub fn begin_refresh(&self) -> u64 {
        self.next_generation.fetch_add(1, Ordering::SeqCst)
    }

    /// Capture the current generation. Later refreshes do not affect it.
    pub fn snapshot(&self) -> Arc<StoreSnapshot> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replace the active state with `anchors`, stamped as the newest refresh.
    pub fn replace(&self, anchors: AnchorList) -> Result<ReplaceOutcome, AnchorError> {
        let generation = self.begin_refresh();
        self.replace_stamped(generation, anchors)
    }

    /// Replace the active state with the result of the refresh stamped `generation`.
    ///
    /// Results from a refresh that began before the currently published one
    /// are discarded.
    pub fn replace_stamped(
        &self,
        generation: u64,
        mut anchors: AnchorList,
    ) -> Result<ReplaceOutcome, AnchorError> {
        if anchors.is_empty() {
            return Ok(ReplaceOutcome::Empty);
        }

        anchors.sort_by(|a, b| b.height().cmp(&a.height()));

        let stale_threshold = if anchors.len() > STALE_WINDOW {
            anchors[anchors.len() - STALE_WINDOW].height()
        } else {
            0
        };

        let mut versions = HashMap::with_capacity(anchors.len());
        for anchor in &anchors {
            versions.entry(anchor.root.clone()).or_insert(anchor.height());
        }

        let verifier = self.factory.build(&anchors)?;
        let next = Arc::new(StoreSnapshot {
            verifier: Some(verifier),
            versions,
            anchors,
            stale_threshold,
            generation,
        });

        let mut current = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if current.generation > generation {
            tracing::debug!(
                generation,
                published = current.generation,
                "discarding refresh superseded by a newer one"
            );
            return Ok(ReplaceOutcome::Superseded);
        }
        *current = next;
        Ok(ReplaceOutcome::Replaced)
    }

    pub fn lookup_version(&self, root: &Root) -> Option<u32> {
        self.snapshot().lookup_version(root)
    }

    pub fn is_stale(&self, height: u32) -> bool {
        self.snapshot().is_stale(height)
    }

    pub fn status(&self) -> AnchorStatus {
        let snapshot = self.snapshot();
        AnchorStatus {
            anchors: snapshot.anchors.len(),
            tip: snapshot.anchors.first().map(|a| a.block.clone()),
            stale_threshold: snapshot.stale_threshold,
            generation: snapshot.generation,
        }
    }

    pub fn verifier_backend(&self) -> &str {
        self.factory.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_nullables::{anchor_at, anchor_chain, NullVerifierFactory};

    fn store() -> (Arc<NullVerifierFactory>, AnchorStore) {
        let factory = Arc::new(NullVerifierFactory::new());
        let store = AnchorStore::new(factory.clone());
        (factory, store)
    }

    #[test]
    fn starts_empty() {
        let (_, store) = store();
        let snapshot = store.snapshot();
        assert!(snapshot.verifier().is_none());
        assert_eq!(snapshot.stale_threshold(), 0);
        assert_eq!(store.status().anchors, 0);
    }

    #[test]
    fn empty_replace_keeps_prior_state() {
        let (factory, store) = store();
        assert_eq!(store.replace(vec![]).unwrap(), ReplaceOutcome::Empty);
        assert!(store.snapshot().verifier().is_none());
        assert_eq!(factory.build_count(), 0);

        store.replace(vec![anchor_at("aa", 5)]).unwrap();
        assert_eq!(store.replace(vec![]).unwrap(), ReplaceOutcome::Empty);
        assert_eq!(store.lookup_version(&Root::new("aa")), Some(5));
        assert_eq!(factory.build_count(), 1);
    }

    #[test]
    fn replace_indexes_every_root_and_drops_prior_generation() {
        let (factory, store) = store();
        store.replace(vec![anchor_at("aa", 1), anchor_at("bb", 2)]).unwrap();
        store.replace(vec![anchor_at("cc", 3), anchor_at("dd", 4)]).unwrap();

        assert_eq!(store.lookup_version(&Root::new("cc")), Some(3));
        assert_eq!(store.lookup_version(&Root::new("dd")), Some(4));
        assert_eq!(store.lookup_version(&Root::new("aa")), None);
        assert_eq!(store.lookup_version(&Root::new("bb")), None);
        assert_eq!(
            factory.last_bound_roots(),
            Some(vec![Root::new("dd"), Root::new("cc")])
        );
    }

    #[test]
    fn anchors_sorted_most_recent_first() {
        let (_, store) = store();
        store
            .replace(vec![anchor_at("aa", 1), anchor_at("cc", 3), anchor_at("bb", 2)])
            .unwrap();
        let heights: Vec<u32> = store.snapshot().anchors().iter().map(|a| a.height()).collect();
        assert_eq!(heights, vec![3, 2, 1]);
        assert_eq!(store.status().tip.map(|b| b.height), Some(3));
    }

    #[test]
    fn nine_or_fewer_anchors_are_never_stale() {
        let (_, store) = store();
        store.replace(anchor_chain(100, 9)).unwrap();
        assert_eq!(store.snapshot().stale_threshold(), 0);
        assert!(!store.is_stale(0));
        assert!(!store.is_stale(1));
    }

    #[test]
    fn threshold_is_ninth_oldest_height() {
        let (_, store) = store();
        // heights 10 down to 1
        store.replace(anchor_chain(10, 10)).unwrap();
        assert_eq!(store.snapshot().stale_threshold(), 9);
        assert!(store.is_stale(8));
        assert!(!store.is_stale(9));
        assert!(!store.is_stale(10));
    }

    #[test]
    fn threshold_recomputed_from_new_set_only() {
        let (_, store) = store();
        store.replace(anchor_chain(500, 20)).unwrap();
        assert!(store.is_stale(481));
        store.replace(anchor_chain(50, 3)).unwrap();
        assert!(!store.is_stale(1));
    }

    #[test]
    fn superseded_refresh_is_discarded() {
        let (_, store) = store();
        let slow = store.begin_refresh();
        let fast = store.begin_refresh();
        assert_eq!(
            store.replace_stamped(fast, vec![anchor_at("bb", 20)]).unwrap(),
            ReplaceOutcome::Replaced
        );
        assert_eq!(
            store.replace_stamped(slow, vec![anchor_at("aa", 10)]).unwrap(),
            ReplaceOutcome::Superseded
        );
        assert_eq!(store.lookup_version(&Root::new("bb")), Some(20));
        assert_eq!(store.lookup_version(&Root::new("aa")), None);
    }

    #[test]
    fn duplicate_root_keeps_highest_height() {
        let (_, store) = store();
        store
            .replace(vec![anchor_at("aa", 3), anchor_at("bb", 7), anchor_at("aa", 5)])
            .unwrap();
        assert_eq!(store.lookup_version(&Root::new("aa")), Some(5));
        assert_eq!(store.lookup_version(&Root::new("bb")), Some(7));
        assert_eq!(store.status().anchors, 3);
    }

    #[test]
    fn held_snapshot_survives_replace() {
        let (_, store) = store();
        store.replace(vec![anchor_at("aa", 1)]).unwrap();
        let held = store.snapshot();
        store.replace(vec![anchor_at("bb", 2)]).unwrap();
        assert_eq!(held.lookup_version(&Root::new("aa")), Some(1));
        assert_eq!(held.lookup_version(&Root::new("bb")), None);
        assert!(held.generation() < store.snapshot().generation());
    }
}
