//! Refresh scheduling — when and how the anchor store is refreshed.
//!
//! Lifecycle: `Uninitialized → Active → Destroyed`.
//!
//! - [`RefreshScheduler::start`] runs one initial refresh. For remote and local
//!   sources a failure there tears everything down and is returned.
//! - While active, a periodic timer and (for local files) change notifications
//!   trigger the same refresh routine. Failures are logged, never returned.
//! - Remote refreshes retry with a fixed delay until they succeed or the
//!   scheduler is destroyed. The initial refresh makes a single attempt.
//! - [`RefreshScheduler::destroy`] is idempotent and synchronous. In-flight
//!   fetches run to completion but schedule nothing further.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anchor_types::AnchorList;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::cancel::CancelSignal;
use crate::consensus::select_anchors;
use crate::source::{read_local, AnchorSource};
use crate::store::{AnchorStore, ReplaceOutcome};
use crate::watcher::FileWatcher;
use crate::{AnchorError, RefreshTiming};

/// Smallest period handed to tokio timers.
const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Uninitialized,
    Active,
    Destroyed,
}

/// State shared between the scheduler and the tasks it spawns.
struct RefreshCore {
    source: AnchorSource,
    store: Arc<AnchorStore>,
    cancel: CancelSignal,
    retry_delay: Duration,
}

impl RefreshCore {
    /// One attempt: fetch from the source and reduce to a single candidate list.
    async fn fetch(&self) -> Result<AnchorList, AnchorError> {
        let anchors = match &self.source {
            AnchorSource::Local(path) => read_local(path)?,
            AnchorSource::Remote(fetcher) => select_anchors(fetcher.fetch_all().await?)?,
            AnchorSource::Static(anchors) => anchors.clone(),
        };
        if anchors.is_empty() && !self.source.is_static() {
            return Err(AnchorError::NoAnchors);
        }
        Ok(anchors)
    }

    async fn refresh(&self, initial: bool) -> Result<ReplaceOutcome, AnchorError> {
        if self.cancel.is_cancelled() {
            return Err(AnchorError::Destroyed);
        }
        if self.source.is_static() && !initial {
            return Ok(ReplaceOutcome::Unchanged);
        }

        let retries = matches!(self.source, AnchorSource::Remote(_)) && !initial;
        loop {
            if self.cancel.is_cancelled() {
                return Err(AnchorError::Destroyed);
            }

            let generation = self.store.begin_refresh();
            let result = match self.fetch().await {
                Ok(anchors) => {
                    let count = anchors.len();
                    self.store
                        .replace_stamped(generation, anchors)
                        .map(|outcome| (outcome, count))
                }
                Err(e) => Err(e),
            };

            match result {
                Ok((outcome, count)) => {
                    tracing::info!(
                        source = self.source.kind(),
                        generation,
                        anchors = count,
                        ?outcome,
                        initial,
                        "anchor refresh complete"
                    );
                    return Ok(outcome);
                }
                Err(e) if !retries => {
                    tracing::warn!(
                        source = self.source.kind(),
                        error = %e,
                        initial,
                        "anchor refresh failed"
                    );
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(
                        source = self.source.kind(),
                        error = %e,
                        retry_in_ms = self.retry_delay.as_millis() as u64,
                        "anchor refresh failed, retrying"
                    );
                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => return Err(AnchorError::Destroyed),
                        _ = tokio::time::sleep(self.retry_delay) => {}
                    }
                }
            }
        }
    }
}

/// Drives refreshes of one [`AnchorStore`] from one [`AnchorSource`].
pub struct RefreshScheduler {
    core: Arc<RefreshCore>,
    timing: RefreshTiming,
    state: Mutex<SchedulerState>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    watcher: Mutex<Option<FileWatcher>>,
}

impl RefreshScheduler {
    pub fn new(source: AnchorSource, store: Arc<AnchorStore>, timing: RefreshTiming) -> Self {
        Self {
            core: Arc::new(RefreshCore {
                source,
                store,
                cancel: CancelSignal::new(),
                retry_delay: timing.retry_delay,
            }),
            timing,
            state: Mutex::new(SchedulerState::Uninitialized),
            tasks: Mutex::new(Vec::new()),
            watcher: Mutex::new(None),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or(SchedulerState::Destroyed)
    }

    fn set_state(&self, next: SchedulerState) {
        if let Ok(mut state) = self.state.lock() {
            *state = next;
        }
    }

    /// Move `Uninitialized → Active`. Returns `false` if destroyed in the meantime.
    fn activate(&self) -> bool {
        match self.state.lock() {
            Ok(mut state) if *state == SchedulerState::Uninitialized => {
                *state = SchedulerState::Active;
                true
            }
            _ => false,
        }
    }

    /// Load the initial anchor set and arm the refresh triggers.
    pub async fn start(&self) -> Result<(), AnchorError> {
        if self.state() != SchedulerState::Uninitialized {
            return Err(AnchorError::Destroyed);
        }

        if let AnchorSource::Static(anchors) = &self.core.source {
            self.core.store.replace(anchors.clone())?;
            if !self.activate() {
                return Err(AnchorError::Destroyed);
            }
            tracing::info!(anchors = anchors.len(), "static anchors loaded, refresh disabled");
            return Ok(());
        }

        if let AnchorSource::Local(path) = &self.core.source {
            self.watch(path.clone()).await;
        }

        if let Err(e) = self.core.refresh(true).await {
            self.destroy();
            return Err(AnchorError::Bootstrap(Box::new(e)));
        }

        // destroy() may have raced the initial refresh
        if self.core.cancel.is_cancelled() || !self.activate() {
            return Err(AnchorError::Destroyed);
        }
        self.spawn_periodic();
        Ok(())
    }

    async fn watch(&self, path: std::path::PathBuf) {
        let (tx, mut rx) = mpsc::channel(16);
        let watcher = FileWatcher::spawn(path, self.timing.watch_poll.max(MIN_PERIOD), tx).await;
        if let Ok(mut slot) = self.watcher.lock() {
            *slot = Some(watcher);
        }

        let core = Arc::clone(&self.core);
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = core.cancel.cancelled() => break,
                    event = rx.recv() => {
                        if event.is_none() {
                            break;
                        }
                        tracing::info!("anchor file changed, refreshing");
                        let _ = core.refresh(false).await;
                    }
                }
            }
        });
        self.track(handle);
    }

    fn spawn_periodic(&self) {
        let core = Arc::clone(&self.core);
        let period = self.timing.check_interval.max(MIN_PERIOD);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            interval.tick().await;
            loop {
                tokio::select! {
                    biased;
                    _ = core.cancel.cancelled() => break,
                    _ = interval.tick() => {}
                }
                tracing::debug!("periodic anchor refresh");
                let _ = core.refresh(false).await;
            }
        });
        self.track(handle);
    }

    fn track(&self, handle: JoinHandle<()>) {
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.push(handle);
        }
    }

    /// Run a refresh now. Remote sources retry until success or destroy;
    /// static sources are left as loaded.
    pub async fn refresh(&self) -> Result<ReplaceOutcome, AnchorError> {
        self.core.refresh(false).await
    }

    /// Stop every trigger. Safe to call repeatedly and before `start`.
    pub fn destroy(&self) {
        let first = self.core.cancel.cancel();
        if let Ok(mut slot) = self.watcher.lock() {
            if let Some(watcher) = slot.take() {
                watcher.close();
            }
        }
        self.set_state(SchedulerState::Destroyed);
        if first {
            tracing::info!(source = self.core.source.kind(), "anchor scheduler destroyed");
        }
    }

    /// Whether no timer, watcher or refresh task is still running.
    pub fn is_idle(&self) -> bool {
        let watcher_closed = self
            .watcher
            .lock()
            .map(|slot| slot.as_ref().map_or(true, |w| w.is_closed()))
            .unwrap_or(true);
        let tasks_done = self
            .tasks
            .lock()
            .map(|tasks| tasks.iter().all(|t| t.is_finished()))
            .unwrap_or(true);
        watcher_closed && tasks_done
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.core.cancel.cancel();
    }
}
