//! Change notifications for a local anchor file.
//!
//! The file's modification time and length are polled; every observed change
//! sends one notification.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Fingerprint {
    modified: Option<SystemTime>,
    len: u64,
}

async fn fingerprint(path: &Path) -> Option<Fingerprint> {
    let meta = tokio::fs::metadata(path).await.ok()?;
    Some(Fingerprint {
        modified: meta.modified().ok(),
        len: meta.len(),
    })
}

/// Subscription to changes of one file. Dropping or closing it stops polling.
pub struct FileWatcher {
    path: PathBuf,
    handle: JoinHandle<()>,
}

impl FileWatcher {
    /// Start polling `path` every `poll`, sending on `events` when it changes.
    pub async fn spawn(path: PathBuf, poll: Duration, events: mpsc::Sender<()>) -> Self {
        let mut last = fingerprint(&path).await;
        let watched = path.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll);
            interval.tick().await;
            loop {
                interval.tick().await;
                let current = fingerprint(&watched).await;
                if current == last {
                    continue;
                }
                last = current;
                tracing::debug!(path = %watched.display(), "anchor file changed");
                if events.send(()).await.is_err() {
                    break;
                }
            }
        });

        Self { path, handle }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn close(&self) {
        self.handle.abort();
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
