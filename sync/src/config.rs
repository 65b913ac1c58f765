//! Anchor service configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use anchor_types::Anchor;

use crate::AnchorError;

/// Configuration for an anchor service.
///
/// Exactly one of `local_path`, `remote_urls` or `static_anchors` must be set.
/// Can be loaded from a TOML file via [`AnchorConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnchorConfig {
    /// JSON anchor file on disk, re-read on every refresh and watched for changes.
    #[serde(default)]
    pub local_path: Option<PathBuf>,

    /// Independently operated anchor endpoints, reconciled by majority agreement.
    #[serde(default)]
    pub remote_urls: Option<Vec<String>>,

    /// Fixed anchors; disables all refresh scheduling.
    #[serde(default)]
    pub static_anchors: Option<Vec<Anchor>>,

    /// Periodic refresh interval.
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,

    /// Delay between attempts when every remote endpoint fails.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Per-request timeout for remote endpoints.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// How often the local anchor file is polled for changes.
    #[serde(default = "default_watch_poll_ms")]
    pub watch_poll_ms: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Timer settings for refresh scheduling. Ignored for static anchors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshTiming {
    pub check_interval: Duration,
    pub retry_delay: Duration,
    pub request_timeout: Duration,
    pub watch_poll: Duration,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_check_interval_ms() -> u64 {
    600_000
}

fn default_retry_delay_ms() -> u64 {
    5_000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_watch_poll_ms() -> u64 {
    1_000
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl AnchorConfig {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            local_path: Some(path.into()),
            ..Self::defaults()
        }
    }

    pub fn remote<S: Into<String>>(urls: impl IntoIterator<Item = S>) -> Self {
        Self {
            remote_urls: Some(urls.into_iter().map(Into::into).collect()),
            ..Self::defaults()
        }
    }

    pub fn with_static(anchors: Vec<Anchor>) -> Self {
        Self {
            static_anchors: Some(anchors),
            ..Self::defaults()
        }
    }

    fn defaults() -> Self {
        Self {
            local_path: None,
            remote_urls: None,
            static_anchors: None,
            check_interval_ms: default_check_interval_ms(),
            retry_delay_ms: default_retry_delay_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            watch_poll_ms: default_watch_poll_ms(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }

    pub fn timing(&self) -> RefreshTiming {
        RefreshTiming {
            check_interval: Duration::from_millis(self.check_interval_ms),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            watch_poll: Duration::from_millis(self.watch_poll_ms),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, AnchorError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| AnchorError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, AnchorError> {
        toml::from_str(s).map_err(|e| AnchorError::Config(e.to_string()))
    }

    /// Number of anchor sources configured. Valid configurations have exactly one.
    pub fn source_count(&self) -> usize {
        [
            self.local_path.is_some(),
            self.remote_urls.is_some(),
            self.static_anchors.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Default for RefreshTiming {
    fn default() -> Self {
        AnchorConfig::defaults().timing()
    }
}
