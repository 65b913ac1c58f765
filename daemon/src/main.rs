//! Anchor daemon — keeps a trust anchor set synchronized and reports on it.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anchor_sync::{init_logging, AnchorConfig, AnchorService, LogFormat};
use anchor_types::{Anchor, SpaceOut};
use anchor_verification::{AnchorVerifier, ValidatedSubtree, VerificationError, VerifierFactory};
use clap::Parser;

#[derive(Parser)]
#[command(name = "anchord", about = "Trust anchor synchronization daemon")]
struct Cli {
    /// Local anchor file (JSON array), watched for changes.
    #[arg(long, env = "ANCHOR_LOCAL_PATH")]
    local_path: Option<PathBuf>,

    /// Remote anchor endpoints (comma-separated or repeated).
    #[arg(long = "remote-url", env = "ANCHOR_REMOTE_URLS", value_delimiter = ',')]
    remote_urls: Vec<String>,

    /// Periodic refresh interval in milliseconds.
    #[arg(long, env = "ANCHOR_CHECK_INTERVAL_MS")]
    check_interval_ms: Option<u64>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "ANCHOR_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "ANCHOR_LOG_FORMAT")]
    log_format: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Keep anchors synchronized until SIGINT/SIGTERM.
    Run {
        /// How often to log the active anchor status, in seconds.
        #[arg(long, default_value_t = 60)]
        status_every: u64,
    },
    /// Load anchors once, print the status and exit.
    Status,
}

/// Stand-in backend for a daemon built without proof cryptography.
///
/// Anchors are still synchronized and indexed; every verification request is refused.
struct NoProofBackend;

struct RefusingVerifier;

impl AnchorVerifier for RefusingVerifier {
    fn verify_proof(&self, _proof: &[u8]) -> Result<Box<dyn ValidatedSubtree>, VerificationError> {
        Err(VerificationError::Backend("no proof backend configured".into()))
    }

    fn verify_message(
        &self,
        _object: &SpaceOut,
        _message: &[u8],
        _signature: &[u8],
    ) -> Result<(), VerificationError> {
        Err(VerificationError::Backend("no proof backend configured".into()))
    }
}

impl VerifierFactory for NoProofBackend {
    fn build(&self, _anchors: &[Anchor]) -> Result<Arc<dyn AnchorVerifier>, VerificationError> {
        Ok(Arc::new(RefusingVerifier))
    }

    fn name(&self) -> &str {
        "none"
    }
}

fn build_config(cli: &Cli) -> anyhow::Result<AnchorConfig> {
    let mut config = match &cli.config {
        Some(path) => AnchorConfig::from_toml_file(&path.to_string_lossy())?,
        None => AnchorConfig::default(),
    };

    // A source given on the command line replaces whichever one the file named.
    if cli.local_path.is_some() || !cli.remote_urls.is_empty() {
        config.local_path = cli.local_path.clone();
        config.remote_urls = if cli.remote_urls.is_empty() {
            None
        } else {
            Some(cli.remote_urls.clone())
        };
        config.static_anchors = None;
    }
    if let Some(ms) = cli.check_interval_ms {
        config.check_interval_ms = ms;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    Ok(config)
}

/// Wait for SIGTERM or SIGINT.
async fn wait_for_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { tracing::info!("received SIGINT, shutting down"); }
        _ = terminate => { tracing::info!("received SIGTERM, shutting down"); }
    }
}

fn log_status(service: &AnchorService) {
    let status = service.status();
    tracing::info!(
        anchors = status.anchors,
        tip_height = status.tip.as_ref().map(|b| b.height),
        tip_hash = status.tip.as_ref().map(|b| b.hash.as_str()),
        stale_threshold = status.stale_threshold,
        generation = status.generation,
        "anchor status"
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    init_logging(LogFormat::parse(&config.log_format), &config.log_level);

    let service = AnchorService::create(config, Arc::new(NoProofBackend)).await?;

    match cli.command {
        Command::Status => {
            log_status(&service);
        }
        Command::Run { status_every } => {
            let mut ticker = tokio::time::interval(Duration::from_secs(status_every.max(1)));
            let shutdown = wait_for_signal();
            tokio::pin!(shutdown);
            loop {
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = ticker.tick() => log_status(&service),
                }
            }
        }
    }

    service.destroy();
    tracing::info!("anchor daemon exited cleanly");
    Ok(())
}
