use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tokio::signal;
use tokio::signal::unix::{signal as unix_signal, SignalKind};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod services;
mod utils;

use config::{Config, LoggingConfig};
use services::{create_window_source, DecorationManager, Session, SettingsStore, TracingPrimitives, WindowTracker};

/// Window updates buffered between the backend task and the core loop.
const UPDATE_QUEUE_SIZE: usize = 256;

#[derive(Parser, Debug)]
#[command(name = "kodecanter")]
#[command(about = "Colors every editor window by the project it has open")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "kodecanter.toml")]
    config: String,

    /// Emulate a compositor with a scripted window session
    #[arg(long)]
    dry_run: bool,

    /// Log level, overrides the configured filter
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)?;
    init_tracing(&config.logging, args.log_level.as_deref())?;

    info!("Starting Kodecanter v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from: {}", args.config);

    if args.dry_run {
        warn!("Dry-run mode: windows are scripted, nothing is drawn");
    }

    let settings = SettingsStore::new(config.decorations.clone());
    let manager = DecorationManager::new(Box::new(TracingPrimitives::new()), settings.subscribe())
        .with_max_retries(config.scheduler.max_retries);
    let tracker = WindowTracker::from_config(&config.tracker);
    let mut session = Session::new(tracker, manager);

    let source = create_window_source(&config, args.dry_run)?;
    let (tx, mut rx) = mpsc::channel(UPDATE_QUEUE_SIZE);
    let source_handle = tokio::spawn(async move {
        if let Err(e) = source.run(tx).await {
            error!("Window source failed: {}", e);
        }
    });

    session.start();

    let mut hangup = unix_signal(SignalKind::hangup())?;
    let mut terminate = unix_signal(SignalKind::terminate())?;
    let mut tick = tokio::time::interval(Duration::from_millis(config.scheduler.tick_interval_ms));
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut source_open = true;
    loop {
        let pending = session.has_pending_tasks();

        tokio::select! {
            update = rx.recv(), if source_open => match update {
                Some(update) => session.apply(update),
                None => {
                    warn!("Window source stopped, keeping the windows seen so far");
                    source_open = false;
                }
            },
            _ = session.settings_changed() => session.on_settings_changed(),
            _ = tick.tick(), if pending => session.run_deferred(),
            _ = hangup.recv() => {
                info!("Received SIGHUP, reloading {}", args.config);
                if let Err(e) = settings.reload(&args.config) {
                    warn!("Keeping current decoration settings: {}", e);
                }
            }
            _ = terminate.recv() => {
                info!("Received SIGTERM");
                break;
            }
            result = signal::ctrl_c() => {
                match result {
                    Ok(()) => info!("Received Ctrl+C"),
                    Err(err) => error!("Failed to listen for Ctrl+C: {}", err),
                }
                break;
            }
        }
    }

    info!("Shutting down...");
    session.shutdown();

    source_handle.abort();
    let shutdown_timeout = Duration::from_secs(5);
    if tokio::time::timeout(shutdown_timeout, source_handle).await.is_err() {
        warn!("Timed out waiting for the window source to stop");
    }

    info!(
        "Kodecanter stopped ({} windows were known)",
        session.registry().len()
    );
    Ok(())
}

/// `RUST_LOG` wins over `--log-level`, which wins over the config file.
fn init_tracing(logging: &LoggingConfig, cli_level: Option<&str>) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(logging.directive(cli_level)))?;

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().compact()).init();
    }

    Ok(())
}
