use crate::config::Config;
use crate::error::{KodecanterError, Result};
use crate::events::WindowUpdate;
use tokio::sync::mpsc;
use tracing::info;

use super::dry_run::DryRunSource;
use super::sway::SwaySource;

/// Producer of window snapshots for the registry.
#[async_trait::async_trait]
pub trait WindowSource {
    /// Streams updates until the compositor goes away or the receiver is dropped.
    async fn run(self: Box<Self>, tx: mpsc::Sender<WindowUpdate>) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    Sway,
    DryRun,
}

fn select_backend(requested: &str, dry_run: bool, swaysock: Option<&str>) -> Result<Backend> {
    if dry_run {
        return Ok(Backend::DryRun);
    }

    match requested {
        "sway" => Ok(Backend::Sway),
        "dry-run" => Ok(Backend::DryRun),
        "auto" => match swaysock {
            Some(sock) if !sock.is_empty() => Ok(Backend::Sway),
            _ => KodecanterError::service_unavailable(
                "no supported compositor detected (SWAYSOCK is not set); use --dry-run to emulate one",
            ),
        },
        other => Err(crate::kc_error!(internal, "unknown window backend: {}", other)),
    }
}

/// Picks the backend from the configuration and the running session.
pub fn create_window_source(config: &Config, dry_run: bool) -> Result<Box<dyn WindowSource + Send>> {
    let swaysock = std::env::var("SWAYSOCK").ok();
    let backend = select_backend(&config.window.backend, dry_run, swaysock.as_deref())?;
    info!("Window backend: {:?}", backend);

    Ok(match backend {
        Backend::Sway => Box::new(SwaySource::new()),
        Backend::DryRun => Box::new(DryRunSource::new(
            config.tracker.window_classes.first().cloned().unwrap_or_default(),
            config.tracker.separator.clone(),
            config.window.dry_run_interval_ms,
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_flag_wins() {
        assert_eq!(select_backend("sway", true, Some("/run/sway.sock")).unwrap(), Backend::DryRun);
    }

    #[test]
    fn test_auto_detects_sway() {
        assert_eq!(select_backend("auto", false, Some("/run/sway.sock")).unwrap(), Backend::Sway);
    }

    #[test]
    fn test_auto_without_compositor_fails() {
        let err = select_backend("auto", false, None).unwrap_err();
        assert!(matches!(err, KodecanterError::ServiceUnavailable(_)));
    }

    #[test]
    fn test_explicit_backends() {
        assert_eq!(select_backend("sway", false, None).unwrap(), Backend::Sway);
        assert_eq!(select_backend("dry-run", false, None).unwrap(), Backend::DryRun);
        assert!(select_backend("kwin", false, None).is_err());
    }
}
