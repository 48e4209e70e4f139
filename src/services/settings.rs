use crate::config::{Config, DecorationSettings};
use crate::error::Result;
use crate::services::decoration::SettingsReceiver;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Owns the live decoration settings and notifies subscribers on change.
pub struct SettingsStore {
    tx: watch::Sender<Arc<DecorationSettings>>,
}

impl SettingsStore {
    pub fn new(initial: DecorationSettings) -> Self {
        let (tx, _) = watch::channel(Arc::new(initial));
        Self { tx }
    }

    pub fn subscribe(&self) -> SettingsReceiver {
        self.tx.subscribe()
    }

    #[cfg(test)]
    pub fn current(&self) -> Arc<DecorationSettings> {
        self.tx.borrow().clone()
    }

    /// Replaces the settings. Subscribers are only woken when something
    /// actually changed; returns whether it did.
    pub fn replace(&self, settings: DecorationSettings) -> bool {
        self.tx.send_if_modified(|current| {
            if **current == settings {
                return false;
            }
            *current = Arc::new(settings);
            true
        })
    }

    /// Re-reads the decoration section of the config file.
    ///
    /// A file that fails to load or validate leaves the current settings in
    /// place and is reported as an error.
    pub fn reload<P: AsRef<Path>>(&self, config_path: P) -> Result<bool> {
        let config = Config::load(config_path.as_ref())?;
        let changed = self.replace(config.decorations);
        if changed {
            info!("Decoration settings reloaded from {:?}", config_path.as_ref());
        } else {
            debug!("Decoration settings unchanged after reload");
        }
        Ok(changed)
    }
}
