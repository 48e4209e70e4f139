use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_WINDOW_CLASSES: &[&str] = &["dev.zed.Zed"];
pub const DEFAULT_SEPARATOR: &str = " \u{2014} ";
pub const DEFAULT_SKIP_TITLES: &[&str] = &["Zed", "Welcome", "Settings", "Extensions"];

pub const DEFAULT_BORDER_WIDTH: i32 = 3;
pub const DEFAULT_BORDER_RADIUS: i32 = 12;
pub const DEFAULT_OVERLAY_OPACITY: i32 = 15;
pub const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub window: WindowConfig,
    pub tracker: TrackerConfig,
    pub scheduler: SchedulerConfig,
    pub decorations: DecorationSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            filter: String::new(),
        }
    }
}

impl LoggingConfig {
    /// Directive used when `RUST_LOG` is unset: `--log-level` first, then an
    /// explicit `filter`, then the plain `level`.
    pub fn directive(&self, cli_level: Option<&str>) -> String {
        match cli_level {
            Some(level) => format!("kodecanter={}", level),
            None if self.filter.is_empty() => format!("kodecanter={}", self.level),
            None => self.filter.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowConfig {
    /// `auto`, `sway` or `dry-run`
    pub backend: String,
    pub dry_run_interval_ms: u64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            backend: "auto".to_string(),
            dry_run_interval_ms: 1500,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub window_classes: Vec<String>,
    pub separator: String,
    pub skip_titles: Vec<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            window_classes: DEFAULT_WINDOW_CLASSES.iter().map(|c| c.to_string()).collect(),
            separator: DEFAULT_SEPARATOR.to_string(),
            skip_titles: DEFAULT_SKIP_TITLES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub tick_interval_ms: u64,
    pub max_retries: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// User-facing decoration settings. Keys match the extension schema
/// (`border-enabled`, `overlay-opacity`, ...).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DecorationSettings {
    pub border_enabled: bool,
    pub border_width: i32,
    pub border_radius: i32,
    pub overlay_enabled: bool,
    pub overlay_opacity: i32,
    pub badge_enabled: bool,
    pub color_overrides: HashMap<String, String>,
}

impl Default for DecorationSettings {
    fn default() -> Self {
        Self {
            border_enabled: true,
            border_width: DEFAULT_BORDER_WIDTH,
            border_radius: DEFAULT_BORDER_RADIUS,
            overlay_enabled: false,
            overlay_opacity: DEFAULT_OVERLAY_OPACITY,
            badge_enabled: true,
            color_overrides: HashMap::new(),
        }
    }
}

impl DecorationSettings {
    pub fn validate(&self) -> Result<()> {
        if self.border_width < 0 {
            anyhow::bail!("border-width must not be negative: {}", self.border_width);
        }
        if self.border_radius < 0 {
            anyhow::bail!("border-radius must not be negative: {}", self.border_radius);
        }
        if !(0..=100).contains(&self.overlay_opacity) {
            anyhow::bail!("overlay-opacity must be within 0..=100: {}", self.overlay_opacity);
        }
        Ok(())
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("KODECANTER_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Unknown log level: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            _ => anyhow::bail!("Unknown log format: {}", self.logging.format),
        }

        match self.window.backend.as_str() {
            "auto" | "sway" | "dry-run" => {}
            _ => anyhow::bail!("Unknown window backend: {}", self.window.backend),
        }

        if self.window.dry_run_interval_ms == 0 {
            anyhow::bail!("dry_run_interval_ms must be greater than 0");
        }

        if self.tracker.window_classes.is_empty() {
            anyhow::bail!("tracker.window_classes must list at least one window class");
        }

        if self.tracker.separator.is_empty() {
            anyhow::bail!("tracker.separator must not be empty");
        }

        if self.scheduler.tick_interval_ms == 0 {
            anyhow::bail!("scheduler.tick_interval_ms must be greater than 0");
        }

        self.decorations.validate()
    }
}
