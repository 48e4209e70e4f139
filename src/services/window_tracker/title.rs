use crate::config::TrackerConfig;

/// Extracts the project name from an editor window title.
///
/// The project is the first segment before the separator
/// (`"project — file — Zed"`). Generic editor titles such as `"Zed"` or
/// `"Welcome — Zed"` carry no project.
#[derive(Debug, Clone)]
pub struct TitleParser {
    separator: String,
    skip_titles: Vec<String>,
}

impl TitleParser {
    pub fn new(separator: impl Into<String>, skip_titles: Vec<String>) -> Self {
        Self {
            separator: separator.into(),
            skip_titles,
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.separator.clone(), config.skip_titles.clone())
    }

    fn is_skipped(&self, title: &str) -> bool {
        self.skip_titles.iter().any(|skip| {
            title == skip
                || title
                    .strip_prefix(skip.as_str())
                    .is_some_and(|rest| rest.starts_with(self.separator.as_str()))
        })
    }

    pub fn parse(&self, title: Option<&str>) -> Option<String> {
        let raw = title?;
        let trimmed = raw.trim();
        if trimmed.is_empty() || self.is_skipped(trimmed) {
            return None;
        }

        // the first segment itself may be generic once a dangling separator is cut off
        let name = raw.split(self.separator.as_str()).next()?.trim();
        if name.is_empty() || self.is_skipped(name) {
            return None;
        }
        Some(name.to_string())
    }
}

impl Default for TitleParser {
    fn default() -> Self {
        Self::from_config(&TrackerConfig::default())
    }
}
