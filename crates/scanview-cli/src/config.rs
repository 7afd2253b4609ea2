//! Display configuration
//!
//! Settings come from an optional TOML file (by default
//! `<config dir>/scanview/ui.toml`), then command-line flags and the
//! environment override individual fields.
//!
//! ```toml
//! spinner_interval_ms = 80
//! color = false
//! results = "stderr"
//! ```

use crate::ui::theme::Theme;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Lower bound for the spinner redraw interval
pub const MIN_SPINNER_INTERVAL_MS: u64 = 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Where finished-stage reports are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResultsTarget {
    #[default]
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UiConfig {
    /// Spinner redraw interval in milliseconds
    pub spinner_interval_ms: u64,
    /// Emit ANSI colors and attributes
    pub color: bool,
    /// Stream receiving full reports
    pub results: ResultsTarget,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            spinner_interval_ms: 100,
            color: true,
            results: ResultsTarget::Stdout,
        }
    }
}

impl UiConfig {
    /// `<config dir>/scanview/ui.toml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("scanview").join("ui.toml"))
    }

    /// Load settings.
    ///
    /// An explicit `path` must exist. Without one the default location is
    /// tried and a missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Turn color off when requested by flag or `NO_COLOR`
    pub fn with_no_color(mut self, no_color: bool) -> Self {
        if no_color {
            self.color = false;
        }
        self
    }

    /// Override the results stream
    pub fn with_results(mut self, results: Option<ResultsTarget>) -> Self {
        if let Some(results) = results {
            self.results = results;
        }
        self
    }

    /// Redraw interval, clamped to [`MIN_SPINNER_INTERVAL_MS`]
    pub fn spinner_interval(&self) -> Duration {
        Duration::from_millis(self.spinner_interval_ms.max(MIN_SPINNER_INTERVAL_MS))
    }

    /// Theme matching the color setting
    pub fn theme(&self) -> Theme {
        if self.color {
            Theme::default()
        } else {
            Theme::plain()
        }
    }
}
