//! Optional JSON settings file.
//!
//! Looked up at `--config <path>` or `<config_dir>/eventide/config.json`.
//! Every section is optional; command-line flags override file values.

use eventide_data::{FamaFrenchConfig, YahooConfig};
use eventide_study::StudyConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors reading the settings file.
#[derive(Debug, Error)]
pub(crate) enum SettingsError {
    /// The file could not be read.
    #[error("Failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid settings JSON.
    #[error("Invalid settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Settings file contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    /// Window lengths, confidence level and fetch offset.
    pub(crate) study: StudyConfig,

    /// Yahoo rate limit and benchmark symbol.
    pub(crate) yahoo: YahooConfig,

    /// Where to read Fama-French factors from.
    pub(crate) fama_french: Option<FamaFrenchConfig>,

    /// Directory holding `<TICKER>.png` logos (default: `logos`).
    pub(crate) logo_dir: Option<PathBuf>,
}

impl Settings {
    /// Load from an explicit path, else from the default location when it
    /// exists, else defaults.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        match explicit {
            Some(path) => Self::from_path(path),
            None => match default_path() {
                Some(path) if path.is_file() => Self::from_path(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn from_path(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Logo directory, `logos` when unset.
    pub(crate) fn logo_dir(&self) -> &Path {
        self.logo_dir.as_deref().unwrap_or_else(|| Path::new("logos"))
    }
}

fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("eventide").join("config.json"))
}
