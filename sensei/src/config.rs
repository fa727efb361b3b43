//! Layered configuration for sensei.
//!
//! Precedence, lowest first: built-in defaults, `config.toml`, the
//! `SENSEI_API_URL` environment variable, command-line flags. A missing file
//! is not an error; an unreadable or malformed one is logged and ignored.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use sensei_core::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use sensei_core::types::Language;

/// Environment variable that overrides `api_url` from the file.
pub const API_URL_ENV: &str = "SENSEI_API_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub timeout_secs: u64,
    pub language: Language,
    pub theme: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_owned(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            language: Language::default(),
            theme: "catppuccin-mocha".to_owned(),
        }
    }
}

/// Values given on the command line; `None` leaves the lower layer alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub language: Option<Language>,
    pub theme: Option<String>,
}

/// `$XDG_CONFIG_HOME/sensei/config.toml`, else `~/.config/sensei/config.toml`.
pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("sensei").join("config.toml")
}

impl Config {
    /// Reads `path`. `Ok(None)` when the file does not exist.
    pub fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(ConfigError::Read { path: path.to_owned(), source }),
        };
        toml::from_str(&raw)
            .map(Some)
            .map_err(|source| ConfigError::Parse { path: path.to_owned(), source })
    }

    /// Loads `path`, falling back to defaults on any failure. Never panics.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::read(path) {
            Ok(Some(cfg)) => {
                tracing::debug!(path = %path.display(), "config loaded");
                cfg
            }
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!(error = %e, "using default config");
                Self::default()
            }
        }
    }

    /// Applies the environment value (if any) and then the CLI overrides.
    pub fn layered(mut self, env_api_url: Option<String>, cli: Overrides) -> Self {
        if let Some(url) = env_api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url;
        }
        if let Some(url) = cli.api_url {
            self.api_url = url;
        }
        if let Some(language) = cli.language {
            self.language = language;
        }
        if let Some(theme) = cli.theme {
            self.theme = theme;
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        if self.timeout_secs == 0 {
            DEFAULT_TIMEOUT
        } else {
            Duration::from_secs(self.timeout_secs)
        }
    }
}
