//! File logging for sensei.
//!
//! The terminal belongs to the TUI, so `tracing` output goes to
//! `$XDG_STATE_HOME/sensei/sensei.log` (or `~/.local/state/sensei/sensei.log`).
//! The filter comes from `SENSEI_LOG` in `EnvFilter` syntax and defaults to
//! `info`.

use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_FILTER_ENV: &str = "SENSEI_LOG";

pub fn log_path() -> PathBuf {
    let base = std::env::var("XDG_STATE_HOME")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".local").join("state"))
        })
        .unwrap_or_else(|| PathBuf::from(".local/state"));
    base.join("sensei").join("sensei.log")
}

fn open_log_file(path: &PathBuf) -> std::io::Result<File> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Installs the global subscriber.
///
/// Logging is best effort: if the file cannot be opened the app runs without
/// it and the returned error is reported on stderr before the TUI starts.
pub fn init() -> std::io::Result<PathBuf> {
    let path = log_path();
    let file = open_log_file(&path)?;

    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(std::io::Error::other)?;

    Ok(path)
}
