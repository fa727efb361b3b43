//! sensei: interactive code-review assistant for the terminal.
//!
//! Paste or load a function on the left, press `r`, and the analysis service
//! scores each block; the report on the right explains it and answers
//! follow-up questions per function.
//!
//! # Startup sequence
//!
//! 1. Parse flags, start file logging, load config. All of this happens
//!    before the terminal is touched so errors can still print to stderr.
//! 2. `install_panic_hook()` so a panic restores the terminal first.
//! 3. `register_sigterm()`; the flag is polled by the event loop.
//! 4. `init_tui()`, the event task and the highlighter thread.
//!
//! `restore_tui()` runs once after the loop, whichever way it ended.

mod app;
mod config;
mod editor;
mod event;
mod highlight;
mod logging;
mod service;
mod theme;
mod tui;
mod ui;

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use clap::Parser;

use sensei_core::client::HttpReviewService;
use sensei_core::types::{Language, SourceDocument};

use crate::config::{Config, Overrides, API_URL_ENV};
use crate::event::AppEvent;
use crate::ui::keybindings::{handle_key, handle_mouse, KeyAction};

#[derive(Debug, Parser)]
#[command(name = "sensei", version, about = "Interactive code-review assistant")]
struct Cli {
    /// Base URL of the analysis service.
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Source language: python, javascript, cpp, java or csharp.
    #[arg(long)]
    language: Option<Language>,

    /// Color theme: dark or catppuccin-mocha.
    #[arg(long)]
    theme: Option<String>,

    /// File to load into the editor instead of the sample.
    file: Option<PathBuf>,
}

/// Language whose extension matches `path`, if any.
fn language_for_path(path: &Path) -> Option<Language> {
    let ext = path.extension()?.to_str()?;
    let ext = match ext {
        "hpp" | "cc" | "cxx" | "h" => "cpp",
        "mjs" | "cjs" | "jsx" => "js",
        other => other,
    };
    Language::ALL.into_iter().find(|l| l.extension() == ext)
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    match logging::init() {
        Ok(path) => tracing::info!(log = %path.display(), "sensei starting"),
        Err(e) => eprintln!("sensei: file logging disabled: {e}"),
    }

    let file_language = cli.file.as_deref().and_then(language_for_path);
    let config = Config::load_or_default(&config::config_path()).layered(
        std::env::var(API_URL_ENV).ok(),
        Overrides {
            api_url: cli.api_url,
            language: cli.language.or(file_language),
            theme: cli.theme,
        },
    );
    let theme = theme::Theme::from_name(&config.theme);

    let mut document = SourceDocument { language: config.language, ..SourceDocument::default() };
    if let Some(path) = &cli.file {
        document.text = std::fs::read_to_string(path)?;
    }

    let service = HttpReviewService::new(&config.api_url, config.timeout())
        .map_err(std::io::Error::other)?;
    tracing::info!(api_url = service.base_url(), language = %config.language, "configured");

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm()?;
    let mut terminal = tui::init_tui()?;

    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());

    let (highlight_tx, highlight_rx) = crossbeam_channel::unbounded();
    let worker_tx = handler.tx.clone();
    let spawned = std::thread::Builder::new()
        .name("sensei-highlight".to_owned())
        .spawn(move || highlight::worker::highlight_worker_loop(highlight_rx, worker_tx));

    let mut state = app::AppState::new(document);
    state.dispatcher = Some(service::ServiceDispatcher::new(Arc::new(service), handler.tx.clone()));
    match spawned {
        Ok(_) => {
            state.highlight_tx = Some(highlight_tx);
            state.request_highlight();
        }
        Err(e) => tracing::warn!(error = %e, "highlighter thread failed to start"),
    }
    let mut rx = handler.rx;

    // Exits only via `break` so `restore_tui()` below always runs.
    let mut exit = Ok(());
    'event_loop: loop {
        tokio::select! {
            // Heartbeat so SIGTERM is noticed even when nothing else happens.
            _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(AppEvent::Render) => {
                        if let Err(e) = terminal.draw(|frame| ui::render(frame, &mut state, &theme)) {
                            exit = Err(e);
                            break 'event_loop;
                        }
                    }
                    Some(AppEvent::Key(key)) => {
                        if handle_key(key, &mut state) == KeyAction::Quit {
                            break 'event_loop;
                        }
                    }
                    Some(AppEvent::Mouse(mouse)) => {
                        handle_mouse(mouse, &mut state);
                    }
                    Some(AppEvent::Tick) => state.tick(),
                    Some(AppEvent::Highlighted(payload)) => {
                        state.apply_highlight(*payload);
                    }
                    Some(AppEvent::AnalysisFinished { pending, outcome }) => {
                        state.apply_analysis(&pending, outcome);
                    }
                    Some(AppEvent::ChatFinished { pending, outcome }) => {
                        state.apply_chat(&pending, outcome);
                    }
                    // The next Render picks up the new size from frame.area().
                    Some(AppEvent::Resize(_, _)) => {}
                    None => break 'event_loop,
                }
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    tui::restore_tui()?;
    tracing::info!("sensei exiting");
    exit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_extension_picks_the_language() {
        assert_eq!(language_for_path(Path::new("a/b.py")), Some(Language::Python));
        assert_eq!(language_for_path(Path::new("x.hpp")), Some(Language::Cpp));
        assert_eq!(language_for_path(Path::new("Main.cs")), Some(Language::Csharp));
        assert_eq!(language_for_path(Path::new("README")), None);
    }

    #[test]
    fn cli_parses_flags_and_file() {
        let cli = Cli::try_parse_from(["sensei", "--language", "java", "--api-url", "http://x", "Foo.java"])
            .unwrap();
        assert_eq!(cli.language, Some(Language::Java));
        assert_eq!(cli.api_url.as_deref(), Some("http://x"));
        assert_eq!(cli.file, Some(PathBuf::from("Foo.java")));
        assert!(Cli::try_parse_from(["sensei", "--language", "cobol"]).is_err());
    }
}
