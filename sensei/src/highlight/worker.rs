//! Background thread that owns the syntect syntax and theme sets.
//!
//! The loop blocks on the request channel, skips straight to the newest
//! request when several queued up during typing, and sends the styled lines
//! back over the event bus.

use std::sync::LazyLock;

use crossbeam_channel::Receiver;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use tokio::sync::mpsc::UnboundedSender;

use sensei_core::types::Language;

use crate::event::AppEvent;
use crate::highlight::types::{HighlightPayload, HighlightRequest};

static PS: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static TS: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Entry point for the highlighter thread. Returns when every sender is gone.
pub fn highlight_worker_loop(rx: Receiver<HighlightRequest>, event_tx: UnboundedSender<AppEvent>) {
    // Load the sets up front so the first request is not slow.
    let _ = &*PS;
    let _ = &*TS;

    while let Ok(first) = rx.recv() {
        let request = rx.try_iter().last().unwrap_or(first);
        let lines = highlight_text(&request.text, request.language);
        let payload = HighlightPayload { revision: request.revision, language: request.language, lines };
        if event_tx.send(AppEvent::Highlighted(Box::new(payload))).is_err() {
            break;
        }
    }
    tracing::debug!("highlighter thread exiting");
}

/// Highlights `text` line by line. Falls back to unstyled lines when the
/// language or theme is unavailable.
pub fn highlight_text(text: &str, language: Language) -> Vec<Line<'static>> {
    let theme = TS.themes.get("base16-ocean.dark").or_else(|| TS.themes.values().next());
    let syntax = PS
        .find_syntax_by_extension(language.extension())
        .unwrap_or_else(|| PS.find_syntax_plain_text());

    let Some(theme) = theme else {
        return text.split('\n').map(|l| Line::raw(l.to_owned())).collect();
    };

    let mut h = HighlightLines::new(syntax, theme);
    text.split('\n')
        .map(|line| {
            // The newline-aware syntax set expects each line to keep its `\n`.
            let with_nl = format!("{line}\n");
            let ranges = h.highlight_line(&with_nl, &PS).unwrap_or_default();
            let spans: Vec<Span<'static>> = ranges
                .into_iter()
                .map(|(style, piece)| syntect_to_span(style, piece.trim_end_matches('\n')))
                .filter(|s| !s.content.is_empty())
                .collect();
            if spans.is_empty() {
                Line::raw(line.to_owned())
            } else {
                Line::from(spans)
            }
        })
        .collect()
}

/// Converts a syntect style/text pair into an owned ratatui span.
///
/// Only the foreground is carried over so the editor's own background (the
/// active-block highlight) shows through.
fn syntect_to_span(style: syntect::highlighting::Style, content: &str) -> Span<'static> {
    let fg = style.foreground;
    let mut ratatui_style = Style::default();
    if fg.a > 0 {
        ratatui_style = ratatui_style.fg(Color::Rgb(fg.r, fg.g, fg.b));
    }
    if style.font_style.contains(syntect::highlighting::FontStyle::BOLD) {
        ratatui_style = ratatui_style.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(syntect::highlighting::FontStyle::ITALIC) {
        ratatui_style = ratatui_style.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(syntect::highlighting::FontStyle::UNDERLINE) {
        ratatui_style = ratatui_style.add_modifier(Modifier::UNDERLINED);
    }
    Span::styled(content.to_owned(), ratatui_style)
}
