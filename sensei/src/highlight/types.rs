//! Owned, `Send` messages exchanged with the highlighter thread.

use sensei_core::types::Language;

/// Text to highlight, tagged with the editor revision it was taken from.
#[derive(Debug, Clone)]
pub struct HighlightRequest {
    pub revision: u64,
    pub text: String,
    pub language: Language,
}

/// Styled lines for one revision, one entry per source line.
///
/// `'static` because every span owns its text, so the lines can be stored in
/// `AppState` and reused across frames.
#[derive(Debug)]
pub struct HighlightPayload {
    pub revision: u64,
    pub language: Language,
    pub lines: Vec<ratatui::text::Line<'static>>,
}
