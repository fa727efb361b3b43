//! Two-panel layout for sensei.
//!
//! Pure layout arithmetic, recomputed inside every `terminal.draw()` so each
//! frame reflects the live terminal size.
//!
//! At `>= 100` columns the editor and the report sit side by side, split by
//! `AppState.left_pct / right_pct`. Narrower terminals stack them, editor on
//! top. `Spacing::Overlap(1)` plus `MergeStrategy::Fuzzy` lets neighbouring
//! borders share one cell.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use sensei_core::SessionStatus;

use crate::app::{AppState, Mode};
use crate::theme::Theme;

pub const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Returns `[editor, report, status_bar]` for the current frame.
///
/// The rects are only valid inside the current draw closure.
pub fn compute_layout(frame: &Frame, state: &AppState) -> [Rect; 3] {
    let [main_area, status_bar] =
        frame.area().layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]));

    let split = if frame.area().width >= 100 {
        Layout::horizontal([
            Constraint::Percentage(state.left_pct),
            Constraint::Percentage(state.right_pct),
        ])
    } else {
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
    };

    let [editor, report] = main_area.layout(&split.spacing(Spacing::Overlap(1)));
    [editor, report, status_bar]
}

/// Panel area minus its 1-cell border.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Bordered block for a panel; thick border when focused.
pub fn panel_block<'a>(title: impl Into<Line<'a>>, is_focused: bool, theme: &Theme) -> Block<'a> {
    let border_style = if is_focused {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_focused { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Fuzzy)
}

/// One-row status bar: mode, language, request status, transient message and
/// a key hint.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let (mode_text, mode_fg) = match state.mode {
        Mode::Insert => (" INSERT ", theme.status_mode_insert),
        Mode::Chat => (" CHAT ", theme.status_mode_insert),
        Mode::Normal | Mode::HelpOverlay => (" NORMAL ", theme.status_mode_normal),
    };

    let mut spans = vec![
        Span::styled(mode_text, Style::default().fg(mode_fg).add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::raw(state.session.document().language.label()),
        Span::raw("  "),
    ];

    let status = match state.session.status() {
        SessionStatus::Idle => String::new(),
        SessionStatus::Loading => {
            format!("{} analyzing", SPINNER[state.spinner % SPINNER.len()])
        }
        SessionStatus::Success => {
            let n = state.card_count();
            format!("{n} function{}", if n == 1 { "" } else { "s" })
        }
        SessionStatus::Error => "analysis failed".to_owned(),
    };
    spans.push(Span::raw(status));

    if let Some(msg) = &state.status_message {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(msg.clone(), Style::default().add_modifier(Modifier::ITALIC)));
    }

    let left = Line::from(spans);
    let hint = Line::from(" r run  l language  ? help  q quit ")
        .style(Style::default().add_modifier(Modifier::DIM))
        .right_aligned();

    let style = Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg);
    frame.render_widget(Paragraph::new(left).style(style), area);
    if area.width >= 80 {
        frame.render_widget(Paragraph::new(hint), area);
    }
}
