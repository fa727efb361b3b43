//! UI rendering for sensei.
//!
//! `render()` is the only entry point and is called once per
//! `AppEvent::Render` from inside `terminal.draw()`. Layout arithmetic lives
//! in `layout.rs`; each panel has its own module.

mod layout;
pub mod editor_view;
pub mod help;
pub mod keybindings;
pub mod report_panel;

use ratatui::Frame;

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use layout::{compute_layout, render_status_bar};

/// Renders one frame.
///
/// Panel rects, viewport heights and card positions are written back into
/// `state` so the next key or mouse event can use them.
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let [editor, report, status_bar] = compute_layout(frame, state);
    state.panel_rects = [editor, report];

    editor_view::render_editor(frame, editor, state, theme);
    report_panel::render_report(frame, report, state, theme);
    render_status_bar(frame, status_bar, state, theme);

    if state.mode == Mode::HelpOverlay {
        help::render_help_overlay(frame, theme, state.help_scroll);
    }
}
