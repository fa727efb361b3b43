//! Editor panel renderer.
//!
//! Virtual scrolling like a list: only rows `scroll..scroll + height` are
//! materialised per frame. Each row is a gutter (quality marker plus line
//! number) followed by the highlighted source when the highlighter has caught
//! up, or plain text otherwise. Rows inside the active block get the
//! highlight background across the full panel width.

use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use sensei_core::annotations::DecorationKind;
use unicode_width::UnicodeWidthChar;

use crate::app::{AppState, Mode, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

const TAB: &str = "    ";

/// Screen columns taken by the first `col` chars of `line`, with tabs drawn as
/// `TAB` and wide glyphs counted as two.
fn display_column(line: &str, col: usize) -> usize {
    line.chars()
        .take(col)
        .map(|c| if c == '\t' { TAB.len() } else { c.width().unwrap_or(0) })
        .sum()
}

pub fn render_editor(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let is_focused = state.focus == PanelFocus::Editor;
    let title = format!(" source_code.{} ", state.session.document().language.extension());
    frame.render_widget(panel_block(title, is_focused, theme), area);

    let inner = inner_rect(area);
    state.editor.set_viewport_height(inner.height);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let total = state.editor.lines().len();
    let digits = total.to_string().len();
    // marker + space + number + space
    let gutter = (digits + 3) as u16;

    let start = state.editor.scroll().min(total.saturating_sub(1));
    let end = (start + inner.height as usize).min(total);
    let highlight = state.current_highlight();

    let mut rows = Vec::with_capacity(end - start);
    for (offset, idx) in (start..end).enumerate() {
        let line_no = idx + 1;
        let y = inner.y + offset as u16;

        if state.editor.is_highlighted(line_no) {
            let row = Rect { x: inner.x, y, width: inner.width, height: 1 };
            frame.render_widget(
                Block::default().style(Style::default().bg(theme.active_highlight_bg)),
                row,
            );
        }

        let marker = match state.editor.line_marker(line_no) {
            Some(DecorationKind::Critical) => {
                Span::styled("●", Style::default().fg(theme.gutter_critical))
            }
            Some(DecorationKind::Warning) => {
                Span::styled("●", Style::default().fg(theme.gutter_warning))
            }
            _ => Span::raw(" "),
        };

        let mut spans = vec![
            marker,
            Span::raw(" "),
            Span::styled(
                format!("{line_no:>digits$} "),
                Style::default().fg(theme.line_number),
            ),
        ];
        match highlight.and_then(|lines| lines.get(idx)) {
            Some(styled) => spans.extend(
                styled
                    .spans
                    .iter()
                    .map(|s| Span::styled(s.content.replace('\t', TAB), s.style)),
            ),
            None => spans.push(Span::styled(
                state.editor.lines()[idx].replace('\t', TAB),
                Style::default().fg(theme.code_text),
            )),
        }
        rows.push(Line::from(spans));
    }
    frame.render_widget(Paragraph::new(rows), inner);

    if state.mode == Mode::Insert && is_focused {
        let (row, col) = state.editor.cursor();
        if row >= start && row < end {
            let column = display_column(&state.editor.lines()[row], col);
            let x = inner
                .x
                .saturating_add(gutter)
                .saturating_add(u16::try_from(column).unwrap_or(u16::MAX));
            let y = inner.y + (row - start) as u16;
            if x < inner.right() {
                frame.set_cursor_position(Position { x, y });
            }
        }
    } else if is_focused && state.mode == Mode::Normal {
        // Show where Insert would start without a blinking cursor.
        let (row, _) = state.editor.cursor();
        if row >= start && row < end {
            let y = inner.y + (row - start) as u16;
            let num = Rect { x: inner.x + 2, y, width: digits as u16, height: 1 };
            frame.buffer_mut().set_style(num, Style::default().add_modifier(Modifier::BOLD));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cursor_column_counts_tabs_and_wide_glyphs() {
        assert_eq!(display_column("abc", 2), 2);
        assert_eq!(display_column("\tx = 1", 2), 5);
        assert_eq!(display_column("名前 = 1", 2), 4);
        assert_eq!(display_column("π", 5), 1, "column past the end stops at the line");
    }
}
