//! Help overlay.
//!
//! Drawn last inside the same `terminal.draw()` closure: `Clear` erases the
//! area, then a bordered `Paragraph` lists the keys.

use ratatui::{
    Frame,
    layout::Constraint,
    style::{Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;

pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    // Too narrow for a readable modal.
    if frame.area().width < 50 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(80), Constraint::Percentage(80));

    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help  (j/k scroll, ? or Esc to close) ")
        .border_style(Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(build_help_text(theme))
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn build_help_text(theme: &Theme) -> Text<'static> {
    let heading = |s: &'static str| {
        Line::styled(s, Style::default().fg(theme.card_title).add_modifier(Modifier::BOLD))
    };
    Text::from(vec![
        heading("General"),
        Line::from("  r             Run analysis on the current code"),
        Line::from("  l             Cycle language (Python, JavaScript, C++, Java, C#)"),
        Line::from("  H / L         Focus editor / report panel"),
        Line::from("  < / >         Shrink / grow the editor panel"),
        Line::from("  Esc           Clear the highlighted function"),
        Line::from("  ?             Open / close this help"),
        Line::from("  q             Quit"),
        Line::from(""),
        heading("Editor"),
        Line::from("  i / a         Edit code (Esc to stop)"),
        Line::from("  j / k         Move cursor down / up"),
        Line::from("  g / G         Jump to top / bottom"),
        Line::from("  Ctrl-d / u    Scroll half page down / up"),
        Line::from(""),
        heading("Report"),
        Line::from("  j / k         Next / previous function (highlights it in the editor)"),
        Line::from("  Enter, Space  Expand / collapse the card"),
        Line::from("  Tab           Switch between Report and Chat"),
        Line::from("  i             Ask a follow-up question (Chat tab)"),
        Line::from("  x             Clear the conversation"),
        Line::from("  + / -         Rate the explanation helpful / not helpful"),
        Line::from("  Ctrl-d / u    Scroll half page down / up"),
        Line::from(""),
        heading("Mouse"),
        Line::from("  Hover a card to highlight its function; click to select; wheel scrolls."),
    ])
}
