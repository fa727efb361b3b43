//! Report panel renderer.
//!
//! Four views: loading, error, ready (nothing analysed yet, or no functions
//! found) and the card list. Cards are laid out as plain rows so the panel
//! knows exactly where each one lands; the visible part of every card is
//! written back to `AppState.card_rects` for mouse hover.

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use textwrap::{Options, WrapAlgorithm};
use unicode_width::UnicodeWidthStr;

use sensei_core::report_view::{CardState, ReportTab};
use sensei_core::types::{
    BlockMeta, ConversationEntry, QualityReport, Rating, Role,
};
use sensei_core::SessionStatus;

use crate::app::{AppState, Mode, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block, SPINNER};

pub fn render_report(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let is_focused = state.focus == PanelFocus::Report;
    frame.render_widget(panel_block(" Sensei Report ", is_focused, theme), area);

    let inner = inner_rect(area);
    state.report_viewport_height = inner.height;
    state.card_rects.clear();
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    match state.session.status() {
        SessionStatus::Loading => {
            let spin = SPINNER[state.spinner % SPINNER.len()];
            render_message(
                frame,
                inner,
                vec![
                    Line::styled(format!("{spin} Analyzing your code..."), Style::default().fg(theme.muted)),
                ],
            );
        }
        SessionStatus::Error => {
            let mut lines = vec![
                Line::styled(
                    "Analysis Failed",
                    Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
                ),
                Line::raw(""),
            ];
            let message = state.session.error().unwrap_or_default();
            lines.extend(
                wrap_text(message, inner.width as usize)
                    .into_iter()
                    .map(|l| Line::styled(l, Style::default().fg(theme.error))),
            );
            lines.push(Line::raw(""));
            lines.push(Line::styled("Press r to try again.", Style::default().fg(theme.muted)));
            render_message(frame, inner, lines);
        }
        SessionStatus::Idle => {
            render_message(
                frame,
                inner,
                vec![
                    Line::styled("Ready to analyze", Style::default().add_modifier(Modifier::BOLD)),
                    Line::raw(""),
                    Line::styled(
                        "Write or paste code on the left, then press r.",
                        Style::default().fg(theme.muted),
                    ),
                ],
            );
        }
        SessionStatus::Success if state.card_count() == 0 => {
            render_message(
                frame,
                inner,
                vec![Line::styled("No functions found to analyze.", Style::default().fg(theme.muted))],
            );
        }
        SessionStatus::Success => render_cards(frame, inner, state, theme),
    }
}

fn render_message(frame: &mut Frame, area: Rect, lines: Vec<Line<'static>>) {
    let top = area.height.saturating_sub(lines.len() as u16) / 3;
    let area = Rect { y: area.y + top, height: area.height - top, ..area };
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

/// Rows of one card plus its identity, before scrolling is applied.
struct CardRows {
    id: sensei_core::types::BlockId,
    lines: Vec<Line<'static>>,
}

fn render_cards(frame: &mut Frame, inner: Rect, state: &mut AppState, theme: &Theme) {
    let width = inner.width as usize;
    let selected = state.selected_block();
    let active = state.session.active_block().map(BlockMeta::id);
    let chatting = state.mode == Mode::Chat;

    let cards: Vec<CardRows> = state
        .session
        .cards()
        .into_iter()
        .map(|(meta, report)| {
            let id = meta.id();
            let view = CardView {
                meta,
                report,
                card: state.session.card(&id),
                history: state.session.history(&id),
                pending: state.session.is_chat_pending(&id),
                selected: selected.as_ref() == Some(&id),
                active: active.as_ref() == Some(&id),
                input: (chatting && selected.as_ref() == Some(&id)).then_some(state.chat_input.as_str()),
                spinner: SPINNER[state.spinner % SPINNER.len()],
            };
            CardRows { lines: view.lines(width, theme), id }
        })
        .collect();

    let mut offsets = Vec::with_capacity(cards.len());
    let mut total = 0usize;
    for card in &cards {
        offsets.push(total);
        total += card.lines.len();
    }

    // Keep the selected card's header on screen while navigating by keyboard.
    let height = inner.height as usize;
    let mut scroll = (state.report_scroll as usize).min(total.saturating_sub(1));
    if state.focus == PanelFocus::Report {
        if let Some(idx) = cards.iter().position(|c| Some(&c.id) == selected.as_ref()) {
            let start = offsets[idx];
            if start < scroll {
                scroll = start;
            } else if start >= scroll + height {
                scroll = start;
            }
        }
    }
    state.report_scroll = u16::try_from(scroll).unwrap_or(u16::MAX);

    let mut visible = Vec::with_capacity(height);
    for (card, &start) in cards.iter().zip(&offsets) {
        let end = start + card.lines.len();
        let top = start.max(scroll);
        let bottom = end.min(scroll + height);
        if top >= bottom {
            continue;
        }
        state.card_rects.push((
            card.id.clone(),
            Rect {
                x: inner.x,
                y: inner.y + (top - scroll) as u16,
                width: inner.width,
                height: (bottom - top) as u16,
            },
        ));
        visible.extend(card.lines[top - start..bottom - start].iter().cloned());
    }

    frame.render_widget(Paragraph::new(visible), inner);
}

/// Everything needed to lay out one card.
struct CardView<'a> {
    meta: &'a BlockMeta,
    report: &'a QualityReport,
    card: CardState,
    history: &'a [ConversationEntry],
    pending: bool,
    selected: bool,
    active: bool,
    /// Chat draft, shown only while typing into this card.
    input: Option<&'a str>,
    spinner: &'static str,
}

impl CardView<'_> {
    fn lines(&self, width: usize, theme: &Theme) -> Vec<Line<'static>> {
        let mut out = Vec::new();
        let body_width = width.saturating_sub(2).max(1);
        let muted = Style::default().fg(theme.muted);

        // Header
        let accent = if self.selected { "▌" } else { " " };
        let fold = if self.card.expanded { "▾" } else { "▸" };
        let mut title = Style::default().fg(theme.card_title).add_modifier(Modifier::BOLD);
        if self.active {
            title = title.bg(theme.active_highlight_bg);
        }
        let badge = format!("Score: {}/10", format_score(self.report.quality_score));
        let name = format!("{}()", self.meta.function_name);
        let gap = width.saturating_sub(4 + name.width() + badge.width()).max(1);
        out.push(Line::from(vec![
            Span::styled(accent, Style::default().fg(theme.border_active)),
            Span::raw(format!("{fold} ")),
            Span::styled(name, title),
            Span::raw(" ".repeat(gap)),
            Span::styled(
                badge,
                Style::default().fg(theme.score(self.report.quality_score)).add_modifier(Modifier::BOLD),
            ),
        ]));
        out.push(Line::styled(
            format!("  Lines {} - {}", self.meta.start_line, self.meta.end_line),
            muted,
        ));

        if self.card.expanded {
            let (report_style, chat_style) = match self.card.tab {
                ReportTab::Report => (Style::default().fg(theme.tab_active).add_modifier(Modifier::BOLD | Modifier::UNDERLINED), muted),
                ReportTab::Chat => (muted, Style::default().fg(theme.tab_active).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)),
            };
            out.push(Line::from(vec![
                Span::raw("  "),
                Span::styled("Report", report_style),
                Span::raw("  "),
                Span::styled("Chat", chat_style),
            ]));
            out.push(Line::raw(""));

            match self.card.tab {
                ReportTab::Report => self.report_lines(&mut out, body_width, theme),
                ReportTab::Chat => self.chat_lines(&mut out, body_width, theme),
            }
        }

        out.push(Line::styled("─".repeat(width), Style::default().fg(theme.border_inactive)));
        out
    }

    fn report_lines(&self, out: &mut Vec<Line<'static>>, width: usize, theme: &Theme) {
        let muted = Style::default().fg(theme.muted);
        let label = muted.add_modifier(Modifier::BOLD);

        out.push(indent(Line::styled("Logic", label)));
        for l in wrap_text(&self.report.plain_english_explanation, width) {
            out.push(indent(Line::raw(l)));
        }
        out.push(Line::raw(""));
        out.push(indent(Line::from(vec![
            Span::styled("Complexity: ", label),
            Span::styled(self.report.complexity_estimate.clone(), Style::default().fg(theme.complexity)),
        ])));
        out.push(Line::raw(""));

        if self.report.issues.is_empty() {
            out.push(indent(Line::styled("✓ Clean code, no issues found.", Style::default().fg(theme.score_good))));
        } else {
            out.push(indent(Line::styled(format!("Issues ({})", self.report.issues.len()), label)));
            for issue in &self.report.issues {
                out.push(indent(Line::from(vec![
                    Span::styled(format!("• {}", issue.issue_type), Style::default().fg(theme.issue).add_modifier(Modifier::BOLD)),
                    Span::styled(format!(" [{}]", issue.severity.as_str()), muted),
                ])));
                for l in wrap_text(&issue.description, width.saturating_sub(2).max(1)) {
                    out.push(indent(Line::raw(format!("  {l}"))));
                }
                if let Some(fix) = issue.fix_suggestion.as_deref().filter(|f| !f.trim().is_empty()) {
                    out.push(indent(Line::styled("  Suggested fix:", muted)));
                    for l in fix.lines() {
                        out.push(indent(Line::styled(format!("    {l}"), Style::default().fg(theme.fix))));
                    }
                }
            }
        }
        out.push(Line::raw(""));

        let feedback = match self.card.vote {
            Some(Rating::Helpful) => Line::styled("Thanks! Marked as helpful.", muted),
            Some(Rating::NotHelpful) => Line::styled("Thanks! Marked as not helpful.", muted),
            None => Line::styled("Was this helpful?  + yes   - no", muted),
        };
        out.push(indent(feedback));
    }

    fn chat_lines(&self, out: &mut Vec<Line<'static>>, width: usize, theme: &Theme) {
        let muted = Style::default().fg(theme.muted);

        if self.history.is_empty() && !self.pending {
            out.push(indent(Line::styled("Ask a question about this function.", muted)));
        }
        for entry in self.history {
            let (who, style) = match (entry.role, entry.error) {
                (_, true) => ("Sensei", Style::default().fg(theme.error)),
                (Role::User, _) => ("You", Style::default().fg(theme.chat_user)),
                (Role::Assistant, _) => ("Sensei", Style::default().fg(theme.chat_assistant)),
            };
            out.push(indent(Line::styled(format!("{who}:"), style.add_modifier(Modifier::BOLD))));
            for l in wrap_text(&entry.content, width.saturating_sub(2).max(1)) {
                out.push(indent(Line::styled(format!("  {l}"), style)));
            }
        }
        if self.pending {
            out.push(indent(Line::styled(format!("{} Sensei is thinking...", self.spinner), muted)));
        }
        out.push(Line::raw(""));

        match self.input {
            Some(draft) => {
                let prompt = format!("> {draft}█");
                for l in wrap_text(&prompt, width) {
                    out.push(indent(Line::styled(l, Style::default().fg(theme.chat_user))));
                }
            }
            None => out.push(indent(Line::styled("Press i to ask, x to clear.", muted))),
        }
    }
}

fn indent(line: Line<'static>) -> Line<'static> {
    let mut spans = vec![Span::raw("  ")];
    spans.extend(line.spans);
    Line::from(spans).style(line.style)
}

/// `9.0` as `9`, `7.5` as `7.5`.
fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.0}")
    } else {
        format!("{score:.1}")
    }
}

/// Word wrap by display width. Existing line breaks are kept and words wider
/// than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let options = Options::new(width.max(1)).wrap_algorithm(WrapAlgorithm::FirstFit);
    textwrap::wrap(text, options).into_iter().map(|l| l.into_owned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wraps_on_words_and_keeps_breaks() {
        assert_eq!(
            wrap_text("the quick brown fox\njumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
    }

    #[test]
    fn splits_words_longer_than_the_width() {
        assert_eq!(wrap_text("ab abcdefgh", 4), vec!["ab", "abcd", "efgh"]);
        assert_eq!(wrap_text("", 4), vec![""]);
    }

    #[test]
    fn wide_characters_wrap_by_column() {
        let lines = wrap_text("日本語日本語 ok", 6);
        assert!(lines.iter().all(|l| l.width() <= 6), "{lines:?}");
        assert_eq!(lines.concat(), "日本語日本語ok");

        let emoji = wrap_text("🦀🦀🦀🦀", 4);
        assert_eq!(emoji, vec!["🦀🦀", "🦀🦀"]);
    }

    #[test]
    fn header_gap_uses_display_width() {
        let theme = Theme::dark();
        let meta = BlockMeta {
            function_name: "計算".to_owned(),
            start_line: 1,
            end_line: 2,
            code: String::new(),
        };
        let report = QualityReport {
            quality_score: 9.0,
            complexity_estimate: "O(1)".to_owned(),
            plain_english_explanation: String::new(),
            issues: Vec::new(),
        };
        let view = CardView {
            meta: &meta,
            report: &report,
            card: CardState { expanded: false, ..CardState::default() },
            history: &[],
            pending: false,
            selected: false,
            active: false,
            input: None,
            spinner: SPINNER[0],
        };
        let lines = view.lines(30, &theme);
        assert_eq!(lines[0].width(), 29, "two-column glyphs must shrink the gap");
    }

    #[test]
    fn scores_drop_a_zero_fraction() {
        assert_eq!(format_score(9.0), "9");
        assert_eq!(format_score(7.5), "7.5");
    }
}
