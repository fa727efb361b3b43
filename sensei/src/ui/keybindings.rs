//! Key and mouse dispatcher for sensei.
//!
//! Translates crossterm events into `AppState` mutations and returns a
//! `KeyAction` telling the event loop whether to keep going. Branches first
//! on `state.mode`, then on the focused panel.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

use sensei_core::types::Rating;

use crate::app::{AppState, Mode, PanelFocus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Quit,
}

pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    state.status_message = None;
    match state.mode {
        Mode::HelpOverlay => handle_help(key, state),
        Mode::Normal => handle_normal(key, state),
        Mode::Insert => handle_insert(key, state),
        Mode::Chat => handle_chat(key, state),
    }
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_normal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    let handled = match state.focus {
        PanelFocus::Editor => handle_editor_key(key, state),
        PanelFocus::Report => handle_report_key(key, state),
    };
    if handled {
        return KeyAction::Continue;
    }

    match key.code {
        KeyCode::Char('r') => {
            state.run_analysis();
        }
        KeyCode::Char('l') => state.cycle_language(),
        KeyCode::Char('H') => state.set_focus(PanelFocus::Editor),
        KeyCode::Char('L') => state.set_focus(PanelFocus::Report),
        KeyCode::Char('<') => state.shrink_editor_panel(),
        KeyCode::Char('>') => state.grow_editor_panel(),
        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
        }
        KeyCode::Esc => state.clear_selection(),
        KeyCode::Char('q') => return KeyAction::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return KeyAction::Quit;
        }
        _ => {}
    }
    KeyAction::Continue
}

/// Editor-panel navigation. Returns `true` if the key was consumed.
fn handle_editor_key(key: KeyEvent, state: &mut AppState) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let editor = &mut state.editor;
    match key.code {
        KeyCode::Char('i') => state.mode = Mode::Insert,
        KeyCode::Char('a') => {
            editor.move_right();
            state.mode = Mode::Insert;
        }
        KeyCode::Char('j') | KeyCode::Down => editor.move_down(),
        KeyCode::Char('k') | KeyCode::Up => editor.move_up(),
        KeyCode::Left => editor.move_left(),
        KeyCode::Right => editor.move_right(),
        KeyCode::Char('g') => editor.scroll_top(),
        KeyCode::Char('G') => editor.scroll_bottom(),
        KeyCode::Char('d') if ctrl => {
            let half = editor.half_page();
            editor.scroll_down(half);
        }
        KeyCode::Char('u') if ctrl => {
            let half = editor.half_page();
            editor.scroll_up(half);
        }
        _ => return false,
    }
    true
}

/// Report-panel keys. Returns `true` if the key was consumed.
fn handle_report_key(key: KeyEvent, state: &mut AppState) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let half = (state.report_viewport_height / 2).max(1);
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.next_card(),
        KeyCode::Char('k') | KeyCode::Up => state.prev_card(),
        KeyCode::Enter | KeyCode::Char(' ') => state.toggle_expanded(),
        KeyCode::Tab => state.toggle_tab(),
        KeyCode::Char('i') => state.start_chat_input(),
        KeyCode::Char('x') => state.reset_chat(),
        KeyCode::Char('+') | KeyCode::Char('=') => state.vote(Rating::Helpful),
        KeyCode::Char('-') => state.vote(Rating::NotHelpful),
        KeyCode::Char('g') => state.report_scroll = 0,
        KeyCode::Char('G') => state.report_scroll = u16::MAX,
        KeyCode::Char('d') if ctrl => state.scroll_report_down(half),
        KeyCode::Char('u') if ctrl => state.scroll_report_up(half),
        _ => return false,
    }
    true
}

// ---------------------------------------------------------------------------
// Insert mode
// ---------------------------------------------------------------------------

fn handle_insert(key: KeyEvent, state: &mut AppState) -> KeyAction {
    let editor = &mut state.editor;
    let edited = match key.code {
        KeyCode::Esc => {
            state.mode = Mode::Normal;
            false
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            editor.insert_char(c);
            true
        }
        KeyCode::Enter => {
            editor.insert_newline();
            true
        }
        KeyCode::Tab => {
            editor.insert_tab();
            true
        }
        KeyCode::Backspace => {
            editor.backspace();
            true
        }
        KeyCode::Delete => {
            editor.delete();
            true
        }
        KeyCode::Left => {
            editor.move_left();
            false
        }
        KeyCode::Right => {
            editor.move_right();
            false
        }
        KeyCode::Up => {
            editor.move_up();
            false
        }
        KeyCode::Down => {
            editor.move_down();
            false
        }
        KeyCode::Home => {
            editor.move_home();
            false
        }
        KeyCode::End => {
            editor.move_end();
            false
        }
        _ => false,
    };
    if edited {
        state.text_changed();
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Chat mode
// ---------------------------------------------------------------------------

fn handle_chat(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Esc => state.mode = Mode::Normal,
        KeyCode::Enter => {
            state.send_chat();
        }
        KeyCode::Backspace => {
            state.chat_input.pop();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.chat_input.push(c);
        }
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// HelpOverlay mode
// ---------------------------------------------------------------------------

fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            state.help_scroll = state.help_scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.help_scroll = state.help_scroll.saturating_sub(1);
        }
        KeyCode::Char('g') => state.help_scroll = 0,
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.mode = Mode::Normal,
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Hover drives the active block; click focuses a panel or selects a card;
/// the wheel scrolls whatever is under the pointer.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) -> KeyAction {
    let pos = Position { x: mouse.column, y: mouse.row };
    if state.mode == Mode::HelpOverlay {
        match mouse.kind {
            MouseEventKind::ScrollUp => state.help_scroll = state.help_scroll.saturating_sub(3),
            MouseEventKind::ScrollDown => state.help_scroll = state.help_scroll.saturating_add(3),
            _ => {}
        }
        return KeyAction::Continue;
    }

    match mouse.kind {
        MouseEventKind::Moved => {
            let hovered = state.card_at(pos).cloned();
            state.set_pointer_block(hovered);
        }
        MouseEventKind::Down(MouseButton::Left) => handle_click(pos, state),
        MouseEventKind::ScrollUp => scroll_under(pos, state, false),
        MouseEventKind::ScrollDown => scroll_under(pos, state, true),
        _ => {}
    }
    KeyAction::Continue
}

fn handle_click(pos: Position, state: &mut AppState) {
    let [editor, report] = state.panel_rects;
    if editor.contains(pos) {
        if state.mode == Mode::Chat {
            state.mode = Mode::Normal;
        }
        state.set_focus(PanelFocus::Editor);
    } else if report.contains(pos) {
        state.set_focus(PanelFocus::Report);
        let clicked = state.card_at(pos).cloned();
        if let Some(id) = clicked {
            let index = state.session.cards().iter().position(|(meta, _)| meta.id() == id);
            if let Some(index) = index {
                state.select_card(index);
            }
        }
    }
}

fn scroll_under(pos: Position, state: &mut AppState, down: bool) {
    let [editor, report] = state.panel_rects;
    if editor.contains(pos) {
        if down {
            state.editor.scroll_down(3);
        } else {
            state.editor.scroll_up(3);
        }
    } else if report.contains(pos) {
        if down {
            state.scroll_report_down(3);
        } else {
            state.scroll_report_up(3);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ratatui::layout::Rect;
    use sensei_core::types::{AnalysisEntry, AnalysisResult, BlockMeta, QualityReport};

    fn press(state: &mut AppState, code: KeyCode) -> KeyAction {
        handle_key(KeyEvent::new(code, KeyModifiers::NONE), state)
    }

    fn moved(state: &mut AppState, x: u16, y: u16) {
        handle_mouse(
            MouseEvent {
                kind: MouseEventKind::Moved,
                column: x,
                row: y,
                modifiers: KeyModifiers::NONE,
            },
            state,
        );
    }

    fn analysed_state() -> AppState {
        let mut state = AppState::default();
        let pending = state.run_analysis().unwrap();
        let entry = |name: &str, start, end| AnalysisEntry {
            meta: BlockMeta {
                function_name: name.into(),
                start_line: start,
                end_line: end,
                code: String::new(),
            },
            analysis: Some(QualityReport {
                quality_score: 6.0,
                complexity_estimate: "O(n)".into(),
                plain_english_explanation: String::new(),
                issues: Vec::new(),
            }),
        };
        state.apply_analysis(
            &pending,
            Ok(AnalysisResult { results: vec![entry("a", 1, 2), entry("b", 4, 6)] }),
        );
        state
    }

    #[test]
    fn typing_in_insert_mode_reaches_the_session() {
        let mut state = AppState::default();
        press(&mut state, KeyCode::Char('i'));
        assert_eq!(state.mode, Mode::Insert);
        press(&mut state, KeyCode::Char('#'));
        assert!(state.session.document().text.starts_with('#'));
        // Insert-mode letters are text, not commands.
        assert_eq!(press(&mut state, KeyCode::Char('q')), KeyAction::Continue);
        press(&mut state, KeyCode::Esc);
        assert_eq!(state.mode, Mode::Normal);
        assert_eq!(press(&mut state, KeyCode::Char('q')), KeyAction::Quit);
    }

    #[test]
    fn language_key_cycles() {
        let mut state = AppState::default();
        press(&mut state, KeyCode::Char('l'));
        assert_eq!(state.session.document().language.label(), "JavaScript");
    }

    #[test]
    fn hovering_cards_moves_the_highlight() {
        let mut state = analysed_state();
        let a = BlockMeta { function_name: "a".into(), start_line: 1, end_line: 2, code: String::new() }.id();
        let b = BlockMeta { function_name: "b".into(), start_line: 4, end_line: 6, code: String::new() }.id();
        state.card_rects = vec![
            (a.clone(), Rect::new(50, 1, 40, 5)),
            (b.clone(), Rect::new(50, 6, 40, 5)),
        ];

        moved(&mut state, 60, 2);
        assert!(state.editor.is_highlighted(1));
        moved(&mut state, 60, 7);
        assert!(state.editor.is_highlighted(5));
        assert!(!state.editor.is_highlighted(1));
        moved(&mut state, 10, 7);
        assert!(state.session.active_block().is_none());
    }

    #[test]
    fn report_keys_drive_the_selected_card() {
        let mut state = analysed_state();
        press(&mut state, KeyCode::Char('L'));
        press(&mut state, KeyCode::Char('j'));
        let id = state.selected_block().unwrap();
        assert_eq!(id.function_name, "b");

        press(&mut state, KeyCode::Enter);
        assert!(!state.session.card(&id).expanded);

        press(&mut state, KeyCode::Char('+'));
        press(&mut state, KeyCode::Char('-'));
        assert_eq!(state.session.card(&id).vote, Some(Rating::Helpful));
        assert_eq!(state.status_message.as_deref(), Some("Already rated"));
    }
}
