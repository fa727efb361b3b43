//! Central application state for sensei.
//!
//! `AppState` owns the editor buffer, the analysis session and everything the
//! renderer needs to lay out the two panels. It is read by `ui::render` and
//! mutated by the key and mouse dispatcher and by the main loop when a
//! background result arrives. No rendering happens here.

use crossbeam_channel::Sender;
use ratatui::layout::{Position, Rect};
use ratatui::text::Line;

use sensei_core::annotations::{DecorationSync, EditorSurface};
use sensei_core::conversation::PendingChat;
use sensei_core::report_view::ReportTab;
use sensei_core::types::{AnalysisResult, BlockId, Rating, SourceDocument};
use sensei_core::{ApiError, ConversationError, PendingAnalysis, SessionController};

use crate::editor::EditorBuffer;
use crate::highlight::types::{HighlightPayload, HighlightRequest};
use crate::service::ServiceDispatcher;

/// Which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    /// Typing into the source editor.
    Insert,
    /// Typing a question into the selected card's chat.
    Chat,
    HelpOverlay,
}

/// Which panel receives navigation keys.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    #[default]
    Editor,
    Report,
}

pub struct AppState {
    pub mode: Mode,
    pub focus: PanelFocus,

    pub editor: EditorBuffer,
    pub session: SessionController,
    decorations: DecorationSync,

    /// Index into `session.cards()` of the keyboard-selected card.
    pub card_cursor: usize,
    /// Card currently under the mouse pointer.
    pub pointer_block: Option<BlockId>,
    /// Draft for the chat input of the selected card.
    pub chat_input: String,

    /// Vertical scroll offset of the report panel in rows.
    pub report_scroll: u16,
    pub report_viewport_height: u16,
    pub help_scroll: u16,

    /// On-screen rectangle of each visible card, cached by the renderer for
    /// mouse hit-testing.
    pub card_rects: Vec<(BlockId, Rect)>,
    /// `[editor, report]` panel rectangles from the last frame.
    pub panel_rects: [Rect; 2],

    /// Width percentage of the editor panel; the report panel takes the rest.
    pub left_pct: u16,
    pub right_pct: u16,

    /// Styled editor lines from the highlighter, valid for `highlight_seq`.
    pub highlighted: Vec<Line<'static>>,
    highlighted_seq: Option<u64>,
    highlight_seq: u64,

    /// Advances on every tick while a request is in flight.
    pub spinner: usize,
    /// One-line message for the status bar; cleared on the next key.
    pub status_message: Option<String>,

    pub dispatcher: Option<ServiceDispatcher>,
    pub highlight_tx: Option<Sender<HighlightRequest>>,
}

impl AppState {
    pub fn new(document: SourceDocument) -> Self {
        let editor = EditorBuffer::from_text(&document.text);
        Self {
            mode: Mode::default(),
            focus: PanelFocus::default(),
            editor,
            session: SessionController::new(document),
            decorations: DecorationSync::new(),
            card_cursor: 0,
            pointer_block: None,
            chat_input: String::new(),
            report_scroll: 0,
            report_viewport_height: 0,
            help_scroll: 0,
            card_rects: Vec::new(),
            panel_rects: [Rect::default(); 2],
            left_pct: 55,
            right_pct: 45,
            highlighted: Vec::new(),
            highlighted_seq: None,
            highlight_seq: 0,
            spinner: 0,
            status_message: None,
            dispatcher: None,
            highlight_tx: None,
        }
    }

    // -- source text --------------------------------------------------------

    /// Call after every edit to the buffer.
    pub fn text_changed(&mut self) {
        self.session.set_text(self.editor.text());
        self.sync_decorations();
        self.request_highlight();
    }

    pub fn cycle_language(&mut self) {
        let language = self.session.cycle_language();
        self.status_message = Some(format!("Language: {}", language.label()));
        self.request_highlight();
    }

    // -- highlighting -------------------------------------------------------

    /// Sends the current text to the highlighter thread, if one is running.
    pub fn request_highlight(&mut self) {
        let Some(tx) = &self.highlight_tx else {
            return;
        };
        self.highlight_seq += 1;
        let request = HighlightRequest {
            revision: self.highlight_seq,
            text: self.editor.text(),
            language: self.session.document().language,
        };
        if tx.send(request).is_err() {
            tracing::warn!("highlighter thread is gone; falling back to plain text");
            self.highlight_tx = None;
        }
    }

    /// Installs highlighter output unless a newer request has been sent.
    pub fn apply_highlight(&mut self, payload: HighlightPayload) -> bool {
        if payload.revision != self.highlight_seq
            || payload.language != self.session.document().language
        {
            return false;
        }
        self.highlighted = payload.lines;
        self.highlighted_seq = Some(payload.revision);
        true
    }

    /// Highlighted lines only if they match the text on screen.
    pub fn current_highlight(&self) -> Option<&[Line<'static>]> {
        (self.highlighted_seq == Some(self.highlight_seq)
            && self.highlighted.len() == self.editor.lines().len())
        .then_some(self.highlighted.as_slice())
    }

    // -- analysis -----------------------------------------------------------

    /// Starts a run and hands it to the dispatcher. Returns the ticket, or
    /// `None` if a run is already loading.
    pub fn run_analysis(&mut self) -> Option<PendingAnalysis> {
        self.session.set_text(self.editor.text());
        let Some(pending) = self.session.begin_analysis() else {
            self.status_message = Some("Analysis already running".to_owned());
            return None;
        };
        if self.mode == Mode::Chat {
            self.mode = Mode::Normal;
        }
        self.chat_input.clear();
        self.report_scroll = 0;
        self.sync_decorations();
        if let Some(dispatcher) = &self.dispatcher {
            dispatcher.analyze(pending.clone());
        }
        Some(pending)
    }

    pub fn apply_analysis(
        &mut self,
        pending: &PendingAnalysis,
        outcome: Result<AnalysisResult, ApiError>,
    ) {
        if !self.session.finish_analysis(pending, outcome) {
            return;
        }
        self.card_cursor = 0;
        self.report_scroll = 0;
        self.pointer_block = None;
        self.card_rects.clear();
        self.sync_decorations();
    }

    // -- selection ----------------------------------------------------------

    /// Pushes the session's current decoration plan into the editor.
    pub fn sync_decorations(&mut self) {
        let plan = self.session.decorations(self.editor.line_count());
        self.decorations.apply(&mut self.editor, &plan);
    }

    /// Id of the keyboard-selected card.
    pub fn selected_block(&self) -> Option<BlockId> {
        self.session.cards().get(self.card_cursor).map(|(meta, _)| meta.id())
    }

    pub fn card_count(&self) -> usize {
        self.session.cards().len()
    }

    /// Moves the keyboard selection and makes that card the active block.
    pub fn select_card(&mut self, index: usize) {
        let count = self.card_count();
        if count == 0 {
            return;
        }
        if let Some(old) = self.selected_block() {
            self.session.hover_leave(&old);
        }
        self.card_cursor = index.min(count - 1);
        if let Some(id) = self.selected_block() {
            self.session.hover_enter(&id);
        }
        self.sync_decorations();
    }

    pub fn next_card(&mut self) {
        self.select_card(self.card_cursor.saturating_add(1));
    }

    pub fn prev_card(&mut self) {
        self.select_card(self.card_cursor.saturating_sub(1));
    }

    /// Mouse hover: entering a card activates it, leaving it deactivates it.
    pub fn set_pointer_block(&mut self, block: Option<BlockId>) {
        if self.pointer_block == block {
            return;
        }
        if let Some(old) = self.pointer_block.take() {
            self.session.hover_leave(&old);
        }
        if let Some(id) = &block {
            self.session.hover_enter(id);
        }
        self.pointer_block = block;
        self.sync_decorations();
    }

    /// Card under screen position `pos`, from the last rendered frame.
    pub fn card_at(&self, pos: Position) -> Option<&BlockId> {
        self.card_rects.iter().find(|(_, rect)| rect.contains(pos)).map(|(id, _)| id)
    }

    pub fn set_focus(&mut self, focus: PanelFocus) {
        if self.focus == focus {
            return;
        }
        self.focus = focus;
        match focus {
            PanelFocus::Report => self.select_card(self.card_cursor),
            PanelFocus::Editor => {
                if let Some(id) = self.selected_block() {
                    if self.pointer_block.as_ref() != Some(&id) {
                        self.session.hover_leave(&id);
                        self.sync_decorations();
                    }
                }
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.pointer_block = None;
        if self.session.clear_selection() {
            self.sync_decorations();
        }
    }

    // -- cards ---------------------------------------------------------------

    pub fn toggle_expanded(&mut self) {
        if let Some(id) = self.selected_block() {
            self.session.toggle_expanded(&id);
        }
    }

    pub fn toggle_tab(&mut self) {
        if let Some(id) = self.selected_block() {
            let tab = self.session.toggle_tab(&id);
            if tab == ReportTab::Report && self.mode == Mode::Chat {
                self.mode = Mode::Normal;
            }
        }
    }

    /// Records a vote on the selected card and sends it once.
    pub fn vote(&mut self, rating: Rating) {
        let Some(id) = self.selected_block() else {
            return;
        };
        match self.session.vote(&id, rating) {
            Some(request) => {
                if let Some(dispatcher) = &self.dispatcher {
                    dispatcher.feedback(request);
                }
                self.status_message = Some("Thanks for the feedback".to_owned());
            }
            None => self.status_message = Some("Already rated".to_owned()),
        }
    }

    // -- chat ------------------------------------------------------------------

    /// Enters chat input if the selected card shows its chat tab.
    pub fn start_chat_input(&mut self) {
        let Some(id) = self.selected_block() else {
            return;
        };
        if self.session.card(&id).tab == ReportTab::Chat {
            self.session.set_expanded(&id, true);
            self.mode = Mode::Chat;
        } else {
            self.status_message = Some("Press Tab to open the chat".to_owned());
        }
    }

    /// Sends the draft for the selected card.
    pub fn send_chat(&mut self) -> Option<PendingChat> {
        let id = self.selected_block()?;
        match self.session.begin_chat(&id, &self.chat_input) {
            Ok(pending) => {
                self.chat_input.clear();
                if let Some(dispatcher) = &self.dispatcher {
                    dispatcher.chat(pending.clone());
                }
                Some(pending)
            }
            Err(ConversationError::EmptyMessage) => None,
            Err(e) => {
                self.status_message = Some(e.to_string());
                None
            }
        }
    }

    pub fn apply_chat(&mut self, pending: &PendingChat, outcome: Result<String, ApiError>) {
        self.session.finish_chat(pending, outcome);
    }

    pub fn reset_chat(&mut self) {
        if let Some(id) = self.selected_block() {
            let message = match self.session.reset_history(&id) {
                Ok(()) => "Conversation cleared",
                Err(_) => "Reply pending",
            };
            self.status_message = Some(message.to_owned());
        }
    }

    // -- scrolling and layout -------------------------------------------------

    pub fn tick(&mut self) {
        let busy = self.session.is_loading()
            || self.selected_block().is_some_and(|id| self.session.is_chat_pending(&id));
        if busy {
            self.spinner = self.spinner.wrapping_add(1);
        }
    }

    pub fn scroll_report_down(&mut self, rows: u16) {
        self.report_scroll = self.report_scroll.saturating_add(rows);
    }

    pub fn scroll_report_up(&mut self, rows: u16) {
        self.report_scroll = self.report_scroll.saturating_sub(rows);
    }

    /// Gives the report panel 5% more width, down to a 25% editor.
    pub fn shrink_editor_panel(&mut self) {
        const MIN_LEFT: u16 = 25;
        const STEP: u16 = 5;
        let transfer = STEP.min(self.left_pct.saturating_sub(MIN_LEFT));
        self.left_pct -= transfer;
        self.right_pct += transfer;
    }

    /// Gives the editor panel 5% more width, up to 75%.
    pub fn grow_editor_panel(&mut self) {
        const MAX_LEFT: u16 = 75;
        const STEP: u16 = 5;
        let transfer = STEP.min(MAX_LEFT.saturating_sub(self.left_pct));
        self.left_pct += transfer;
        self.right_pct -= transfer;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SourceDocument::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sensei_core::annotations::DecorationKind;
    use sensei_core::types::{AnalysisEntry, BlockMeta, QualityReport};
    use sensei_core::SessionStatus;

    fn report(score: f64) -> QualityReport {
        QualityReport {
            quality_score: score,
            complexity_estimate: "O(n)".into(),
            plain_english_explanation: "explains".into(),
            issues: Vec::new(),
        }
    }

    fn entry(name: &str, start: usize, end: usize, score: f64) -> AnalysisEntry {
        AnalysisEntry {
            meta: BlockMeta {
                function_name: name.into(),
                start_line: start,
                end_line: end,
                code: format!("def {name}(): pass"),
            },
            analysis: Some(report(score)),
        }
    }

    fn analysed(state: &mut AppState, results: Vec<AnalysisEntry>) {
        let pending = state.run_analysis().unwrap();
        state.apply_analysis(&pending, Ok(AnalysisResult { results }));
    }

    #[test]
    fn result_paints_gutter_and_keyboard_selection_highlights() {
        let mut state = AppState::default();
        analysed(&mut state, vec![entry("find_duplicate", 1, 8, 3.0), entry("ok", 2, 3, 9.0)]);
        assert_eq!(state.session.status(), SessionStatus::Success);
        assert_eq!(state.editor.line_marker(1), Some(DecorationKind::Critical));
        assert!(!state.editor.is_highlighted(2));

        state.set_focus(PanelFocus::Report);
        assert_eq!(state.selected_block().unwrap().function_name, "find_duplicate");
        assert!(state.editor.is_highlighted(2));

        state.next_card();
        assert_eq!(state.selected_block().unwrap().function_name, "ok");
        assert!(state.editor.is_highlighted(3));
        assert!(!state.editor.is_highlighted(5));

        state.set_focus(PanelFocus::Editor);
        assert!(state.session.active_block().is_none());
        assert!(!state.editor.is_highlighted(3));
    }

    #[test]
    fn pointer_leave_only_clears_its_own_block() {
        let mut state = AppState::default();
        analysed(&mut state, vec![entry("a", 1, 2, 9.0), entry("b", 3, 4, 9.0)]);
        let a = BlockId { function_name: "a".into(), start_line: 1, end_line: 2 };
        let b = BlockId { function_name: "b".into(), start_line: 3, end_line: 4 };

        state.set_pointer_block(Some(a.clone()));
        state.set_pointer_block(Some(b.clone()));
        assert_eq!(state.session.active_block().map(BlockMeta::id), Some(b));
        state.set_pointer_block(None);
        assert!(state.session.active_block().is_none());
    }

    #[test]
    fn second_run_while_loading_is_refused() {
        let mut state = AppState::default();
        assert!(state.run_analysis().is_some());
        assert!(state.run_analysis().is_none());
        assert_eq!(state.status_message.as_deref(), Some("Analysis already running"));
    }

    #[test]
    fn chat_needs_the_chat_tab_and_clears_the_draft() {
        let mut state = AppState::default();
        analysed(&mut state, vec![entry("a", 1, 2, 4.0)]);

        state.start_chat_input();
        assert_eq!(state.mode, Mode::Normal);

        state.toggle_tab();
        state.start_chat_input();
        assert_eq!(state.mode, Mode::Chat);

        state.chat_input = "   ".into();
        assert!(state.send_chat().is_none());

        state.chat_input = "why O(n^2)?".into();
        let pending = state.send_chat().unwrap();
        assert!(state.chat_input.is_empty());
        assert_eq!(pending.request.code_context, "def a(): pass");

        state.apply_chat(&pending, Ok("nested loop".into()));
        let id = state.selected_block().unwrap();
        assert_eq!(state.session.history(&id).len(), 2);
    }

    #[test]
    fn clearing_a_chat_waits_for_its_reply() {
        let mut state = AppState::default();
        analysed(&mut state, vec![entry("a", 1, 2, 4.0)]);
        state.toggle_tab();
        state.start_chat_input();
        state.chat_input = "why?".into();
        let pending = state.send_chat().unwrap();

        state.reset_chat();
        assert_eq!(state.status_message.as_deref(), Some("Reply pending"));
        state.start_chat_input();
        state.chat_input = "again?".into();
        assert!(state.send_chat().is_none(), "only one request per block at a time");

        state.apply_chat(&pending, Ok("because".into()));
        state.reset_chat();
        assert_eq!(state.status_message.as_deref(), Some("Conversation cleared"));
        let id = state.selected_block().unwrap();
        assert!(state.session.history(&id).is_empty());
    }

    #[test]
    fn stale_highlight_is_dropped() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut state = AppState::default();
        state.highlight_tx = Some(tx);

        state.request_highlight();
        state.editor.insert_char('x');
        state.text_changed();
        assert_eq!(rx.try_iter().count(), 2);

        let stale = HighlightPayload {
            revision: 1,
            language: state.session.document().language,
            lines: vec![Line::raw("old")],
        };
        assert!(!state.apply_highlight(stale));
        assert!(state.current_highlight().is_none());
    }

    #[test]
    fn panel_split_is_bounded() {
        let mut state = AppState::default();
        for _ in 0..20 {
            state.grow_editor_panel();
        }
        assert_eq!((state.left_pct, state.right_pct), (75, 25));
        for _ in 0..20 {
            state.shrink_editor_panel();
        }
        assert_eq!((state.left_pct, state.right_pct), (25, 75));
    }
}
