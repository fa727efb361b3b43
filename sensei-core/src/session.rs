//! The analysis session: document, request lifecycle and per-block state.
//!
//! [`SessionController`] is the single writer of the document, the current
//! result set, the selection, the conversations and the card view state. It
//! does no I/O. Starting a remote call hands out a pending ticket; the caller
//! performs the call and returns the outcome with that ticket. Tickets make
//! re-entrancy explicit: a second run while one is loading is refused, and an
//! outcome whose ticket is no longer current is ignored.
//!
//! # Result replacement
//!
//! A run does not discard the previous result set when it starts. The old set
//! is kept (hidden behind the loading view) until a valid replacement arrives,
//! and it survives a failed run untouched. Installing a replacement is a
//! single assignment, after which selection, conversations and card state
//! start over from their defaults.

use crate::annotations::{map_decorations, DecorationPlan};
use crate::conversation::{ConversationStore, PendingChat};
use crate::error::{ApiError, ConversationError};
use crate::report_view::{CardState, ReportTab, ReportViewState};
use crate::selection::BlockSelection;
use crate::types::{
    AnalysisRequest, AnalysisResult, BlockId, BlockMeta, ConversationEntry, FeedbackRequest,
    Language, QualityReport, Rating, SourceDocument,
};

/// Lifecycle of the analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// An `/analyze` call that has been started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAnalysis {
    pub generation: u64,
    pub request: AnalysisRequest,
}

#[derive(Debug, Default)]
pub struct SessionController {
    document: SourceDocument,
    status: SessionStatus,
    result: Option<AnalysisResult>,
    /// Snapshot the installed result was computed from.
    analysed: Option<AnalysisRequest>,
    error: Option<String>,
    in_flight: Option<PendingAnalysis>,
    generation: u64,
    selection: BlockSelection,
    conversations: ConversationStore,
    view: ReportViewState,
}

impl SessionController {
    pub fn new(document: SourceDocument) -> Self {
        Self { document, ..Self::default() }
    }

    // -- document -----------------------------------------------------------

    pub fn document(&self) -> &SourceDocument {
        &self.document
    }

    /// Content-change callback from the editor.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.document.text = text.into();
    }

    pub fn set_language(&mut self, language: Language) {
        self.document.language = language;
    }

    pub fn cycle_language(&mut self) -> Language {
        self.document.language = self.document.language.next();
        self.document.language
    }

    // -- analysis lifecycle -------------------------------------------------

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Loading
    }

    /// Message for the error view. Set only in [`SessionStatus::Error`].
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Most recent valid result set, whether or not it is on screen.
    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// Result set currently shown: only after a successful run.
    pub fn displayed_result(&self) -> Option<&AnalysisResult> {
        match self.status {
            SessionStatus::Success => self.result.as_ref(),
            _ => None,
        }
    }

    /// Snapshot the displayed result was computed from.
    pub fn analysed_request(&self) -> Option<&AnalysisRequest> {
        self.analysed.as_ref()
    }

    /// Cards to render, in service order, skipping blocks without a report.
    pub fn cards(&self) -> Vec<(&BlockMeta, &QualityReport)> {
        self.displayed_result().map(|r| r.reports().collect()).unwrap_or_default()
    }

    fn displayed_meta(&self, id: &BlockId) -> Option<&BlockMeta> {
        self.displayed_result().and_then(|r| r.find(id)).map(|(meta, _)| meta)
    }

    /// Starts a run. Returns `None` while another run is loading; in that case
    /// nothing changes.
    pub fn begin_analysis(&mut self) -> Option<PendingAnalysis> {
        if self.is_loading() {
            tracing::debug!("analysis already in flight; ignoring run");
            return None;
        }
        self.generation += 1;
        let pending = PendingAnalysis {
            generation: self.generation,
            request: AnalysisRequest::from(&self.document),
        };
        self.status = SessionStatus::Loading;
        self.error = None;
        self.selection.clear();
        self.in_flight = Some(pending.clone());
        tracing::debug!(
            generation = pending.generation,
            language = %pending.request.language,
            "analysis started"
        );
        Some(pending)
    }

    /// Applies the outcome of a run. Returns `false` if `pending` is not the
    /// run in flight.
    pub fn finish_analysis(
        &mut self,
        pending: &PendingAnalysis,
        outcome: Result<AnalysisResult, ApiError>,
    ) -> bool {
        if self.in_flight.as_ref().map(|p| p.generation) != Some(pending.generation) {
            tracing::debug!(generation = pending.generation, "ignoring stale analysis outcome");
            return false;
        }
        self.in_flight = None;

        match outcome {
            Ok(result) => {
                tracing::info!(
                    blocks = result.results.len(),
                    reports = result.reports().count(),
                    "analysis installed"
                );
                self.result = Some(result);
                self.analysed = Some(pending.request.clone());
                self.selection.clear();
                self.conversations.clear();
                self.view.clear();
                self.status = SessionStatus::Success;
            }
            Err(err) => {
                tracing::warn!(error = %err, "analysis failed");
                self.error = Some(err.user_message());
                self.status = SessionStatus::Error;
            }
        }
        true
    }

    // -- selection ----------------------------------------------------------

    pub fn active_block(&self) -> Option<&BlockMeta> {
        self.selection.active()
    }

    /// Hover or focus entered a card. Unknown ids are ignored.
    pub fn hover_enter(&mut self, id: &BlockId) -> bool {
        match self.displayed_meta(id).cloned() {
            Some(meta) => self.selection.enter(&meta),
            None => false,
        }
    }

    pub fn hover_leave(&mut self, id: &BlockId) -> bool {
        self.selection.leave(id)
    }

    pub fn clear_selection(&mut self) -> bool {
        self.selection.clear()
    }

    /// Decorations for the current state, clamped to `line_count`.
    pub fn decorations(&self, line_count: usize) -> DecorationPlan {
        map_decorations(self.displayed_result(), self.selection.active(), line_count)
    }

    // -- card view state ----------------------------------------------------

    pub fn card(&self, id: &BlockId) -> CardState {
        self.view.card(id)
    }

    pub fn toggle_expanded(&mut self, id: &BlockId) -> bool {
        self.view.toggle_expanded(id)
    }

    pub fn set_expanded(&mut self, id: &BlockId, expanded: bool) {
        self.view.set_expanded(id, expanded);
    }

    pub fn set_tab(&mut self, id: &BlockId, tab: ReportTab) {
        self.view.set_tab(id, tab);
    }

    pub fn toggle_tab(&mut self, id: &BlockId) -> ReportTab {
        self.view.toggle_tab(id)
    }

    /// Records a vote and returns the feedback to send, once per card.
    pub fn vote(&mut self, id: &BlockId, rating: Rating) -> Option<FeedbackRequest> {
        let (meta, report) = self.displayed_result()?.find(id)?;
        let request = FeedbackRequest {
            function_name: meta.function_name.clone(),
            code: meta.code.clone(),
            explanation: report.plain_english_explanation.clone(),
            rating,
        };
        self.view.record_vote(id, rating).then_some(request)
    }

    // -- conversations ------------------------------------------------------

    pub fn history(&self, id: &BlockId) -> &[ConversationEntry] {
        self.conversations.history(id)
    }

    pub fn is_chat_pending(&self, id: &BlockId) -> bool {
        self.conversations.is_pending(id)
    }

    /// Starts a follow-up question about block `id`.
    ///
    /// The block's own source slice is the code context; the language is the
    /// one the result was analysed under.
    pub fn begin_chat(&mut self, id: &BlockId, message: &str) -> Result<PendingChat, ConversationError> {
        let meta = self.displayed_meta(id).ok_or(ConversationError::UnknownBlock)?;
        let code_context = meta.code.clone();
        let language = self
            .analysed
            .as_ref()
            .map(|r| r.language)
            .unwrap_or(self.document.language);
        self.conversations.begin_send(id, message, &code_context, language)
    }

    pub fn finish_chat(&mut self, pending: &PendingChat, outcome: Result<String, ApiError>) -> bool {
        self.conversations.finish_send(pending, outcome)
    }

    /// Clears `id`'s conversation. Refused while its reply is pending.
    pub fn reset_history(&mut self, id: &BlockId) -> Result<(), ConversationError> {
        self.conversations.reset(id)
    }
}
