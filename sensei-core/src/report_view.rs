//! Per-card view state: expansion, active tab and feedback vote.
//!
//! Keyed by [`BlockId`] like the conversation store. Nothing here owns
//! conversation data, so flipping tabs cannot lose a history.

use std::collections::HashMap;

use crate::types::{BlockId, Rating};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportTab {
    #[default]
    Report,
    Chat,
}

impl ReportTab {
    pub fn toggle(self) -> Self {
        match self {
            ReportTab::Report => ReportTab::Chat,
            ReportTab::Chat => ReportTab::Report,
        }
    }
}

/// View state of one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardState {
    pub expanded: bool,
    pub tab: ReportTab,
    /// Vote already sent for this card, if any.
    pub vote: Option<Rating>,
}

impl Default for CardState {
    fn default() -> Self {
        Self { expanded: true, tab: ReportTab::Report, vote: None }
    }
}

#[derive(Debug, Default)]
pub struct ReportViewState {
    cards: HashMap<BlockId, CardState>,
}

impl ReportViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State for `id`, defaulting to expanded on the report tab.
    pub fn card(&self, id: &BlockId) -> CardState {
        self.cards.get(id).copied().unwrap_or_default()
    }

    fn card_mut(&mut self, id: &BlockId) -> &mut CardState {
        self.cards.entry(id.clone()).or_default()
    }

    pub fn toggle_expanded(&mut self, id: &BlockId) -> bool {
        let card = self.card_mut(id);
        card.expanded = !card.expanded;
        card.expanded
    }

    pub fn set_expanded(&mut self, id: &BlockId, expanded: bool) {
        self.card_mut(id).expanded = expanded;
    }

    pub fn set_tab(&mut self, id: &BlockId, tab: ReportTab) {
        self.card_mut(id).tab = tab;
    }

    pub fn toggle_tab(&mut self, id: &BlockId) -> ReportTab {
        let card = self.card_mut(id);
        card.tab = card.tab.toggle();
        card.tab
    }

    /// Records a vote. Only the first vote per card counts; returns `true`
    /// when this call recorded it.
    pub fn record_vote(&mut self, id: &BlockId, rating: Rating) -> bool {
        let card = self.card_mut(id);
        if card.vote.is_some() {
            return false;
        }
        card.vote = Some(rating);
        true
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }
}
