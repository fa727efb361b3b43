//! Per-block follow-up conversations.
//!
//! Histories are keyed by [`BlockId`], so re-rendering, collapsing or switching
//! tabs never moves a message from one block to another. Entries are
//! append-only. Each history allows one outstanding chat call and cannot be
//! reset while it is out. The pending slot holds a ticket number so a reply
//! that arrives after the store was cleared for a new result is dropped.

use std::collections::HashMap;

use crate::error::{ApiError, ConversationError};
use crate::types::{BlockId, ChatRequest, ConversationEntry, Language};

#[derive(Debug, Default)]
struct History {
    entries: Vec<ConversationEntry>,
    pending: Option<u64>,
}

/// A chat call that has been started but not finished.
///
/// Returned by [`ConversationStore::begin_send`]; hand it back to
/// [`ConversationStore::finish_send`] together with the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChat {
    pub block: BlockId,
    pub ticket: u64,
    pub request: ChatRequest,
}

#[derive(Debug, Default)]
pub struct ConversationStore {
    histories: HashMap<BlockId, History>,
    next_ticket: u64,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordered history for `id`; empty if nothing was said yet.
    pub fn history(&self, id: &BlockId) -> &[ConversationEntry] {
        self.histories.get(id).map(|h| h.entries.as_slice()).unwrap_or(&[])
    }

    /// Appends to `id`'s history, creating it on first use.
    pub fn append(&mut self, id: &BlockId, entry: ConversationEntry) {
        self.histories.entry(id.clone()).or_default().entries.push(entry);
    }

    /// Drops `id`'s history.
    ///
    /// # Errors
    ///
    /// [`ConversationError::ReplyPending`] while a reply for `id` is
    /// outstanding; the history is left as it was.
    pub fn reset(&mut self, id: &BlockId) -> Result<(), ConversationError> {
        if self.is_pending(id) {
            return Err(ConversationError::ReplyPending);
        }
        self.histories.remove(id);
        Ok(())
    }

    /// Drops every history. Called when a new result set is installed.
    pub fn clear(&mut self) {
        self.histories.clear();
    }

    /// `true` while a reply for `id` is outstanding; the send control for that
    /// block is disabled.
    pub fn is_pending(&self, id: &BlockId) -> bool {
        self.histories.get(id).is_some_and(|h| h.pending.is_some())
    }

    pub fn len(&self) -> usize {
        self.histories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }

    /// Starts a send: appends the user's message immediately and builds the
    /// request for the service.
    ///
    /// The request's `history` is what preceded this message, without local
    /// error notices.
    ///
    /// # Errors
    ///
    /// [`ConversationError::EmptyMessage`] for blank input and
    /// [`ConversationError::SendInFlight`] while a reply for `id` is pending.
    /// Neither touches the history.
    pub fn begin_send(
        &mut self,
        id: &BlockId,
        message: &str,
        code_context: &str,
        language: Language,
    ) -> Result<PendingChat, ConversationError> {
        if message.trim().is_empty() {
            return Err(ConversationError::EmptyMessage);
        }
        if self.is_pending(id) {
            return Err(ConversationError::SendInFlight);
        }

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let history = self.histories.entry(id.clone()).or_default();

        let prior: Vec<ConversationEntry> =
            history.entries.iter().filter(|e| !e.error).cloned().collect();
        history.entries.push(ConversationEntry::user(message));
        history.pending = Some(ticket);

        tracing::debug!(block = %id, ticket, "chat send started");
        Ok(PendingChat {
            block: id.clone(),
            ticket,
            request: ChatRequest {
                message: message.to_owned(),
                code_context: code_context.to_owned(),
                language,
                history: prior,
            },
        })
    }

    /// Completes a send with the service's answer or failure.
    ///
    /// Success appends the assistant reply; failure appends one error notice.
    /// The user's message stays either way. Returns `false` if the store was
    /// cleared since the send began, in which case nothing is written.
    pub fn finish_send(
        &mut self,
        pending: &PendingChat,
        outcome: Result<String, ApiError>,
    ) -> bool {
        let Some(history) = self.histories.get_mut(&pending.block) else {
            tracing::debug!(block = %pending.block, "dropping reply for discarded history");
            return false;
        };
        if history.pending != Some(pending.ticket) {
            tracing::debug!(block = %pending.block, ticket = pending.ticket, "dropping stale reply");
            return false;
        }
        history.pending = None;

        let entry = match outcome {
            Ok(reply) => ConversationEntry::assistant(reply),
            Err(err) => {
                tracing::warn!(block = %pending.block, error = %err, "chat request failed");
                ConversationEntry::error_notice(err.chat_notice())
            }
        };
        history.entries.push(entry);
        true
    }
}
