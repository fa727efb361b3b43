//! Active-block tracking driven by hover and focus.

use crate::types::{BlockId, BlockMeta};

/// At most one active block. Pure hover semantics: enter sets, leave clears,
/// the last event wins.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BlockSelection {
    active: Option<BlockMeta>,
}

impl BlockSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or clears the active block. Returns `true` if it changed.
    pub fn set_active(&mut self, meta: Option<BlockMeta>) -> bool {
        if self.active == meta {
            return false;
        }
        self.active = meta;
        true
    }

    /// Hover or focus entered the card for `meta`.
    pub fn enter(&mut self, meta: &BlockMeta) -> bool {
        self.set_active(Some(meta.clone()))
    }

    /// Hover or focus left the card for `id`.
    ///
    /// A leave for a card that is no longer active is ignored, so a late
    /// leave from the previous card cannot blank the card entered after it.
    pub fn leave(&mut self, id: &BlockId) -> bool {
        match &self.active {
            Some(meta) if meta.id() == *id => self.set_active(None),
            _ => false,
        }
    }

    pub fn clear(&mut self) -> bool {
        self.set_active(None)
    }

    pub fn active(&self) -> Option<&BlockMeta> {
        self.active.as_ref()
    }

    pub fn is_active(&self, id: &BlockId) -> bool {
        self.active.as_ref().is_some_and(|m| m.id() == *id)
    }
}
