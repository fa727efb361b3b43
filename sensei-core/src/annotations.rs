//! Decorations as a function of state.
//!
//! [`map_decorations`] turns the displayed result set plus the active block into
//! a fresh decoration list every time either changes. It keeps no memory of
//! what it produced before. Diffing against the previous list happens at the
//! editor boundary: [`DecorationSync`] hands the old handles to the
//! [`EditorSurface`], and [`reconcile`] lets a surface reuse unchanged
//! decorations instead of repainting them.

use crate::types::{AnalysisResult, BlockId, BlockMeta, ScoreBand};

/// What a decoration paints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecorationKind {
    /// Gutter mark for a block scoring below 5.
    Critical,
    /// Gutter mark for a block scoring below 8.
    Warning,
    /// Background highlight over the active block.
    ActiveHighlight,
}

/// A whole-line decoration over `start_line..=end_line` (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decoration {
    pub start_line: usize,
    pub end_line: usize,
    pub kind: DecorationKind,
}

impl Decoration {
    pub fn covers(&self, line: usize) -> bool {
        self.start_line <= line && line <= self.end_line
    }
}

/// Output of one mapping pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecorationPlan {
    pub decorations: Vec<Decoration>,
    /// Block the highlight belongs to, if any.
    pub active: Option<BlockId>,
    /// Line the editor should centre when the active block changes.
    pub reveal_line: Option<usize>,
}

/// Gutter marker for a score, or `None` for a clean block.
pub fn marker_for_score(score: f64) -> Option<DecorationKind> {
    match ScoreBand::of(score) {
        ScoreBand::Poor => Some(DecorationKind::Critical),
        ScoreBand::Fair => Some(DecorationKind::Warning),
        ScoreBand::Good => None,
    }
}

/// Clamps a service-provided range onto a document of `line_count` lines.
///
/// Ranges that start past the end are dropped; inverted ranges collapse to
/// their start line.
fn clamp_range(start: usize, end: usize, line_count: usize) -> Option<(usize, usize)> {
    if line_count == 0 {
        return None;
    }
    let start = start.max(1);
    if start > line_count {
        return None;
    }
    let end = end.max(start).min(line_count);
    Some((start, end))
}

/// Builds the decoration list for the current result set and selection.
///
/// `line_count` is the editor's current line count; ranges are clamped to it
/// because the text may have been edited since the analysed snapshot.
pub fn map_decorations(
    result: Option<&AnalysisResult>,
    selection: Option<&BlockMeta>,
    line_count: usize,
) -> DecorationPlan {
    let mut decorations = Vec::new();

    if let Some(result) = result {
        for (meta, report) in result.reports() {
            let Some(kind) = marker_for_score(report.quality_score) else {
                continue;
            };
            if let Some((start_line, end_line)) =
                clamp_range(meta.start_line, meta.end_line, line_count)
            {
                decorations.push(Decoration { start_line, end_line, kind });
            }
        }
    }

    let mut reveal_line = None;
    if let Some(meta) = selection {
        if let Some((start_line, end_line)) =
            clamp_range(meta.start_line, meta.end_line, line_count)
        {
            decorations.push(Decoration {
                start_line,
                end_line,
                kind: DecorationKind::ActiveHighlight,
            });
            reveal_line = Some(start_line);
        }
    }

    DecorationPlan { decorations, active: selection.map(BlockMeta::id), reveal_line }
}

/// Opaque handle an editor returns for an applied decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecorationHandle(pub u64);

/// The slice of an editing surface this crate drives.
pub trait EditorSurface {
    /// Replaces the decorations identified by `previous` with `decorations`
    /// and returns handles for the new set, in the same order.
    fn set_decorations(
        &mut self,
        previous: &[DecorationHandle],
        decorations: &[Decoration],
    ) -> Vec<DecorationHandle>;

    /// Scrolls so `line` (1-based) sits in the middle of the viewport.
    fn reveal_line(&mut self, line: usize);

    fn current_text(&self) -> String;

    fn line_count(&self) -> usize {
        self.current_text().split('\n').count()
    }
}

/// Result of [`reconcile`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reconciled {
    /// Handles for the new list, in order.
    pub handles: Vec<DecorationHandle>,
    /// Previous handles no longer needed.
    pub removed: Vec<DecorationHandle>,
    /// Freshly allocated handles and what they paint.
    pub added: Vec<(DecorationHandle, Decoration)>,
}

/// Matches a new decoration list against what is already applied.
///
/// Each new decoration equal to a still-unclaimed previous one keeps that
/// handle; the rest get a handle from `alloc`. Unclaimed previous handles are
/// reported as removed. Only `removed` and `added` need repainting.
pub fn reconcile(
    previous: &[(DecorationHandle, Decoration)],
    decorations: &[Decoration],
    mut alloc: impl FnMut() -> DecorationHandle,
) -> Reconciled {
    let mut claimed = vec![false; previous.len()];
    let mut out = Reconciled::default();

    for deco in decorations {
        let reuse = previous
            .iter()
            .enumerate()
            .find(|(i, (_, old))| !claimed[*i] && old == deco)
            .map(|(i, (handle, _))| (i, *handle));
        match reuse {
            Some((i, handle)) => {
                claimed[i] = true;
                out.handles.push(handle);
            }
            None => {
                let handle = alloc();
                out.handles.push(handle);
                out.added.push((handle, *deco));
            }
        }
    }

    out.removed = previous
        .iter()
        .zip(claimed)
        .filter(|(_, used)| !used)
        .map(|((handle, _), _)| *handle)
        .collect();
    out
}

/// Editor-side bookkeeping: the handles currently applied and which block was
/// last revealed.
#[derive(Debug, Default)]
pub struct DecorationSync {
    handles: Vec<DecorationHandle>,
    applied: Vec<Decoration>,
    active: Option<BlockId>,
}

impl DecorationSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `plan` to `editor`.
    ///
    /// The editor receives the previous handles so it can compute a minimal
    /// update. A reveal is requested only when the active block changes to a
    /// different non-empty value; clearing the selection never scrolls.
    /// Returns `true` if the editor was touched.
    pub fn apply<E: EditorSurface + ?Sized>(&mut self, editor: &mut E, plan: &DecorationPlan) -> bool {
        let mut touched = false;

        if plan.decorations != self.applied {
            self.handles = editor.set_decorations(&self.handles, &plan.decorations);
            self.applied = plan.decorations.clone();
            touched = true;
        }

        if plan.active != self.active {
            if let (Some(_), Some(line)) = (&plan.active, plan.reveal_line) {
                tracing::debug!(line, "revealing active block");
                editor.reveal_line(line);
                touched = true;
            }
            self.active = plan.active.clone();
        }

        touched
    }

    pub fn applied(&self) -> &[Decoration] {
        &self.applied
    }
}
