//! Decoration mapping and the editor apply boundary.
//!
//! Exercises: map_decorations, marker thresholds, range clamping,
//! DecorationSync reveal/idempotence, reconcile handle reuse.

use pretty_assertions::assert_eq;
use sensei_core::annotations::{
    map_decorations, reconcile, Decoration, DecorationHandle, DecorationKind, DecorationSync,
    EditorSurface,
};
use sensei_core::types::{AnalysisEntry, AnalysisResult, BlockMeta, QualityReport};

fn meta(name: &str, start: usize, end: usize) -> BlockMeta {
    BlockMeta {
        function_name: name.to_owned(),
        start_line: start,
        end_line: end,
        code: format!("def {name}(): pass"),
    }
}

fn report(score: f64) -> QualityReport {
    QualityReport {
        quality_score: score,
        complexity_estimate: "O(n)".to_owned(),
        plain_english_explanation: "does a thing".to_owned(),
        issues: Vec::new(),
    }
}

fn result_with_scores(scores: &[f64]) -> AnalysisResult {
    AnalysisResult {
        results: scores
            .iter()
            .enumerate()
            .map(|(i, s)| AnalysisEntry {
                meta: meta(&format!("f{i}"), i * 10 + 1, i * 10 + 5),
                analysis: Some(report(*s)),
            })
            .collect(),
    }
}

/// Records every call the sync layer makes.
#[derive(Default)]
struct RecordingEditor {
    next: u64,
    set_calls: Vec<(Vec<DecorationHandle>, Vec<Decoration>)>,
    revealed: Vec<usize>,
}

impl EditorSurface for RecordingEditor {
    fn set_decorations(
        &mut self,
        previous: &[DecorationHandle],
        decorations: &[Decoration],
    ) -> Vec<DecorationHandle> {
        self.set_calls.push((previous.to_vec(), decorations.to_vec()));
        decorations
            .iter()
            .map(|_| {
                self.next += 1;
                DecorationHandle(self.next)
            })
            .collect()
    }

    fn reveal_line(&mut self, line: usize) {
        self.revealed.push(line);
    }

    fn current_text(&self) -> String {
        "x\n".repeat(100)
    }
}

#[test]
fn scores_map_to_critical_warning_and_nothing() {
    let result = result_with_scores(&[3.0, 6.0, 9.0]);
    let plan = map_decorations(Some(&result), None, 100);

    assert_eq!(plan.decorations.len(), 2);
    assert_eq!(plan.decorations[0].kind, DecorationKind::Critical);
    assert_eq!(plan.decorations[1].kind, DecorationKind::Warning);
    assert_eq!((plan.decorations[1].start_line, plan.decorations[1].end_line), (11, 15));
    assert_eq!(plan.reveal_line, None);
}

#[test]
fn thresholds_are_strict() {
    let result = result_with_scores(&[4.99, 5.0, 7.99, 8.0]);
    let kinds: Vec<_> = map_decorations(Some(&result), None, 100)
        .decorations
        .into_iter()
        .map(|d| d.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![DecorationKind::Critical, DecorationKind::Warning, DecorationKind::Warning]
    );
}

#[test]
fn missing_reports_and_empty_results_produce_nothing() {
    assert!(map_decorations(None, None, 10).decorations.is_empty());
    assert!(map_decorations(Some(&AnalysisResult::default()), None, 10).decorations.is_empty());

    let result = AnalysisResult {
        results: vec![AnalysisEntry { meta: meta("broken", 1, 3), analysis: None }],
    };
    assert!(map_decorations(Some(&result), None, 10).decorations.is_empty());
}

#[test]
fn selection_appends_highlight_and_reveal() {
    let result = result_with_scores(&[3.0, 6.0, 9.0]);
    let selected = result.results[2].meta.clone();
    let plan = map_decorations(Some(&result), Some(&selected), 100);

    assert_eq!(plan.decorations.len(), 3);
    assert_eq!(
        plan.decorations.last(),
        Some(&Decoration { start_line: 21, end_line: 25, kind: DecorationKind::ActiveHighlight })
    );
    assert_eq!(plan.reveal_line, Some(21));
    assert_eq!(plan.active, Some(selected.id()));
}

#[test]
fn out_of_range_blocks_are_clamped_or_dropped() {
    let result = AnalysisResult {
        results: vec![
            AnalysisEntry { meta: meta("tail", 8, 40), analysis: Some(report(2.0)) },
            AnalysisEntry { meta: meta("gone", 50, 60), analysis: Some(report(2.0)) },
            AnalysisEntry { meta: meta("zero", 0, 2), analysis: Some(report(6.0)) },
            AnalysisEntry { meta: meta("inverted", 5, 3), analysis: Some(report(6.0)) },
        ],
    };
    let plan = map_decorations(Some(&result), Some(&meta("gone", 50, 60)), 10);

    let ranges: Vec<_> = plan.decorations.iter().map(|d| (d.start_line, d.end_line)).collect();
    assert_eq!(ranges, vec![(8, 10), (1, 2), (5, 5)]);
    assert_eq!(plan.reveal_line, None);

    assert!(map_decorations(Some(&result), None, 0).decorations.is_empty());
}

#[test]
fn sync_reveals_once_per_selection_change() {
    let result = result_with_scores(&[3.0, 6.0, 9.0]);
    let b = result.results[1].meta.clone();
    let mut editor = RecordingEditor::default();
    let mut sync = DecorationSync::new();

    let baseline = map_decorations(Some(&result), None, 100);
    assert!(sync.apply(&mut editor, &baseline));
    assert_eq!(editor.revealed, Vec::<usize>::new());

    let selected = map_decorations(Some(&result), Some(&b), 100);
    sync.apply(&mut editor, &selected);
    assert_eq!(editor.revealed, vec![11]);
    assert_eq!(sync.applied().len(), 3);

    // Same selection again: identical list, no reveal, no editor call.
    let again = map_decorations(Some(&result), Some(&b), 100);
    assert_eq!(again, selected);
    assert!(!sync.apply(&mut editor, &again));
    assert_eq!(editor.revealed, vec![11]);
    assert_eq!(editor.set_calls.len(), 2);

    // Clearing restores the baseline and does not scroll.
    let cleared = map_decorations(Some(&result), None, 100);
    sync.apply(&mut editor, &cleared);
    assert_eq!(sync.applied(), baseline.decorations.as_slice());
    assert_eq!(editor.revealed, vec![11]);

    // Previous handles are always handed back to the editor.
    let (previous, _) = &editor.set_calls[2];
    assert_eq!(previous.len(), 3);
}

#[test]
fn reconcile_reuses_matching_handles() {
    let crit = Decoration { start_line: 1, end_line: 4, kind: DecorationKind::Critical };
    let warn = Decoration { start_line: 6, end_line: 9, kind: DecorationKind::Warning };
    let hl = Decoration { start_line: 6, end_line: 9, kind: DecorationKind::ActiveHighlight };

    let previous = vec![(DecorationHandle(1), crit), (DecorationHandle(2), hl)];
    let mut next = 10;
    let out = reconcile(&previous, &[crit, warn], || {
        next += 1;
        DecorationHandle(next)
    });

    assert_eq!(out.handles, vec![DecorationHandle(1), DecorationHandle(11)]);
    assert_eq!(out.added, vec![(DecorationHandle(11), warn)]);
    assert_eq!(out.removed, vec![DecorationHandle(2)]);
}
