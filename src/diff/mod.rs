pub mod render;
pub mod tokenize;

pub use render::*;
pub use tokenize::*;

use similar::{Algorithm, ChangeTag, TextDiff};

use crate::models::{DiffKind, DiffSpan, DiffStats};

/// Compute a word-level diff between two snapshots.
///
/// The comparison unit is a maximal run of non-whitespace or of whitespace
/// characters, aligned with Myers' algorithm. Inside each gap between
/// unchanged runs, removals are reported before insertions. Adjacent spans of
/// the same kind are merged, so the result never has two consecutive spans
/// with the same kind.
pub fn diff_words(before: &str, after: &str) -> Vec<DiffSpan> {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_words(before, after);

    let mut spans = SpanBuilder::default();
    for change in diff.iter_all_changes() {
        spans.push(change.tag(), change.value());
    }

    spans.finish()
}

/// True when the spans contain any insertion or removal, whitespace included
pub fn has_changes(spans: &[DiffSpan]) -> bool {
    spans.iter().any(|s| s.kind != DiffKind::Unchanged)
}

/// Count non-whitespace tokens per span kind
pub fn diff_stats(spans: &[DiffSpan]) -> DiffStats {
    let mut stats = DiffStats::default();
    for span in spans {
        let words = tokenize(&span.value)
            .into_iter()
            .filter(|t| !is_whitespace_token(t))
            .count();
        match span.kind {
            DiffKind::Added => stats.added += words,
            DiffKind::Removed => stats.removed += words,
            DiffKind::Unchanged => stats.unchanged += words,
        }
    }
    stats
}

/// Rebuild the "before" side of a diff
pub fn reconstruct_before(spans: &[DiffSpan]) -> String {
    spans
        .iter()
        .filter(|s| s.in_before())
        .map(|s| s.value.as_str())
        .collect()
}

/// Rebuild the "after" side of a diff
pub fn reconstruct_after(spans: &[DiffSpan]) -> String {
    spans
        .iter()
        .filter(|s| s.in_after())
        .map(|s| s.value.as_str())
        .collect()
}

/// Collects changes into coalesced spans, ordering each gap as removals
/// followed by insertions
#[derive(Default)]
struct SpanBuilder {
    spans: Vec<DiffSpan>,
    removed: String,
    added: String,
}

impl SpanBuilder {
    fn push(&mut self, tag: ChangeTag, value: &str) {
        match tag {
            ChangeTag::Delete => self.removed.push_str(value),
            ChangeTag::Insert => self.added.push_str(value),
            ChangeTag::Equal => {
                self.flush_gap();
                self.append(DiffKind::Unchanged, value);
            }
        }
    }

    fn flush_gap(&mut self) {
        let removed = std::mem::take(&mut self.removed);
        let added = std::mem::take(&mut self.added);
        self.append(DiffKind::Removed, &removed);
        self.append(DiffKind::Added, &added);
    }

    fn append(&mut self, kind: DiffKind, value: &str) {
        if value.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(last) if last.kind == kind => last.value.push_str(value),
            _ => self.spans.push(DiffSpan {
                kind,
                value: value.to_string(),
            }),
        }
    }

    fn finish(mut self) -> Vec<DiffSpan> {
        self.flush_gap();
        self.spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_reconstructs(before: &str, after: &str) -> Vec<DiffSpan> {
        let spans = diff_words(before, after);
        assert_eq!(reconstruct_before(&spans), before);
        assert_eq!(reconstruct_after(&spans), after);
        for pair in spans.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind, "spans not coalesced: {:?}", spans);
            assert!(
                !(pair[0].kind == DiffKind::Added && pair[1].kind == DiffKind::Removed),
                "insertion reported before removal: {:?}",
                spans
            );
        }
        spans
    }

    #[test]
    fn test_single_word_change() {
        let spans = assert_reconstructs("func f() { return 1 }", "func f() { return 2 }");

        assert_eq!(
            spans,
            vec![
                DiffSpan::unchanged("func f() { return "),
                DiffSpan::removed("1"),
                DiffSpan::added("2"),
                DiffSpan::unchanged(" }"),
            ]
        );
    }

    #[test]
    fn test_identical_text_is_one_unchanged_span() {
        let text = "%0 = arith.constant 1 : i32\nreturn %0";
        let spans = assert_reconstructs(text, text);

        assert_eq!(spans, vec![DiffSpan::unchanged(text)]);
    }

    #[test]
    fn test_both_empty() {
        assert!(assert_reconstructs("", "").is_empty());
    }

    #[test]
    fn test_one_side_empty() {
        assert_eq!(
            assert_reconstructs("", "new text"),
            vec![DiffSpan::added("new text")]
        );
        assert_eq!(
            assert_reconstructs("old text", ""),
            vec![DiffSpan::removed("old text")]
        );
    }

    #[test]
    fn test_disjoint_text_removes_before_adding() {
        let spans = assert_reconstructs("alpha", "beta");

        assert_eq!(
            spans,
            vec![DiffSpan::removed("alpha"), DiffSpan::added("beta")]
        );
    }

    #[test]
    fn test_whitespace_only_difference() {
        let spans = assert_reconstructs("a b\nc", "a  b c");

        assert_eq!(
            spans,
            vec![
                DiffSpan::unchanged("a"),
                DiffSpan::removed(" "),
                DiffSpan::added("  "),
                DiffSpan::unchanged("b"),
                DiffSpan::removed("\n"),
                DiffSpan::added(" "),
                DiffSpan::unchanged("c"),
            ]
        );
    }

    #[test]
    fn test_insertion_in_middle() {
        let spans = assert_reconstructs("a c", "a b c");

        assert_eq!(
            spans,
            vec![
                DiffSpan::unchanged("a "),
                DiffSpan::added("b "),
                DiffSpan::unchanged("c"),
            ]
        );
    }

    #[test]
    fn test_multiline_pass_output() {
        let before = "%0 = arith.constant 1 : i32\n%1 = arith.addi %0, %0 : i32\nreturn %1";
        let after = "%0 = arith.constant 2 : i32\nreturn %0";
        let spans = assert_reconstructs(before, after);

        let stats = diff_stats(&spans);
        assert!(stats.removed > 0);
        assert!(stats.added > 0);
        assert!(stats.unchanged > 0);
    }

    #[test]
    fn test_diff_stats_ignores_whitespace() {
        let spans = vec![
            DiffSpan::unchanged("a "),
            DiffSpan::removed("b c"),
            DiffSpan::added("  "),
        ];

        assert_eq!(
            diff_stats(&spans),
            DiffStats {
                added: 0,
                removed: 2,
                unchanged: 1,
            }
        );
    }

    #[test]
    fn test_alternating_edits_keep_removals_first() {
        let spans = assert_reconstructs("one two three", "uno two tres");

        assert_eq!(
            spans,
            vec![
                DiffSpan::removed("one"),
                DiffSpan::added("uno"),
                DiffSpan::unchanged(" two "),
                DiffSpan::removed("three"),
                DiffSpan::added("tres"),
            ]
        );
    }

    #[test]
    fn test_has_changes_counts_whitespace() {
        assert!(has_changes(&diff_words("a b c", "a  b\nc")));
        assert!(!has_changes(&diff_words("a b c", "a b c")));
        assert!(!has_changes(&diff_words("", "")));
    }

    #[test]
    fn test_large_dump_with_few_edits() {
        let before: String = (0..50_000).map(|i| format!("%{} = op{}\n", i, i)).collect();
        let after = before
            .replace("%100 = op100\n", "%100 = folded\n")
            .replace("%40000 = op40000\n", "");

        let spans = assert_reconstructs(&before, &after);
        let stats = diff_stats(&spans);

        assert_eq!(stats.added, 1);
        assert_eq!(stats.removed, 4);
    }
}
