use serde::{Deserialize, Serialize};

use crate::diff::{diff_stats, diff_words, has_changes};
use crate::models::{DiffSpan, DiffStats, Stage, StageList};

/// Index used for the untouched input in a pipeline history
pub const ORIGINAL_STAGE_INDEX: i64 = -1;

/// Text produced after a given stage (or the original input)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    /// -1 for the original input, otherwise the order of the stage that produced `text`
    pub stage_index: i64,
    pub text: String,
}

impl StageResult {
    pub fn original(text: impl Into<String>) -> Self {
        Self {
            stage_index: ORIGINAL_STAGE_INDEX,
            text: text.into(),
        }
    }

    pub fn from_stage(stage: &Stage, text: impl Into<String>) -> Self {
        Self {
            stage_index: stage.order as i64,
            text: text.into(),
        }
    }

    pub fn is_original(&self) -> bool {
        self.stage_index == ORIGINAL_STAGE_INDEX
    }
}

/// Diff between the input and output of one stage
#[derive(Debug, Clone, Serialize)]
pub struct StageDiff {
    pub stage: Stage,
    /// Whether the stage changed anything, whitespace included
    pub changed: bool,
    pub stats: DiffStats,
    pub spans: Vec<DiffSpan>,
}

/// One step of a completed pipeline: the stage and the text on either side of it
#[derive(Debug, Clone, Copy)]
pub struct Transition<'a> {
    pub stage: &'a Stage,
    pub before: &'a str,
    pub after: &'a str,
}

/// Full output history of a successful pipeline run
///
/// `results[0]` is the original input and `results[i + 1]` is the output of
/// `stages[i]`, so there is always exactly one more result than stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineHistory {
    stages: StageList,
    results: Vec<StageResult>,
}

impl PipelineHistory {
    pub(crate) fn new(stages: StageList, results: Vec<StageResult>) -> Self {
        debug_assert_eq!(results.len(), stages.len() + 1);
        Self { stages, results }
    }

    pub fn stages(&self) -> &StageList {
        &self.stages
    }

    pub fn results(&self) -> &[StageResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Always false: a history contains at least the original input
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn original(&self) -> &str {
        &self.results[0].text
    }

    pub fn final_text(&self) -> &str {
        self.results
            .last()
            .map(|r| r.text.as_str())
            .unwrap_or_default()
    }

    /// Consecutive (before, after) pairs, one per stage
    pub fn transitions(&self) -> impl Iterator<Item = Transition<'_>> {
        self.stages
            .iter()
            .zip(self.results.windows(2))
            .map(|(stage, pair)| Transition {
                stage,
                before: &pair[0].text,
                after: &pair[1].text,
            })
    }

    /// Word diff of every stage against its input
    pub fn diffs(&self) -> Vec<StageDiff> {
        self.transitions()
            .map(|t| {
                let spans = diff_words(t.before, t.after);
                StageDiff {
                    stage: t.stage.clone(),
                    changed: has_changes(&spans),
                    stats: diff_stats(&spans),
                    spans,
                }
            })
            .collect()
    }

    pub fn into_results(self) -> Vec<StageResult> {
        self.results
    }
}
