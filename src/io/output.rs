use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::diff::render_inline;
use crate::models::{PipelineHistory, StageDiff, StageResult};

/// Machine-readable record of a pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub tool: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_path: Option<PathBuf>,
    /// Original input followed by one result per stage
    pub results: Vec<StageResult>,
    /// One diff per stage, against that stage's input
    pub diffs: Vec<StageDiff>,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub total_stages: usize,
    /// Stages whose output differs from their input
    pub changed_stages: usize,
    pub words_added: usize,
    pub words_removed: usize,
}

impl PipelineReport {
    pub fn from_history(
        run_id: Uuid,
        tool: &Path,
        input_path: Option<&Path>,
        history: &PipelineHistory,
    ) -> Self {
        let diffs = history.diffs();
        let metadata = ReportMetadata {
            total_stages: diffs.len(),
            changed_stages: diffs.iter().filter(|d| d.changed).count(),
            words_added: diffs.iter().map(|d| d.stats.added).sum(),
            words_removed: diffs.iter().map(|d| d.stats.removed).sum(),
        };

        Self {
            run_id,
            generated_at: Utc::now(),
            tool: tool.to_path_buf(),
            input_path: input_path.map(Path::to_path_buf),
            results: history.results().to_vec(),
            diffs,
            metadata,
        }
    }

    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write JSON")?;
        Ok(())
    }
}

/// Human-readable view of every stage's diff
pub struct HumanReport<'a> {
    diffs: &'a [StageDiff],
}

impl<'a> HumanReport<'a> {
    pub fn new(diffs: &'a [StageDiff]) -> Self {
        Self { diffs }
    }

    /// Format every stage as a header line followed by its inline diff
    pub fn format(&self) -> String {
        let mut output = String::new();
        let total = self.diffs.len();

        for diff in self.diffs {
            output.push_str(&format!("== {}\n", summary_line(diff, total)));
            if diff.changed {
                output.push_str(&render_inline(&diff.spans));
                output.push_str("\n\n");
            }
        }

        output
    }

    /// Write to a text file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

/// One-line summary, e.g. `[2/3] cse: +3 -7 words`
pub fn summary_line(diff: &StageDiff, total: usize) -> String {
    let position = format!("[{}/{}] {}", diff.stage.order + 1, total, diff.stage.name);
    if !diff.changed {
        format!("{}: unchanged", position)
    } else if diff.stats.added == 0 && diff.stats.removed == 0 {
        format!("{}: whitespace only", position)
    } else {
        format!(
            "{}: +{} -{} words",
            position, diff.stats.added, diff.stats.removed
        )
    }
}
