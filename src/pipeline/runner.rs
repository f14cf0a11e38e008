use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{PipelineError, StageError};
use crate::models::{PipelineHistory, Stage, StageList, StageResult};
use crate::pipeline::{ProgressEvent, ProgressSink};
use crate::tool::{with_temp_artifact, TransformInvoker};

/// Where the tool lives and where scratch artifacts go
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub tool_path: PathBuf,
    pub scratch_dir: PathBuf,
}

impl PipelineConfig {
    pub fn new(tool_path: impl Into<PathBuf>) -> Self {
        Self {
            tool_path: tool_path.into(),
            scratch_dir: std::env::temp_dir(),
        }
    }

    pub fn with_scratch_dir(mut self, scratch_dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = scratch_dir.into();
        self
    }
}

/// One pipeline invocation: the input text and the stages to apply
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub input: String,
    pub stages: StageList,
}

impl PipelineRun {
    pub fn new(input: impl Into<String>, stages: StageList) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            input: input.into(),
            stages,
        }
    }
}

/// Apply every stage in order, feeding each output into the next stage.
///
/// Returns the full history (original input first, then one result per
/// stage). The first failing stage aborts the run; later stages are not
/// invoked and the partial history is dropped.
pub async fn run_pipeline<I, P>(
    run: &PipelineRun,
    config: &PipelineConfig,
    invoker: &I,
    progress: &P,
) -> Result<PipelineHistory, PipelineError>
where
    I: TransformInvoker + ?Sized,
    P: ProgressSink + ?Sized,
{
    let total = run.stages.len();
    info!(
        "Pipeline {}: {} stages over {} bytes of input",
        run.run_id,
        total,
        run.input.len()
    );

    let mut results = Vec::with_capacity(total + 1);
    results.push(StageResult::original(run.input.clone()));

    for stage in &run.stages {
        notify(
            progress,
            &ProgressEvent {
                stage_name: stage.name.clone(),
                index: stage.order,
                total,
            },
        );

        let current = &results[results.len() - 1].text;
        let started = Instant::now();

        match run_stage(stage, current, config, invoker).await {
            Ok(output) => {
                debug!(
                    "Pipeline {}: stage {} produced {} bytes in {:?}",
                    run.run_id,
                    stage.name,
                    output.len(),
                    started.elapsed()
                );
                results.push(StageResult::from_stage(stage, output));
            }
            Err(cause) => {
                warn!(
                    "Pipeline {}: stage {} ({}/{}) failed: {}",
                    run.run_id,
                    stage.name,
                    stage.order + 1,
                    total,
                    cause
                );
                return Err(PipelineError {
                    failed_stage: stage.name.clone(),
                    stage_index: stage.order,
                    cause,
                });
            }
        }
    }

    info!("Pipeline {}: all {} stages complete", run.run_id, total);

    Ok(PipelineHistory::new(run.stages.clone(), results))
}

/// Deliver a progress event; a panicking sink is logged and otherwise ignored
fn notify<P>(progress: &P, event: &ProgressEvent)
where
    P: ProgressSink + ?Sized,
{
    let delivered = panic::catch_unwind(AssertUnwindSafe(|| progress.stage_started(event)));
    if delivered.is_err() {
        warn!(
            "Progress sink panicked on stage {} ({}/{})",
            event.stage_name,
            event.index + 1,
            event.total
        );
    }
}

/// Run one stage against a scratch copy of its input
async fn run_stage<I>(
    stage: &Stage,
    input: &str,
    config: &PipelineConfig,
    invoker: &I,
) -> Result<String, StageError>
where
    I: TransformInvoker + ?Sized,
{
    with_temp_artifact(&config.scratch_dir, input, |path| async move {
        invoker
            .invoke(&config.tool_path, &path, &stage.name)
            .await
            .map_err(StageError::from)
    })
    .await
}
