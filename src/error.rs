use std::time::Duration;

use thiserror::Error;

/// Why an external transform did not produce output
#[derive(Debug, Error)]
pub enum TransformErrorKind {
    /// The tool could not be started (missing binary, permissions, ...)
    #[error("failed to start tool: {0}")]
    Spawn(#[source] std::io::Error),
    /// The tool ran but reported failure; `None` when killed by a signal
    #[error("{}", describe_exit(.code))]
    Exit { code: Option<i32> },
    /// The tool's output could not be read
    #[error("failed to read tool output: {0}")]
    Output(#[source] std::io::Error),
    /// The tool did not finish within the configured deadline
    #[error("timed out after {after:?}")]
    TimedOut { after: Duration },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// A single transform invocation failed
#[derive(Debug, Error)]
#[error("transform '{transform}' failed: {kind}")]
pub struct TransformError {
    pub transform: String,
    #[source]
    pub kind: TransformErrorKind,
    /// Diagnostic output captured from the tool, if any
    pub stderr: Option<String>,
}

impl TransformError {
    pub fn new(transform: impl Into<String>, kind: TransformErrorKind) -> Self {
        Self {
            transform: transform.into(),
            kind,
            stderr: None,
        }
    }

    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        let stderr = stderr.into();
        let trimmed = stderr.trim();
        self.stderr = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }
}

/// Failure of one stage: either its scratch artifact or its transform
#[derive(Debug, Error)]
pub enum StageError {
    #[error("scratch artifact I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// The only error a pipeline run surfaces: which stage failed, and why
#[derive(Debug, Error)]
#[error("stage {} ('{failed_stage}') failed: {cause}", .stage_index + 1)]
pub struct PipelineError {
    pub failed_stage: String,
    /// Order of the failed stage (0-based)
    pub stage_index: usize,
    #[source]
    pub cause: StageError,
}

impl PipelineError {
    /// Tool diagnostics, when the failure came from the transform itself
    pub fn stderr(&self) -> Option<&str> {
        match &self.cause {
            StageError::Transform(err) => err.stderr.as_deref(),
            StageError::Io(_) => None,
        }
    }

    pub fn is_transform_failure(&self) -> bool {
        matches!(self.cause, StageError::Transform(_))
    }
}
