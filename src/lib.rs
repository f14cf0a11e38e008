pub mod diff;
pub mod error;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod tool;

pub use diff::{
    diff_stats, diff_words, has_changes, reconstruct_after, reconstruct_before, render_inline,
};
pub use error::{PipelineError, StageError, TransformError, TransformErrorKind};
pub use io::{read_source_file, summary_line, HumanReport, PipelineReport};
pub use models::{
    DiffKind, DiffSpan, DiffStats, PipelineHistory, Stage, StageDiff, StageList, StageListError,
    StageResult,
};
pub use pipeline::{
    run_pipeline, ChannelProgress, LogProgress, NoProgress, PipelineConfig, PipelineRun,
    ProgressEvent, ProgressSink,
};
pub use tool::{with_temp_artifact, ProcessInvoker, ToolConfig, TransformInvoker};
