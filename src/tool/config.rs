use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::pipeline::PipelineConfig;
use crate::tool::ProcessInvoker;

pub const TOOL_ENV: &str = "PASSVIEW_TOOL";
pub const TIMEOUT_ENV: &str = "PASSVIEW_TIMEOUT_SECS";
pub const SCRATCH_DIR_ENV: &str = "PASSVIEW_SCRATCH_DIR";

/// Where the transform tool lives and how to run it
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Path to an executable honoring `<tool> <input> --<transform>`
    pub tool_path: PathBuf,
    /// Per-invocation deadline
    pub timeout: Option<Duration>,
    /// Directory for scratch artifacts (OS temp dir when unset)
    pub scratch_dir: Option<PathBuf>,
}

impl ToolConfig {
    pub fn new(tool_path: impl Into<PathBuf>) -> Self {
        Self {
            tool_path: tool_path.into(),
            timeout: None,
            scratch_dir: None,
        }
    }

    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let tool_path = lookup(TOOL_ENV)
            .filter(|v| !v.trim().is_empty())
            .with_context(|| format!("{} environment variable not set", TOOL_ENV))?;

        let timeout = match lookup(TIMEOUT_ENV) {
            Some(raw) => Some(parse_timeout_secs(&raw)?),
            None => None,
        };

        let scratch_dir = lookup(SCRATCH_DIR_ENV)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            tool_path: PathBuf::from(tool_path),
            timeout,
            scratch_dir,
        })
    }

    pub fn invoker(&self) -> ProcessInvoker {
        ProcessInvoker {
            timeout: self.timeout,
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::new(self.tool_path.clone());
        if let Some(dir) = &self.scratch_dir {
            config.scratch_dir = dir.clone();
        }
        config
    }
}

/// Parse a positive number of seconds
pub fn parse_timeout_secs(raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("Invalid timeout '{}': expected whole seconds", raw))?;
    if secs == 0 {
        bail!("Timeout must be at least one second");
    }
    Ok(Duration::from_secs(secs))
}
