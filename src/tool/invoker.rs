use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{TransformError, TransformErrorKind};

/// Upper bound on captured stderr; stdout is the stage output and is never cut
const STDERR_CAPTURE_LIMIT_BYTES: u64 = 1_048_576;

/// Applies one named transform to one input file
#[async_trait]
pub trait TransformInvoker: Send + Sync {
    /// Run `transform` over the file at `input_path` using the tool at `tool`
    /// and return its output text.
    async fn invoke(
        &self,
        tool: &Path,
        input_path: &Path,
        transform: &str,
    ) -> Result<String, TransformError>;
}

/// Build the tool argument list: `<input> --<transform>`
pub fn transform_args(input_path: &Path, transform: &str) -> [std::ffi::OsString; 2] {
    [
        input_path.as_os_str().to_owned(),
        format!("--{}", transform).into(),
    ]
}

/// Runs the transform tool as a child process
#[derive(Debug, Clone, Default)]
pub struct ProcessInvoker {
    /// Kill the tool and fail the stage if it runs longer than this
    pub timeout: Option<Duration>,
}

impl ProcessInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

#[async_trait]
impl TransformInvoker for ProcessInvoker {
    async fn invoke(
        &self,
        tool: &Path,
        input_path: &Path,
        transform: &str,
    ) -> Result<String, TransformError> {
        debug!("Running {:?} {:?} --{}", tool, input_path, transform);

        let mut child = Command::new(tool)
            .args(transform_args(input_path, transform))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TransformError::new(transform, TransformErrorKind::Spawn(e)))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let run = async {
            let (status, stdout, stderr) =
                tokio::join!(child.wait(), read_all(stdout), read_capped(stderr));
            (status, stdout, stderr)
        };

        let (status, stdout, stderr) = match self.timeout {
            Some(after) => match tokio::time::timeout(after, run).await {
                Ok(finished) => finished,
                Err(_) => {
                    return Err(TransformError::new(
                        transform,
                        TransformErrorKind::TimedOut { after },
                    ));
                }
            },
            None => run.await,
        };

        let status =
            status.map_err(|e| TransformError::new(transform, TransformErrorKind::Spawn(e)))?;

        if !status.success() {
            return Err(TransformError::new(
                transform,
                TransformErrorKind::Exit {
                    code: status.code(),
                },
            )
            .with_stderr(stderr));
        }

        let stdout =
            stdout.map_err(|e| TransformError::new(transform, TransformErrorKind::Output(e)))?;

        Ok(decode_output(transform, stdout).trim().to_string())
    }
}

/// Decode tool output, warning when invalid UTF-8 had to be replaced
fn decode_output(transform: &str, bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            warn!(
                "Transform {} produced invalid UTF-8 at byte {}; replacing invalid sequences",
                transform,
                err.utf8_error().valid_up_to()
            );
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    }
}

/// Read a child stream to the end
async fn read_all<R>(stream: Option<R>) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        stream.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Read a diagnostic stream to the end, keeping at most the capture limit
async fn read_capped<R>(stream: Option<R>) -> String
where
    R: AsyncRead + Unpin,
{
    let Some(stream) = stream else {
        return String::new();
    };

    let mut buf = Vec::new();
    let mut limited = stream.take(STDERR_CAPTURE_LIMIT_BYTES);
    if let Err(e) = limited.read_to_end(&mut buf).await {
        warn!("Failed to read tool diagnostics: {}", e);
    }
    // Drain the rest so the child never blocks on a full pipe
    let mut rest = limited.into_inner();
    let _ = tokio::io::copy(&mut rest, &mut tokio::io::sink()).await;

    String::from_utf8_lossy(&buf).into_owned()
}
