use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

const ARTIFACT_PREFIX: &str = "passview-";
const ARTIFACT_SUFFIX: &str = ".stage";

/// Run `body` with the path of a scratch file holding `content`.
///
/// The file gets a unique random name inside `scratch_dir` and is written and
/// flushed before `body` runs. It is deleted before this function returns,
/// whether `body` succeeds or fails, and also if the returned future is
/// dropped mid-flight. A failed deletion is reported when `body` succeeded and
/// only logged when `body` already failed.
pub async fn with_temp_artifact<T, E, F, Fut>(
    scratch_dir: &Path,
    content: &str,
    body: F,
) -> Result<T, E>
where
    F: FnOnce(PathBuf) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: From<std::io::Error>,
{
    let mut file = tempfile::Builder::new()
        .prefix(ARTIFACT_PREFIX)
        .suffix(ARTIFACT_SUFFIX)
        .tempfile_in(scratch_dir)?;

    if let Err(err) = file
        .write_all(content.as_bytes())
        .and_then(|_| file.flush())
    {
        if let Err(cleanup) = file.close() {
            warn!("Failed to remove partial scratch artifact: {}", cleanup);
        }
        return Err(err.into());
    }

    let path = file.path().to_path_buf();
    debug!("Scratch artifact {:?} ({} bytes)", path, content.len());

    let outcome = body(path).await;

    match (outcome, file.close()) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(cleanup)) => Err(cleanup.into()),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(cleanup)) => {
            warn!("Failed to remove scratch artifact: {}", cleanup);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_artifact_holds_content_and_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let mut seen = None;

        let result: Result<String, std::io::Error> =
            with_temp_artifact(dir.path(), "module {}", |path| {
                seen = Some(path.clone());
                async move { std::fs::read_to_string(&path) }
            })
            .await;

        assert_eq!(result.unwrap(), "module {}");
        let path = seen.unwrap();
        assert!(path.starts_with(dir.path()));
        assert!(!path.exists());
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_artifact_removed_when_body_fails() {
        let dir = tempfile::tempdir().unwrap();

        let result: Result<(), std::io::Error> =
            with_temp_artifact(dir.path(), "text", |path| async move {
                assert!(path.exists());
                Err(std::io::Error::other("body failed"))
            })
            .await;

        assert_eq!(result.unwrap_err().to_string(), "body failed");
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_concurrent_artifacts_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        let outer: Result<(), std::io::Error> =
            with_temp_artifact(root, "outer", |outer_path| async move {
                let inner: Result<PathBuf, std::io::Error> =
                    with_temp_artifact(root, "inner", |p| async move { Ok(p) }).await;
                assert_ne!(inner?, outer_path);
                assert_eq!(std::fs::read_to_string(&outer_path)?, "outer");
                Ok(())
            })
            .await;

        outer.unwrap();
        assert_eq!(entries(root), 0);
    }

    #[tokio::test]
    async fn test_unwritable_scratch_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let result: Result<(), std::io::Error> =
            with_temp_artifact(&missing, "text", |_| async { Ok(()) }).await;

        assert!(result.is_err());
        assert!(!missing.exists());
    }
}
