use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, error};

use crate::error::Error;

/// Workspace directory under which all scratch files are created.
///
/// The root path is injected configuration; the directory itself is created
/// lazily on first use and survives across requests.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `code` verbatim to `<root>/<filename>`, overwriting if present,
    /// and return a guard that removes the file when dropped.
    ///
    /// `create_dir_all` is idempotent and safe under concurrent calls. Two
    /// concurrent requests using the same filename race on the same path;
    /// callers own filename uniqueness.
    pub async fn materialize(&self, filename: &str, code: &str) -> Result<ScratchFile, Error> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| Error::WriteFailure(e.to_string()))?;

        let path = self.root.join(filename);
        fs::write(&path, code)
            .await
            .map_err(|e| Error::WriteFailure(e.to_string()))?;

        debug!(path = %path.display(), "Code written to scratch file");
        Ok(ScratchFile { path })
    }
}

/// RAII guard over one scratch file.
///
/// The file's lifetime is bounded exactly to the request that created it:
/// dropping the guard removes the file on every exit path, including timeout
/// and fault. Removal failure is logged and never surfaced, so a housekeeping
/// error cannot mask the execution outcome.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Cleaned up scratch file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                error!(path = %self.path.display(), "Failed to remove scratch file: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn materialize_creates_root_and_writes_verbatim() {
        let dir = tempdir().unwrap();
        let workspace = Workspace::new(dir.path().join("nested").join("workspace"));

        let scratch = workspace.materialize("a.py", "print('x')").await.unwrap();
        let contents = tokio::fs::read_to_string(scratch.path()).await.unwrap();
        assert_eq!(contents, "print('x')");
    }

    #[tokio::test]
    async fn drop_removes_the_file() {
        let dir = tempdir().unwrap();
        let workspace = Workspace::new(dir.path());

        let scratch = workspace.materialize("gone.py", "pass").await.unwrap();
        let path = scratch.path().to_path_buf();
        assert!(path.exists());

        drop(scratch);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn drop_tolerates_already_removed_file() {
        let dir = tempdir().unwrap();
        let workspace = Workspace::new(dir.path());

        let scratch = workspace.materialize("early.py", "pass").await.unwrap();
        tokio::fs::remove_file(scratch.path()).await.unwrap();
        drop(scratch); // must not panic
    }

    #[tokio::test]
    async fn materialize_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let workspace = Workspace::new(dir.path());

        {
            let first = workspace.materialize("same.py", "old").await.unwrap();
            let contents = tokio::fs::read_to_string(first.path()).await.unwrap();
            assert_eq!(contents, "old");
        }
        let second = workspace.materialize("same.py", "new").await.unwrap();
        let contents = tokio::fs::read_to_string(second.path()).await.unwrap();
        assert_eq!(contents, "new");
    }

    #[tokio::test]
    async fn workspace_root_survives_scratch_cleanup() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("ws");
        let workspace = Workspace::new(&root);

        let scratch = workspace.materialize("f.py", "pass").await.unwrap();
        drop(scratch);
        assert!(root.exists());
    }

    #[tokio::test]
    async fn write_failure_is_reported() {
        let dir = tempdir().unwrap();
        // A file where the root directory should be makes create_dir_all fail.
        let blocker = dir.path().join("not-a-dir");
        tokio::fs::write(&blocker, "x").await.unwrap();

        let workspace = Workspace::new(&blocker);
        let err = workspace.materialize("f.py", "pass").await.unwrap_err();
        assert!(matches!(err, Error::WriteFailure(_)));
    }
}
