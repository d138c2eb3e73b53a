//! Per-job scratch workspace.
//!
//! Every artifact a job writes lives in one directory keyed by the job id,
//! so concurrent jobs never collide on the shared work root. The workspace
//! is released exactly once when the job reaches a terminal state; a Drop
//! backstop sweeps the directory on panic paths where the explicit release
//! never ran.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use scast_models::JobId;

/// Tracked scratch space for one publish job.
#[derive(Debug)]
pub struct JobWorkspace {
    root: PathBuf,
    artifacts: Vec<PathBuf>,
    released: bool,
}

impl JobWorkspace {
    /// Create the workspace directory under `work_root`.
    pub async fn create(work_root: &Path, job_id: &JobId) -> std::io::Result<Self> {
        let root = work_root.join(job_id.as_str());
        tokio::fs::create_dir_all(&root).await?;
        debug!(path = ?root, "created job workspace");

        Ok(Self {
            root,
            artifacts: Vec::new(),
            released: false,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reserve a path for a named artifact and track it for release.
    pub fn stage(&mut self, file_name: &str) -> PathBuf {
        let path = self.root.join(file_name);
        self.artifacts.push(path.clone());
        path
    }

    /// Number of artifacts currently tracked.
    pub fn tracked(&self) -> usize {
        self.artifacts.len()
    }

    /// Delete every tracked artifact and the workspace directory.
    ///
    /// Individual deletion failures are logged and skipped so one missing
    /// file cannot block cleanup of the rest. A second call is a no-op.
    pub async fn release_all(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        for path in self.artifacts.drain(..) {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => debug!(path = ?path, "removed artifact"),
                // A stage that never ran leaves its reserved path unwritten.
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!(path = ?path, "failed to remove artifact: {}", e),
            }
        }

        // Sweep the directory itself, catching anything written outside the
        // tracked set (subprocess scratch, partial writes).
        if let Err(e) = tokio::fs::remove_dir_all(&self.root).await {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = ?self.root, "failed to remove workspace: {}", e);
            }
        }
    }
}

impl Drop for JobWorkspace {
    fn drop(&mut self) {
        if !self.released {
            // Emergency path, reached on panic or early drop. Cleanup must
            // be synchronous here.
            warn!(path = ?self.root, "workspace dropped without release, sweeping");
            let _ = std::fs::remove_dir_all(&self.root);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_release_removes_artifacts_and_directory() {
        let work_root = tempfile::tempdir().unwrap();
        let job_id = JobId::new();

        let mut workspace = JobWorkspace::create(work_root.path(), &job_id)
            .await
            .unwrap();
        let a = workspace.stage("source.mp4");
        let b = workspace.stage("final.mp4");
        tokio::fs::write(&a, b"video").await.unwrap();
        tokio::fs::write(&b, b"assembled").await.unwrap();
        assert_eq!(workspace.tracked(), 2);

        workspace.release_all().await;

        assert!(!a.exists());
        assert!(!b.exists());
        assert!(!work_root.path().join(job_id.as_str()).exists());
    }

    #[tokio::test]
    async fn test_missing_artifact_does_not_block_cleanup() {
        let work_root = tempfile::tempdir().unwrap();
        let job_id = JobId::new();

        let mut workspace = JobWorkspace::create(work_root.path(), &job_id)
            .await
            .unwrap();
        let never_written = workspace.stage("lead_in.mp4");
        let written = workspace.stage("final.mp4");
        tokio::fs::write(&written, b"assembled").await.unwrap();

        workspace.release_all().await;

        assert!(!never_written.exists());
        assert!(!written.exists());
        assert!(!workspace.root().exists());
    }

    #[tokio::test]
    async fn test_double_release_is_noop() {
        let work_root = tempfile::tempdir().unwrap();
        let mut workspace = JobWorkspace::create(work_root.path(), &JobId::new())
            .await
            .unwrap();
        workspace.release_all().await;
        workspace.release_all().await;
        assert!(!workspace.root().exists());
    }

    #[tokio::test]
    async fn test_untracked_files_are_swept_with_directory() {
        let work_root = tempfile::tempdir().unwrap();
        let mut workspace = JobWorkspace::create(work_root.path(), &JobId::new())
            .await
            .unwrap();

        let stray = workspace.root().join("concat.txt");
        tokio::fs::write(&stray, b"file 'x'\n").await.unwrap();

        workspace.release_all().await;
        assert!(!stray.exists());
        assert!(!workspace.root().exists());
    }

    #[tokio::test]
    async fn test_drop_sweeps_unreleased_workspace() {
        let work_root = tempfile::tempdir().unwrap();
        let root = {
            let mut workspace = JobWorkspace::create(work_root.path(), &JobId::new())
                .await
                .unwrap();
            let file = workspace.stage("source.mp4");
            tokio::fs::write(&file, b"bytes").await.unwrap();
            workspace.root().to_path_buf()
        };
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_concurrent_jobs_get_distinct_roots() {
        let work_root = tempfile::tempdir().unwrap();
        let mut first = JobWorkspace::create(work_root.path(), &JobId::new())
            .await
            .unwrap();
        let mut second = JobWorkspace::create(work_root.path(), &JobId::new())
            .await
            .unwrap();

        assert_ne!(first.root(), second.root());
        assert_ne!(first.stage("source.mp4"), second.stage("source.mp4"));

        first.release_all().await;
        assert!(second.root().exists());
        second.release_all().await;
    }
}
