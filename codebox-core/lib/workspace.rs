//! Per-execution workspace directories.
//!
//! Every execution gets a directory named by a fresh v4 UUID under the configured root. The
//! directory holds the source file and whatever the build step produces, and is removed when
//! the execution ends. [`Workspace::release`] removes it asynchronously on the normal path; the
//! `Drop` implementation removes it synchronously if the owner never got that far (an early
//! return, a panic, or the surrounding future being dropped).

use std::{
    io,
    path::{Path, PathBuf},
};

use tokio::fs;
use uuid::Uuid;

use crate::{CodeboxError, CodeboxResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// An exclusively owned temporary directory for one execution.
#[derive(Debug)]
pub struct Workspace {
    id: Uuid,
    path: PathBuf,
    released: bool,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Workspace {
    /// Creates a new, empty workspace under `root`.
    ///
    /// The root is created if missing and a relative root is resolved against the current
    /// directory, so the workspace path stays valid for children that run inside it. The
    /// workspace directory itself is created with `create_dir`, so an existing directory of the
    /// same name is an error rather than shared.
    pub async fn create(root: &Path) -> CodeboxResult<Self> {
        let workspace_io = |source: io::Error| CodeboxError::WorkspaceIo {
            path: root.to_path_buf(),
            source,
        };

        let root = std::path::absolute(root).map_err(workspace_io)?;
        fs::create_dir_all(&root).await.map_err(workspace_io)?;

        let id = Uuid::new_v4();
        let path = root.join(id.to_string());

        fs::create_dir(&path)
            .await
            .map_err(|source| CodeboxError::WorkspaceIo {
                path: path.clone(),
                source,
            })?;

        tracing::debug!("created workspace {}", path.display());

        Ok(Self {
            id,
            path,
            released: false,
        })
    }

    /// The unique identifier of this workspace.
    pub fn id(&self) -> &Uuid {
        &self.id
    }

    /// The workspace directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `content` to `file_name` inside the workspace and returns the file's path.
    pub async fn write_source(&self, file_name: &str, content: &str) -> CodeboxResult<PathBuf> {
        let file = self.path.join(file_name);

        fs::write(&file, content)
            .await
            .map_err(|source| CodeboxError::WorkspaceIo {
                path: file.clone(),
                source,
            })?;

        Ok(file)
    }

    /// Removes the workspace and everything in it.
    ///
    /// Failure is logged and otherwise ignored.
    pub async fn release(mut self) {
        self.released = true;

        match fs::remove_dir_all(&self.path).await {
            Ok(()) => tracing::debug!("removed workspace {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                "failed to remove workspace {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => tracing::debug!("removed abandoned workspace {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                "failed to remove abandoned workspace {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
