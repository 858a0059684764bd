//! Advisory project lock
//!
//! Install and prune treat the project root and its cache as single-writer
//! resources. The lock file makes that assumption enforced instead of
//! implicit: a second invocation fails fast rather than racing on the
//! declaration or cache.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::cache;

/// Errors that can occur while acquiring the project lock
#[derive(Debug, Error)]
pub enum LockError {
    /// Another process holds the lock
    #[error("Another operation is already running on this project (lock file: {})", .0.display())]
    AlreadyLocked(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Exclusive advisory lock on a project, released on drop
#[derive(Debug)]
pub struct ProjectLock {
    path: PathBuf,
}

impl ProjectLock {
    /// Acquire the lock for a project root
    pub fn acquire(root: &Path) -> Result<Self, LockError> {
        let state_dir = cache::state_dir(root);
        fs::create_dir_all(&state_dir)?;

        let path = state_dir.join(".lock");
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                // Record the owning pid for post-mortem inspection
                let _ = write!(file, "{}", std::process::id());
                Ok(Self { path })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(LockError::AlreadyLocked(path))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Path of the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ProjectLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("Failed to remove lock file {}: {}", self.path.display(), e);
        }
    }
}
