//! Synchronization commands
//!
//! Implements the user-facing commands: init, status, sync, remove.

pub mod init;
pub mod remove;
pub mod status;
pub mod sync;

pub use init::init_project;
pub use remove::remove_modules;
pub use status::project_status;
pub use sync::{sync_project, SyncOptions};

use std::path::{Path, PathBuf};

use crate::project::find_project_root;

/// Locate the project root from an explicit start directory or the cwd
pub(crate) fn resolve_root(start_dir: Option<&Path>) -> std::io::Result<Option<PathBuf>> {
    let start = match start_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    Ok(find_project_root(&start))
}
