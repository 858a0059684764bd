//! Sync command
//!
//! Checks cache consistency and installs a bundle when needed.

use std::path::Path;
use thiserror::Error;

use crate::bundle::{BundleInstaller, InstallError, InstallReport};
use crate::cache;
use crate::declaration::{DeclarationError, ProjectDeclaration};
use crate::lock::{LockError, ProjectLock};
use crate::module::ModulePatterns;
use crate::transport::Transport;

/// Errors that can occur during synchronization
#[derive(Debug, Error)]
pub enum SyncError {
    /// No slicknode.yml found
    #[error("No slicknode.yml found. Run `slicknode-sync init` to create a project.")]
    NoDeclaration,

    /// Declaration error
    #[error("Declaration error: {0}")]
    Declaration(#[from] DeclarationError),

    /// Another operation holds the project lock
    #[error("{0}")]
    Lock(#[from] LockError),

    /// Install error
    #[error("Install error: {0}")]
    Install(#[from] InstallError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Sync options
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Install even if the cache already satisfies the declaration
    pub force: bool,
}

/// Synchronize the project's module tree with a bundle
///
/// Returns `None` when the cache already satisfies the declaration and no
/// work was done.
pub fn sync_project(
    start_dir: Option<&Path>,
    bundle_url: &str,
    transport: &dyn Transport,
    patterns: &ModulePatterns,
    options: SyncOptions,
) -> Result<Option<InstallReport>, SyncError> {
    let root = super::resolve_root(start_dir)?.ok_or(SyncError::NoDeclaration)?;
    let declaration = ProjectDeclaration::load(&root, patterns)?;

    if !options.force && cache::is_loaded(&root, &declaration, patterns) {
        println!("Modules are up to date.");
        return Ok(None);
    }

    let _lock = ProjectLock::acquire(&root)?;

    let installer = BundleInstaller::new(transport);
    let report = installer.install(&root, bundle_url)?;

    for (module, dest) in &report.installed {
        println!("  {} -> {}", module, dest.display());
    }
    println!("Installed {} modules.", report.installed.len());

    Ok(Some(report))
}
