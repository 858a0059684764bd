//! Remove command
//!
//! Removes declared modules, optionally deleting private module
//! directories.

use std::path::Path;
use thiserror::Error;

use crate::confirm::Confirm;
use crate::declaration::{DeclarationError, ProjectDeclaration};
use crate::lock::{LockError, ProjectLock};
use crate::module::ModulePatterns;
use crate::prune::{ModulePruner, PruneError, PruneOutcome};

/// Errors that can occur when removing modules
#[derive(Debug, Error)]
pub enum RemoveError {
    /// No slicknode.yml found
    #[error("No slicknode.yml found. Run `slicknode-sync init` to create a project.")]
    NoDeclaration,

    /// Declaration error
    #[error("Declaration error: {0}")]
    Declaration(#[from] DeclarationError),

    /// Another operation holds the project lock
    #[error("{0}")]
    Lock(#[from] LockError),

    /// Prune error
    #[error("{0}")]
    Prune(#[from] PruneError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Remove the named modules from the project declaration
pub fn remove_modules(
    start_dir: Option<&Path>,
    names: &[String],
    patterns: &ModulePatterns,
    confirm: &dyn Confirm,
) -> Result<PruneOutcome, RemoveError> {
    let root = super::resolve_root(start_dir)?.ok_or(RemoveError::NoDeclaration)?;
    let declaration = ProjectDeclaration::load(&root, patterns)?;

    let _lock = ProjectLock::acquire(&root)?;

    let pruner = ModulePruner::new(patterns, confirm);
    let outcome = pruner.remove(&root, &declaration, names)?;

    for name in &outcome.removed {
        println!("  removed {}", name);
    }
    for dir in &outcome.deleted_dirs {
        println!("  deleted {}", dir.display());
    }

    Ok(outcome)
}
