//! Module removal
//!
//! Removes declared modules from the project. Private modules own a
//! directory inside the project tree; deleting it is destructive and only
//! happens after explicit confirmation. Public cache entries are never
//! deleted here, only their declaration entries.

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::confirm::Confirm;
use crate::declaration::{DeclarationError, DependencySpec, ProjectDeclaration};
use crate::module::{ModuleKind, ModulePatterns};
use crate::project;

/// Errors that can occur during module removal
#[derive(Debug, Error)]
pub enum PruneError {
    /// One or more requested modules are not declared
    #[error("Module not found in declaration: {}", .0.join(", "))]
    ModuleNotFound(Vec<String>),

    /// One or more private directories could not be deleted
    #[error("Failed to delete module directories:\n  {}", .0.join("\n  "))]
    FileSystem(Vec<String>),

    /// Persisting the pruned declaration failed
    #[error("Failed to persist declaration: {0}")]
    Declaration(#[from] DeclarationError),
}

/// Result of a successful removal
#[derive(Debug, Default)]
pub struct PruneOutcome {
    /// Module ids removed from the declaration
    pub removed: Vec<String>,

    /// Private module directories deleted from disk
    pub deleted_dirs: Vec<PathBuf>,
}

/// Removes declared modules from a project
pub struct ModulePruner<'a> {
    patterns: &'a ModulePatterns,
    confirm: &'a dyn Confirm,
}

impl<'a> ModulePruner<'a> {
    pub fn new(patterns: &'a ModulePatterns, confirm: &'a dyn Confirm) -> Self {
        Self { patterns, confirm }
    }

    /// Remove the named modules from the declaration, deleting private
    /// module directories on confirmation
    ///
    /// All names are validated before anything is mutated. The pruned
    /// declaration is persisted even when a directory deletion fails; the
    /// failure is still reported.
    pub fn remove(
        &self,
        root: &Path,
        declaration: &ProjectDeclaration,
        names: &[String],
    ) -> Result<PruneOutcome, PruneError> {
        let missing: Vec<String> = names
            .iter()
            .filter(|name| !declaration.dependencies.contains_key(*name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(PruneError::ModuleNotFound(missing));
        }

        // Resolve private directories before any mutation. A private module
        // declared with a version constraint owns no project directory.
        let mut private_dirs: Vec<(String, PathBuf)> = Vec::new();
        for name in names {
            if self.patterns.classify(name) != Some(ModuleKind::Private) {
                continue;
            }
            if private_dirs.iter().any(|(n, _)| n == name) {
                continue;
            }
            if let Some(DependencySpec::Path(spec)) = declaration.dependencies.get(name) {
                if let Some(dir) = project::resolve_in_root(root, spec) {
                    if dir.exists() {
                        private_dirs.push((name.clone(), dir));
                    }
                }
            }
        }

        let mut deleted = Vec::new();
        let mut failures: Vec<String> = Vec::new();
        if !private_dirs.is_empty() {
            let listing: Vec<String> = private_dirs
                .iter()
                .map(|(name, dir)| format!("{} ({})", name, dir.display()))
                .collect();
            let message = format!(
                "Delete the following private module directories?\n  {}",
                listing.join("\n  ")
            );

            if self.confirm.confirm(&message) {
                // Settle every deletion, then aggregate failures; a failed
                // directory must not stop the others.
                let results: Vec<Result<PathBuf, String>> = private_dirs
                    .par_iter()
                    .map(|(_, dir)| {
                        fs::remove_dir_all(dir)
                            .map(|_| dir.clone())
                            .map_err(|e| format!("{}: {}", dir.display(), e))
                    })
                    .collect();

                for result in results {
                    match result {
                        Ok(dir) => deleted.push(dir),
                        Err(message) => failures.push(message),
                    }
                }
            } else {
                debug!("Keeping private module directories");
            }
        }

        // Bookkeeping happens regardless of the confirmation outcome and of
        // deletion failures.
        let mut pruned = declaration.clone();
        for name in names {
            pruned.dependencies.remove(name);
        }
        pruned.save(root)?;

        if !failures.is_empty() {
            return Err(PruneError::FileSystem(failures));
        }

        let mut removed: Vec<String> = Vec::new();
        for name in names {
            if !removed.contains(name) {
                removed.push(name.clone());
            }
        }
        info!("Removed {} modules from declaration", removed.len());

        Ok(PruneOutcome {
            removed,
            deleted_dirs: deleted,
        })
    }
}
