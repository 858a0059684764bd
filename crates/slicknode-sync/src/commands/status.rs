//! Status command
//!
//! Reports whether the local module tree satisfies the declaration.

use std::path::Path;
use thiserror::Error;

use crate::cache;
use crate::declaration::{DeclarationError, ProjectDeclaration};
use crate::module::ModulePatterns;

/// Errors that can occur while checking project status
#[derive(Debug, Error)]
pub enum StatusError {
    /// No slicknode.yml found
    #[error("No slicknode.yml found. Run `slicknode-sync init` to create a project.")]
    NoDeclaration,

    /// Declaration error
    #[error("Declaration error: {0}")]
    Declaration(#[from] DeclarationError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Project status
#[derive(Debug)]
pub struct StatusReport {
    /// Whether every declared module is present on disk
    pub loaded: bool,

    /// Number of declared modules
    pub declared: usize,
}

/// Check whether the declared modules are present on disk
pub fn project_status(
    start_dir: Option<&Path>,
    patterns: &ModulePatterns,
) -> Result<StatusReport, StatusError> {
    let root = super::resolve_root(start_dir)?.ok_or(StatusError::NoDeclaration)?;
    let declaration = ProjectDeclaration::load(&root, patterns)?;

    let loaded = cache::is_loaded(&root, &declaration, patterns);
    if loaded {
        println!("Modules are up to date.");
    } else {
        println!("Module sources are missing. Run `slicknode-sync sync` to install them.");
    }

    Ok(StatusReport {
        loaded,
        declared: declaration.dependencies.len(),
    })
}
