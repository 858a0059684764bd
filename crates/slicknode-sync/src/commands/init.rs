//! Project initialization command
//!
//! Creates a new project with an empty slicknode.yml.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::declaration::{DeclarationError, ProjectDeclaration, DECLARATION_FILE};

/// Errors that can occur during project initialization
#[derive(Debug, Error)]
pub enum InitError {
    /// Project already exists
    #[error("Project already exists: slicknode.yml found in {0}")]
    AlreadyExists(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Declaration error
    #[error("Declaration error: {0}")]
    Declaration(#[from] DeclarationError),
}

/// Initialize a new project
///
/// Creates slicknode.yml and the modules directory for private modules.
pub fn init_project(dir: &Path) -> Result<(), InitError> {
    if ProjectDeclaration::file_path(dir).exists() {
        return Err(InitError::AlreadyExists(dir.display().to_string()));
    }

    fs::create_dir_all(dir)?;
    ProjectDeclaration::default().save(dir)?;
    fs::create_dir_all(dir.join("modules"))?;

    println!("Initialized new project in {}", dir.display());
    println!("  - {}", DECLARATION_FILE);
    println!("  - modules/");

    Ok(())
}
