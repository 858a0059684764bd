//! Project dependency declaration (slicknode.yml)
//!
//! The declaration is the persisted mapping of module id to dependency spec
//! at the project root. Serialization is deterministic (sorted keys) and
//! writes are atomic, so a crash mid-write never corrupts the previous
//! declaration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::module::{ModuleKind, ModulePatterns};
use crate::project;

/// Name of the declaration file at the project root
pub const DECLARATION_FILE: &str = "slicknode.yml";

/// Errors that can occur during declaration operations
#[derive(Debug, Error)]
pub enum DeclarationError {
    /// Failed to read or write the declaration file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed YAML
    #[error("Failed to parse declaration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Schema violations, collected exhaustively
    #[error("Invalid declaration:\n  - {}", .0.join("\n  - "))]
    Invalid(Vec<String>),
}

/// The declared requirement for a module
///
/// On the wire both forms are plain strings; a string beginning with `./`
/// is a local path spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DependencySpec {
    /// Registry version constraint ("latest", "1.2.0")
    Version(String),

    /// Project-relative path ("./modules/my-app")
    Path(String),
}

impl DependencySpec {
    pub fn as_str(&self) -> &str {
        match self {
            DependencySpec::Version(s) | DependencySpec::Path(s) => s,
        }
    }

    pub fn is_path(&self) -> bool {
        matches!(self, DependencySpec::Path(_))
    }

    /// Get the path spec (if this is a path dependency)
    pub fn path(&self) -> Option<&str> {
        match self {
            DependencySpec::Path(p) => Some(p),
            _ => None,
        }
    }

    /// Get the version constraint (if this is a version dependency)
    pub fn version(&self) -> Option<&str> {
        match self {
            DependencySpec::Version(v) => Some(v),
            _ => None,
        }
    }
}

impl From<String> for DependencySpec {
    fn from(s: String) -> Self {
        if s.starts_with("./") {
            DependencySpec::Path(s)
        } else {
            DependencySpec::Version(s)
        }
    }
}

impl From<DependencySpec> for String {
    fn from(spec: DependencySpec) -> Self {
        match spec {
            DependencySpec::Version(s) | DependencySpec::Path(s) => s,
        }
    }
}

/// Project declaration (slicknode.yml)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDeclaration {
    /// Declared module dependencies, keyed by module id
    #[serde(default)]
    pub dependencies: BTreeMap<String, DependencySpec>,
}

impl ProjectDeclaration {
    /// Path of the declaration file for a project root
    pub fn file_path(root: &Path) -> PathBuf {
        root.join(DECLARATION_FILE)
    }

    /// Load and validate the declaration of a project
    pub fn load(root: &Path, patterns: &ModulePatterns) -> Result<Self, DeclarationError> {
        let content = fs::read_to_string(Self::file_path(root))?;
        Self::from_str(&content, patterns)
    }

    /// Parse and validate a declaration from a string
    pub fn from_str(content: &str, patterns: &ModulePatterns) -> Result<Self, DeclarationError> {
        let declaration: ProjectDeclaration = serde_yaml::from_str(content)?;
        declaration.validate(patterns)?;
        Ok(declaration)
    }

    /// Validate the declaration
    ///
    /// Collects every violation instead of aborting on the first, so the
    /// caller can report all problems at once.
    pub fn validate(&self, patterns: &ModulePatterns) -> Result<(), DeclarationError> {
        let violations = self.violations(patterns);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(DeclarationError::Invalid(violations))
        }
    }

    fn violations(&self, patterns: &ModulePatterns) -> Vec<String> {
        let mut violations = Vec::new();

        for (name, spec) in &self.dependencies {
            match patterns.classify(name) {
                None => violations.push(format!(
                    "module '{}' matches neither the public nor the private naming pattern",
                    name
                )),
                Some(ModuleKind::Public) if spec.is_path() => violations.push(format!(
                    "public module '{}' cannot use a local path ('{}')",
                    name,
                    spec.as_str()
                )),
                _ => {}
            }

            match spec {
                DependencySpec::Version(v) if v.is_empty() => {
                    violations.push(format!("module '{}' has an empty version", name));
                }
                DependencySpec::Path(p) if project::escapes_root(Path::new(p)) => {
                    violations.push(format!(
                        "path '{}' for module '{}' leaves the project root",
                        p, name
                    ));
                }
                _ => {}
            }
        }

        violations
    }

    /// Serialize and write the declaration atomically
    ///
    /// The content goes to a temporary file in the project root which is
    /// renamed over the final path; on any failure the temporary file is
    /// cleaned up by its drop guard and the previous declaration survives.
    pub fn save(&self, root: &Path) -> Result<(), DeclarationError> {
        let content = serde_yaml::to_string(self)?;

        let mut tmp = tempfile::NamedTempFile::new_in(root)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(Self::file_path(root))
            .map_err(|e| DeclarationError::Io(e.error))?;

        Ok(())
    }
}
