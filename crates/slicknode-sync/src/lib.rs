//! Slicknode Module Synchronization Library
//!
//! This crate keeps a project's module tree consistent with its declaration
//! file (slicknode.yml), a remote-supplied bundle archive, and the local
//! module cache. It provides:
//! - Declaration parsing, validation, and deterministic serialization
//! - Module name classification (public vs. private namespace)
//! - Cache consistency inspection
//! - Bundle download and staged, all-or-nothing installation
//! - Module removal with private-directory cleanup
//! - Version string ordering

pub mod bundle;
pub mod cache;
pub mod commands;
pub mod confirm;
pub mod declaration;
pub mod lock;
pub mod module;
pub mod project;
pub mod prune;
pub mod transport;
pub mod version;

pub use bundle::{BundleInstaller, InstallError, InstallReport};
pub use cache::{cache_dir, cache_modules_dir, is_loaded};
pub use confirm::{Confirm, PresetConfirm, StdinConfirm};
pub use declaration::{
    DeclarationError, DependencySpec, ProjectDeclaration, DECLARATION_FILE,
};
pub use lock::{LockError, ProjectLock};
pub use module::{ModuleKind, ModulePatterns, PRIVATE_NAMESPACE};
pub use project::find_project_root;
pub use prune::{ModulePruner, PruneError, PruneOutcome};
pub use transport::{HttpTransport, Transport, TransportError};
pub use version::{compare, sort_versions, Version, VersionError};
