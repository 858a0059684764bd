//! Module cache layout and consistency inspection
//!
//! Installed public modules live under the project's hidden state folder:
//!
//! ```text
//! <root>/.slicknode/
//! ├── cache/modules/<module-id>/   # installed public module sources
//! ├── tmp/                         # bundle downloads and staging
//! └── .lock                        # advisory project lock
//! ```

use std::path::{Path, PathBuf};

use crate::declaration::{DependencySpec, ProjectDeclaration};
use crate::module::{ModuleKind, ModulePatterns};
use crate::project;

/// Name of the hidden state folder at the project root
pub const STATE_DIR: &str = ".slicknode";

/// The project's hidden state folder
pub fn state_dir(root: &Path) -> PathBuf {
    root.join(STATE_DIR)
}

/// The cache directory; bundle entries are extracted relative to it
pub fn cache_dir(root: &Path) -> PathBuf {
    state_dir(root).join("cache")
}

/// The directory holding one subdirectory per installed public module
pub fn cache_modules_dir(root: &Path) -> PathBuf {
    cache_dir(root).join("modules")
}

/// Scratch space for bundle downloads and staged extraction
///
/// Kept inside the state folder so renames into the cache stay on one
/// filesystem.
pub fn tmp_dir(root: &Path) -> PathBuf {
    state_dir(root).join("tmp")
}

/// Check whether the local cache satisfies the declaration
///
/// A pure presence check: every declared module's expected location must
/// exist on disk. Content integrity and version match are not verified.
/// Never fails; anything unexpected reads as "not loaded".
pub fn is_loaded(root: &Path, declaration: &ProjectDeclaration, patterns: &ModulePatterns) -> bool {
    let modules_dir = cache_modules_dir(root);
    if !modules_dir.is_dir() {
        return false;
    }

    for (name, spec) in &declaration.dependencies {
        let expected = match patterns.classify(name) {
            Some(ModuleKind::Private) => {
                // A private module is only loadable through a path spec.
                let dir = match spec {
                    DependencySpec::Path(p) => project::resolve_in_root(root, p),
                    DependencySpec::Version(_) => None,
                };
                match dir {
                    Some(dir) => dir,
                    None => return false,
                }
            }
            Some(ModuleKind::Public) => modules_dir.join(name),
            None => return false,
        };

        if !expected.exists() {
            return false;
        }
    }

    true
}
