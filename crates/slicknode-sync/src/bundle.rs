//! Bundle download and installation
//!
//! A bundle is a zip archive produced by the registry: exactly one
//! slicknode.yml at its root (the authoritative declaration) plus module
//! sources under `modules/`, with private modules nested under
//! `modules/@private/<name>/`.
//!
//! Installation stages the whole archive next to the cache before any
//! destination is touched; the commit phase is a short sequence of renames,
//! so an interrupted install never leaves a half-written module tree. The
//! declaration is persisted last and is the single commit point visible to
//! later invocations.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::cache;
use crate::declaration::{
    DeclarationError, DependencySpec, ProjectDeclaration, DECLARATION_FILE,
};
use crate::module::PRIVATE_NAMESPACE;
use crate::project;
use crate::transport::{Transport, TransportError};

/// Errors that can occur during bundle installation
#[derive(Debug, Error)]
pub enum InstallError {
    /// Bundle download failed
    #[error("Failed to download bundle: {0}")]
    Network(#[from] TransportError),

    /// The downloaded bytes are not a readable archive
    #[error("Bundle is not a readable archive: {0}")]
    Archive(String),

    /// The root declaration entry is missing, unreadable, or malformed
    #[error("Failed to read bundle declaration: {0}")]
    ConfigParse(String),

    /// Extraction or commit failed
    #[error("Filesystem error: {0}")]
    FileSystem(#[from] std::io::Error),

    /// Persisting the new declaration failed
    #[error("Failed to persist declaration: {0}")]
    Declaration(#[from] DeclarationError),
}

/// Result of a successful installation
#[derive(Debug)]
pub struct InstallReport {
    /// Installed modules and their final locations, sorted by module id
    pub installed: Vec<(String, PathBuf)>,

    /// The authoritative declaration taken from the bundle
    pub declaration: ProjectDeclaration,
}

/// Where an archive entry belongs
enum Route {
    /// Entry of a private module declared with a path spec
    Private {
        module: String,
        dest: PathBuf,
        remainder: PathBuf,
    },

    /// Cache-managed entry, extracted relative to the cache directory
    Cache {
        unit: PathBuf,
        module: Option<String>,
        remainder: PathBuf,
    },

    /// Scaffold directory above module granularity (`modules/`); nothing to
    /// extract
    Skip,
}

/// Installs remote bundles into a project
pub struct BundleInstaller<'a> {
    transport: &'a dyn Transport,
}

impl<'a> BundleInstaller<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }

    /// Fetch a bundle and apply it to the project
    pub fn install(&self, root: &Path, bundle_url: &str) -> Result<InstallReport, InstallError> {
        let bytes = self.transport.fetch(bundle_url)?;
        let digest = hex::encode(Sha256::digest(&bytes));
        debug!("Fetched bundle: {} bytes, sha256 {}", bytes.len(), digest);

        let tmp_dir = cache::tmp_dir(root);
        fs::create_dir_all(&tmp_dir)?;

        let mut archive_file = tempfile::Builder::new()
            .prefix("bundle-")
            .suffix(".zip")
            .tempfile_in(&tmp_dir)?;
        archive_file.write_all(&bytes)?;

        let mut archive = ZipArchive::new(archive_file.reopen()?)
            .map_err(|e| InstallError::Archive(e.to_string()))?;

        // The bundle's declaration replaces whatever is on disk, wholesale.
        let declaration = read_bundle_declaration(&mut archive)?;

        let staging = tempfile::Builder::new()
            .prefix("stage-")
            .tempdir_in(&tmp_dir)?;
        let units = self.extract_entries(root, &mut archive, &declaration, staging.path())?;

        // All risky work is done; swap the staged units into place and
        // persist the declaration as the final commit point.
        fs::create_dir_all(cache::cache_modules_dir(root))?;
        let mut installed = Vec::new();
        for (dest, (staged, module)) in &units {
            commit_unit(staged, dest)?;
            if let Some(module) = module {
                installed.push((module.clone(), dest.clone()));
            }
        }
        installed.sort();

        declaration.save(root)?;
        info!(
            "Installed {} modules from {}",
            installed.len(),
            bundle_url
        );

        if let Err(e) = archive_file.close() {
            warn!("Failed to remove bundle temp file: {}", e);
        }
        if let Err(e) = staging.close() {
            warn!("Failed to remove staging directory: {}", e);
        }

        Ok(InstallReport {
            installed,
            declaration,
        })
    }

    /// Extract every non-declaration entry into the staging directory
    ///
    /// Returns the swap units keyed by final destination; the map order
    /// makes the commit sequence deterministic.
    fn extract_entries(
        &self,
        root: &Path,
        archive: &mut ZipArchive<File>,
        declaration: &ProjectDeclaration,
        staging: &Path,
    ) -> Result<BTreeMap<PathBuf, (PathBuf, Option<String>)>, InstallError> {
        let cache_dir = cache::cache_dir(root);
        let mut units: BTreeMap<PathBuf, (PathBuf, Option<String>)> = BTreeMap::new();

        for index in 0..archive.len() {
            let mut entry = archive
                .by_index(index)
                .map_err(|e| InstallError::Archive(e.to_string()))?;

            let entry_path = entry.enclosed_name().ok_or_else(|| {
                InstallError::Archive(format!("unsafe entry name: {}", entry.name()))
            })?;

            if entry_path == Path::new(DECLARATION_FILE) {
                continue;
            }

            let (staged_unit, staged_path) =
                match route_entry(root, declaration, &entry_path) {
                    Route::Private {
                        module,
                        dest,
                        remainder,
                    } => {
                        let staged_unit =
                            staging.join("private").join(module.replace('/', "-"));
                        let staged_path = staged_join(&staged_unit, &remainder);
                        units
                            .entry(dest)
                            .or_insert_with(|| (staged_unit.clone(), Some(module)));
                        (staged_unit, staged_path)
                    }
                    Route::Cache {
                        unit,
                        module,
                        remainder,
                    } => {
                        let staged_unit = staging.join("cache").join(&unit);
                        let staged_path = staged_join(&staged_unit, &remainder);
                        units
                            .entry(cache_dir.join(&unit))
                            .or_insert_with(|| (staged_unit.clone(), module));
                        (staged_unit, staged_path)
                    }
                    Route::Skip => continue,
                };

            if entry.is_dir() {
                fs::create_dir_all(&staged_path)?;
                continue;
            }

            fs::create_dir_all(staged_path.parent().unwrap_or(&staged_unit))?;
            let mut out = File::create(&staged_path)?;
            io::copy(&mut entry, &mut out)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    fs::set_permissions(&staged_path, fs::Permissions::from_mode(mode))?;
                }
            }
        }

        Ok(units)
    }
}

/// Read and parse the root declaration entry of a bundle
fn read_bundle_declaration(
    archive: &mut ZipArchive<File>,
) -> Result<ProjectDeclaration, InstallError> {
    let mut entry = archive.by_name(DECLARATION_FILE).map_err(|e| match e {
        ZipError::FileNotFound => InstallError::ConfigParse(format!(
            "bundle has no root {} entry",
            DECLARATION_FILE
        )),
        other => InstallError::Archive(other.to_string()),
    })?;

    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| InstallError::ConfigParse(e.to_string()))?;

    serde_yaml::from_str(&content).map_err(|e| InstallError::ConfigParse(e.to_string()))
}

/// Decide where an archive entry belongs
fn route_entry(root: &Path, declaration: &ProjectDeclaration, entry_path: &Path) -> Route {
    let parts: Vec<String> = entry_path
        .iter()
        .map(|c| c.to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        return Route::Skip;
    }

    let under_private =
        parts.len() >= 2 && parts[0] == "modules" && parts[1] == PRIVATE_NAMESPACE;

    if under_private && parts.len() >= 3 {
        // The owning module id is the second and third path segments.
        let module = format!("{}/{}", parts[1], parts[2]);

        if let Some(DependencySpec::Path(spec)) = declaration.dependencies.get(&module) {
            match project::resolve_in_root(root, spec) {
                Some(dest) => {
                    let remainder: PathBuf = parts[3..].iter().collect();
                    return Route::Private {
                        module,
                        dest,
                        remainder,
                    };
                }
                None => {
                    warn!(
                        "Path spec '{}' for module '{}' leaves the project root; \
                         treating as cache-managed",
                        spec, module
                    );
                }
            }
        }
    }

    // Default: extract relative to the cache directory, preserving the
    // archive-relative path. The swap unit is one module directory.
    let unit_len = if under_private {
        3
    } else if parts[0] == "modules" {
        2
    } else {
        1
    };

    if parts.len() < unit_len {
        return Route::Skip;
    }

    let unit: PathBuf = parts[..unit_len].iter().collect();
    let remainder: PathBuf = parts[unit_len..].iter().collect();
    let module = if parts[0] == "modules" {
        Some(parts[1..unit_len].join("/"))
    } else {
        None
    };

    Route::Cache {
        unit,
        module,
        remainder,
    }
}

/// Join a staged unit with an entry remainder, which may be empty for the
/// unit directory itself
fn staged_join(unit: &Path, remainder: &Path) -> PathBuf {
    if remainder.as_os_str().is_empty() {
        unit.to_path_buf()
    } else {
        unit.join(remainder)
    }
}

/// Swap a staged unit into its final location
fn commit_unit(staged: &Path, dest: &Path) -> io::Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    if dest.is_dir() {
        fs::remove_dir_all(dest)?;
    } else if dest.exists() {
        fs::remove_file(dest)?;
    }

    fs::rename(staged, dest)
}
