//! Integration tests for bundle installation

use slicknode_sync::{
    cache_modules_dir, is_loaded, BundleInstaller, InstallError, ModulePatterns,
    ProjectDeclaration, Transport, TransportError, DECLARATION_FILE,
};
use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Transport serving a fixed in-memory bundle
struct FakeTransport(Vec<u8>);

impl Transport for FakeTransport {
    fn fetch(&self, _url: &str) -> Result<Vec<u8>, TransportError> {
        Ok(self.0.clone())
    }
}

/// Transport that always fails
struct DeadTransport;

impl Transport for DeadTransport {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        Err(TransportError::Status {
            status: 502,
            url: url.to_string(),
        })
    }
}

fn make_bundle(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }

    writer.finish().unwrap().into_inner()
}

/// Collect every file under `dir` as relative path -> content
fn snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    fn walk(base: &Path, dir: &Path, files: &mut BTreeMap<String, Vec<u8>>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(base, &path, files);
            } else {
                let relative = path.strip_prefix(base).unwrap();
                files.insert(
                    relative.to_string_lossy().into_owned(),
                    fs::read(&path).unwrap(),
                );
            }
        }
    }

    let mut files = BTreeMap::new();
    if dir.exists() {
        walk(dir, dir, &mut files);
    }
    files
}

const BUNDLE_DECLARATION: &str = concat!(
    "dependencies:\n",
    "  '@private/test-app': ./modules/test-app\n",
    "  auth: latest\n",
);

fn standard_bundle() -> Vec<u8> {
    make_bundle(&[
        (DECLARATION_FILE, BUNDLE_DECLARATION),
        ("modules/auth/slicknode.yml", "module:\n  id: auth\n"),
        ("modules/auth/schema.graphql", "type Query { ok: Boolean }\n"),
        (
            "modules/@private/test-app/slicknode.yml",
            "module:\n  id: '@private/test-app'\n",
        ),
        (
            "modules/@private/test-app/src/index.js",
            "export default 1;\n",
        ),
    ])
}

#[test]
fn test_install_routes_public_and_private_entries() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();
    let patterns = ModulePatterns::default();

    // The previous declaration is replaced wholesale by the bundle's.
    fs::write(
        root.join(DECLARATION_FILE),
        "dependencies:\n  stale-module: latest\n",
    )
    .unwrap();

    let transport = FakeTransport(standard_bundle());
    let installer = BundleInstaller::new(&transport);
    let report = installer.install(root, "https://registry.example/bundle.zip").unwrap();

    // Public module in the cache
    assert!(cache_modules_dir(root)
        .join("auth")
        .join("schema.graphql")
        .exists());

    // Private module at its declared path, with the archive prefix stripped
    assert!(root.join("modules/test-app/src/index.js").exists());
    assert!(root.join("modules/test-app/slicknode.yml").exists());

    // The bundle declaration is authoritative
    let declaration = ProjectDeclaration::load(root, &patterns).unwrap();
    assert!(!declaration.dependencies.contains_key("stale-module"));
    assert!(declaration.dependencies.contains_key("auth"));
    assert!(declaration.dependencies.contains_key("@private/test-app"));

    // The report names both modules
    let names: Vec<&str> = report.installed.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["@private/test-app", "auth"]);

    // And the project is now in sync
    assert!(is_loaded(root, &declaration, &patterns));
}

#[test]
fn test_install_is_idempotent() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();

    let transport = FakeTransport(standard_bundle());
    let installer = BundleInstaller::new(&transport);

    installer.install(root, "https://registry.example/bundle.zip").unwrap();
    let declaration_first = fs::read(root.join(DECLARATION_FILE)).unwrap();
    let tree_first = snapshot(root);

    installer.install(root, "https://registry.example/bundle.zip").unwrap();
    let declaration_second = fs::read(root.join(DECLARATION_FILE)).unwrap();
    let tree_second = snapshot(root);

    assert_eq!(declaration_first, declaration_second);
    assert_eq!(tree_first, tree_second);
}

#[test]
fn test_install_replaces_stale_cache_content() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();

    let stale = cache_modules_dir(root).join("auth").join("stale.txt");
    fs::create_dir_all(stale.parent().unwrap()).unwrap();
    fs::write(&stale, "old").unwrap();

    let transport = FakeTransport(standard_bundle());
    let installer = BundleInstaller::new(&transport);
    installer.install(root, "https://registry.example/bundle.zip").unwrap();

    // The module directory is swapped, not merged
    assert!(!stale.exists());
    assert!(cache_modules_dir(root)
        .join("auth")
        .join("schema.graphql")
        .exists());
}

#[test]
fn test_private_module_without_path_spec_is_cache_managed() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();

    let bundle = make_bundle(&[
        (
            DECLARATION_FILE,
            "dependencies:\n  '@private/test-app': latest\n",
        ),
        (
            "modules/@private/test-app/src/index.js",
            "export default 1;\n",
        ),
    ]);

    let transport = FakeTransport(bundle);
    let installer = BundleInstaller::new(&transport);
    installer.install(root, "https://registry.example/bundle.zip").unwrap();

    // Falls through to the default destination under the cache
    assert!(cache_modules_dir(root)
        .join("@private/test-app/src/index.js")
        .exists());
    assert!(!root.join("modules/test-app").exists());
}

#[test]
fn test_garbage_bytes_are_an_archive_error() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();

    fs::write(root.join(DECLARATION_FILE), "dependencies: {}\n").unwrap();
    let before = fs::read(root.join(DECLARATION_FILE)).unwrap();

    let transport = FakeTransport(vec![0xde, 0xad, 0xbe, 0xef]);
    let installer = BundleInstaller::new(&transport);
    let result = installer.install(root, "https://registry.example/bundle.zip");

    assert!(matches!(result, Err(InstallError::Archive(_))));
    // The previous declaration survives a failed install
    assert_eq!(fs::read(root.join(DECLARATION_FILE)).unwrap(), before);
}

#[test]
fn test_bundle_without_root_declaration_is_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();

    fs::write(root.join(DECLARATION_FILE), "dependencies: {}\n").unwrap();
    let before = fs::read(root.join(DECLARATION_FILE)).unwrap();

    let bundle = make_bundle(&[("modules/auth/schema.graphql", "type Query { ok: Boolean }\n")]);
    let transport = FakeTransport(bundle);
    let installer = BundleInstaller::new(&transport);
    let result = installer.install(root, "https://registry.example/bundle.zip");

    assert!(matches!(result, Err(InstallError::ConfigParse(_))));
    assert_eq!(fs::read(root.join(DECLARATION_FILE)).unwrap(), before);
    // Nothing was committed to the cache
    assert!(!cache_modules_dir(root).exists());
}

#[test]
fn test_fetch_failure_is_a_network_error() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();

    let installer = BundleInstaller::new(&DeadTransport);
    let result = installer.install(root, "https://registry.example/bundle.zip");

    assert!(matches!(result, Err(InstallError::Network(_))));
}
