//! Integration tests for module removal

use slicknode_sync::{
    DependencySpec, ModulePatterns, ModulePruner, PresetConfirm, ProjectDeclaration, PruneError,
};
use std::fs;
use std::path::Path;

fn declaration(entries: &[(&str, &str)]) -> ProjectDeclaration {
    let mut declaration = ProjectDeclaration::default();
    for (name, spec) in entries {
        declaration
            .dependencies
            .insert(name.to_string(), DependencySpec::from(spec.to_string()));
    }
    declaration
}

fn declared_names(root: &Path) -> Vec<String> {
    ProjectDeclaration::load(root, &ModulePatterns::default())
        .unwrap()
        .dependencies
        .keys()
        .cloned()
        .collect()
}

#[test]
fn test_prune_public_module() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();

    let declaration = declaration(&[
        ("auth", "latest"),
        ("core", "latest"),
        ("relay", "latest"),
        ("image", "latest"),
    ]);
    declaration.save(root).unwrap();

    let patterns = ModulePatterns::default();
    let confirm = PresetConfirm(true);
    let pruner = ModulePruner::new(&patterns, &confirm);

    let outcome = pruner
        .remove(root, &declaration, &["image".to_string()])
        .unwrap();
    assert_eq!(outcome.removed, vec!["image"]);

    assert_eq!(declared_names(root), vec!["auth", "core", "relay"]);
}

#[test]
fn test_prune_private_module_with_confirmation() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();

    let app_dir = root.join("modules/test-app");
    fs::create_dir_all(&app_dir).unwrap();
    fs::write(app_dir.join("slicknode.yml"), "module:\n  id: test-app\n").unwrap();

    let declaration = declaration(&[("@private/test-app", "./modules/test-app")]);
    declaration.save(root).unwrap();

    let patterns = ModulePatterns::default();
    let confirm = PresetConfirm(true);
    let pruner = ModulePruner::new(&patterns, &confirm);

    let outcome = pruner
        .remove(root, &declaration, &["@private/test-app".to_string()])
        .unwrap();

    assert_eq!(outcome.removed, vec!["@private/test-app"]);
    assert_eq!(outcome.deleted_dirs, vec![app_dir.clone()]);
    assert!(!app_dir.exists());
    assert!(declared_names(root).is_empty());
}

#[test]
fn test_prune_private_module_declined() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();

    let app_dir = root.join("modules/test-app");
    fs::create_dir_all(&app_dir).unwrap();
    fs::write(app_dir.join("slicknode.yml"), "module:\n  id: test-app\n").unwrap();

    let declaration = declaration(&[("@private/test-app", "./modules/test-app")]);
    declaration.save(root).unwrap();

    let patterns = ModulePatterns::default();
    let confirm = PresetConfirm(false);
    let pruner = ModulePruner::new(&patterns, &confirm);

    let outcome = pruner
        .remove(root, &declaration, &["@private/test-app".to_string()])
        .unwrap();

    // The directory survives; the declaration entry does not.
    assert!(outcome.deleted_dirs.is_empty());
    assert!(app_dir.join("slicknode.yml").exists());
    assert!(declared_names(root).is_empty());
}

#[test]
fn test_prune_unknown_module_mutates_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();

    let app_dir = root.join("modules/test-app");
    fs::create_dir_all(&app_dir).unwrap();

    let declaration = declaration(&[("@private/test-app", "./modules/test-app")]);
    declaration.save(root).unwrap();
    let before = fs::read(root.join("slicknode.yml")).unwrap();

    let patterns = ModulePatterns::default();
    let confirm = PresetConfirm(true);
    let pruner = ModulePruner::new(&patterns, &confirm);

    let result = pruner.remove(
        root,
        &declaration,
        &["@private/test-app".to_string(), "ghost".to_string()],
    );

    match result {
        Err(PruneError::ModuleNotFound(names)) => assert_eq!(names, vec!["ghost"]),
        other => panic!("expected ModuleNotFound, got {:?}", other.err()),
    }

    // Neither the declaration nor the filesystem changed
    assert_eq!(fs::read(root.join("slicknode.yml")).unwrap(), before);
    assert!(app_dir.exists());
}

#[test]
fn test_prune_mixed_public_and_private() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();

    let app_dir = root.join("modules/blog");
    fs::create_dir_all(&app_dir).unwrap();

    let declaration = declaration(&[
        ("auth", "latest"),
        ("image", "latest"),
        ("@private/blog", "./modules/blog"),
    ]);
    declaration.save(root).unwrap();

    let patterns = ModulePatterns::default();
    let confirm = PresetConfirm(true);
    let pruner = ModulePruner::new(&patterns, &confirm);

    let outcome = pruner
        .remove(
            root,
            &declaration,
            &["image".to_string(), "@private/blog".to_string()],
        )
        .unwrap();

    assert_eq!(outcome.removed, vec!["image", "@private/blog"]);
    assert!(!app_dir.exists());
    assert_eq!(declared_names(root), vec!["auth"]);
}

#[test]
fn test_prune_private_module_with_version_spec_deletes_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();

    let declaration = declaration(&[("@private/test-app", "latest")]);
    declaration.save(root).unwrap();

    let patterns = ModulePatterns::default();
    // Confirmation must not even be requested; a negative preset would
    // not change the outcome either way.
    let confirm = PresetConfirm(true);
    let pruner = ModulePruner::new(&patterns, &confirm);

    let outcome = pruner
        .remove(root, &declaration, &["@private/test-app".to_string()])
        .unwrap();

    assert!(outcome.deleted_dirs.is_empty());
    assert!(declared_names(root).is_empty());
}
