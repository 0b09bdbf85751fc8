//! Integration tests for Settings layered loading.
//!
//! These tests use temp directories for the local layer only; no PROPREG_*
//! variables are set, so values come from defaults and the local file.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use propreg::config::{local_config_path, Settings};
use propreg::util::testing::init_test_setup;

#[test]
fn given_no_local_config_when_load_then_defaults() {
    // Arrange
    init_test_setup();
    let dir = TempDir::new().unwrap();

    // Act
    let settings = Settings::load(Some(dir.path())).expect("load settings");

    // Assert
    assert_eq!(settings.indent, 4);
    assert!(settings.create_dirs);
}

#[test]
fn given_local_config_when_load_then_overrides_specified_keys_only() {
    // Arrange
    init_test_setup();
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        r#"
indent = 2
document_dir = "/srv/documents"
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(dir.path())).expect("load settings");

    // Assert
    assert_eq!(settings.indent, 2);
    assert_eq!(settings.document_dir, Path::new("/srv/documents"));
    assert!(settings.create_dirs, "unspecified key keeps its default");
}

#[test]
fn given_local_config_with_tilde_when_load_then_document_dir_expanded() {
    init_test_setup();
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "document_dir = \"~/propreg-docs\"\n").unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    let home = std::env::var("HOME").expect("HOME should be set");
    assert_eq!(settings.document_dir, Path::new(&home).join("propreg-docs"));
}

#[test]
fn given_invalid_local_config_when_load_then_config_error() {
    init_test_setup();
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "indent = \"four\"\n").unwrap();

    let result = Settings::load(Some(dir.path()));

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().starts_with("config error"));
}

#[test]
fn given_loaded_settings_when_resolving_relative_path_then_anchored_at_document_dir() {
    init_test_setup();
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    fs::write(
        local_config_path(dir.path()),
        format!("document_dir = {:?}\n", docs.to_string_lossy()),
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.resolve(Path::new("a/b.json")), docs.join("a/b.json"));
    assert_eq!(settings.write_options().indent, 4);
}
