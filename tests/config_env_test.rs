//! Integration tests for the PROPREG_* environment layer of Settings.
//!
//! Environment variables are process-wide, so these cases live in their own
//! test binary and run inside a single test function.

use std::env;
use std::fs;
use std::path::Path;

use tempfile::TempDir;

use propreg::config::{local_config_path, Settings};
use propreg::util::testing::init_test_setup;

#[test]
fn given_propreg_env_vars_when_load_then_override_local_config() {
    // Arrange
    init_test_setup();
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "indent = 8\ncreate_dirs = true\ndocument_dir = \"/from/file\"\n",
    )
    .unwrap();
    env::set_var("PROPREG_INDENT", "2");
    env::set_var("PROPREG_CREATE_DIRS", "false");
    env::set_var("PROPREG_DOCUMENT_DIR", "/from/env");

    // Act
    let with_env = Settings::load(Some(dir.path()));
    env::remove_var("PROPREG_INDENT");
    env::remove_var("PROPREG_CREATE_DIRS");
    env::remove_var("PROPREG_DOCUMENT_DIR");
    let without_env = Settings::load(Some(dir.path())).expect("load settings");

    // Assert
    let with_env = with_env.expect("load settings");
    assert_eq!(with_env.indent, 2);
    assert!(!with_env.create_dirs);
    assert_eq!(with_env.document_dir, Path::new("/from/env"));
    assert_eq!(without_env.indent, 8);
    assert!(without_env.create_dirs);
    assert_eq!(without_env.document_dir, Path::new("/from/file"));
}
