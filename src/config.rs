//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/propreg/propreg.toml`
//! 3. Local config: `<dir>/.propreg.toml`
//! 4. Environment variables: `PROPREG_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::infrastructure::document::{WriteOptions, DEFAULT_INDENT};

/// Settings of the document persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Base directory for relative document paths (default: current directory)
    pub document_dir: PathBuf,
    /// Spaces per indentation level in written documents (default: 4)
    pub indent: usize,
    /// Create missing parent directories when writing (default: true)
    pub create_dirs: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            document_dir: PathBuf::from("."),
            indent: DEFAULT_INDENT,
            create_dirs: true,
        }
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub document_dir: Option<PathBuf>,
    pub indent: Option<usize>,
    pub create_dirs: Option<bool>,
}

/// Get the XDG config directory for propreg.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "propreg").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("propreg.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".propreg.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}`, keeping the input when expansion fails.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            document_dir: overlay
                .document_dir
                .clone()
                .unwrap_or_else(|| self.document_dir.clone()),
            indent: overlay.indent.unwrap_or(self.indent),
            create_dirs: overlay.create_dirs.unwrap_or(self.create_dirs),
        }
    }

    fn expand_paths(&mut self) {
        self.document_dir = expand_path(&self.document_dir);
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.propreg.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("loading global config: {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("loading local config: {}", local_path.display());
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply PROPREG_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("PROPREG")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("document_dir") {
            settings.document_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get::<usize>("indent") {
            settings.indent = val;
        }
        if let Ok(val) = config.get_bool("create_dirs") {
            settings.create_dirs = val;
        }

        Ok(settings)
    }

    /// Options for writing document files.
    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            indent: self.indent,
            create_dirs: self.create_dirs,
        }
    }

    /// Resolve a document path: expand it, then anchor relative paths at
    /// `document_dir`.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        let expanded = expand_path(path);
        if expanded.is_absolute() {
            expanded
        } else {
            self.document_dir.join(expanded)
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# propreg configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/propreg/propreg.toml
#   Local:  <dir>/.propreg.toml
#   Env:    PROPREG_* environment variables

# Base directory for relative document paths
# document_dir = "."

# Spaces per indentation level in written documents
# indent = 4

# Create missing parent directories when writing
# create_dirs = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
