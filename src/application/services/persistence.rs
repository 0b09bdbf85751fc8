//! Document persistence service
//!
//! Loads node graphs from document files and saves them back.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::{Aggregate, Node};
use crate::infrastructure::document;
use crate::infrastructure::traits::FileSystem;

/// Service for persisting aggregates as document files.
pub struct PersistenceService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl PersistenceService {
    /// Create a new persistence service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Absolute or `document_dir`-relative location of `path`.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.settings.resolve(path)
    }

    /// Load the document at `path` into `node`.
    ///
    /// The file holds what [`Node::save`] produced, so a named node finds its
    /// contents under its own key.
    #[instrument(level = "debug", skip(self, node))]
    pub fn load_into(&self, node: &mut dyn Node, path: &Path) -> ApplicationResult<()> {
        self.load_resolved(node, &self.resolve(path))
    }

    fn load_resolved(&self, node: &mut dyn Node, path: &Path) -> ApplicationResult<()> {
        let doc = document::read(self.fs.as_ref(), path)?;
        node.load_saved(&doc)?;
        debug!("loaded {}", path.display());
        Ok(())
    }

    /// Like [`Self::load_into`], but I/O and parse failures are reported and
    /// swallowed: the node is left unchanged and `Ok(false)` is returned.
    /// Conversion errors still propagate.
    pub fn try_load_into(&self, node: &mut dyn Node, path: &Path) -> ApplicationResult<bool> {
        let path = self.resolve(path);
        let doc = match document::read(self.fs.as_ref(), &path) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("keeping current values, {}", e);
                return Ok(false);
            }
        };
        node.load_saved(&doc)?;
        Ok(true)
    }

    /// Default instance of `T`, loaded from `path` when the file exists.
    pub fn load_or_default<T: Aggregate>(&self, path: &Path) -> ApplicationResult<T> {
        let mut aggregate = T::default();
        let path = self.resolve(path);
        if self.fs.exists(&path) {
            self.load_resolved(&mut aggregate, &path)?;
        } else {
            debug!("no document at {}, using defaults", path.display());
        }
        Ok(aggregate)
    }

    /// Save `node` to `path`.
    #[instrument(level = "debug", skip(self, node))]
    pub fn save(&self, node: &dyn Node, path: &Path) -> ApplicationResult<()> {
        let path = self.resolve(path);
        let doc = node.save()?;
        document::write(self.fs.as_ref(), &path, &doc, &self.settings.write_options())?;
        Ok(())
    }
}
