//! Document files: reading, writing and pretty printing.

use std::io;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, instrument, warn};

use crate::domain::document::is_empty;
pub use crate::domain::document::merge;
use crate::domain::Document;
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::traits::FileSystem;

/// Default indentation width of written documents.
pub const DEFAULT_INDENT: usize = 4;

/// How documents are written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Spaces per indentation level
    pub indent: usize,
    /// Create missing parent directories before writing
    pub create_dirs: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            create_dirs: true,
        }
    }
}

/// Parse document text; `path` only labels the error.
pub fn parse(text: &str, path: &Path) -> InfraResult<Document> {
    serde_json::from_str(text).map_err(|source| InfraError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Pretty-print `doc` with `indent` spaces per level.
pub fn to_pretty_string(doc: &Document, indent: usize) -> Result<String, serde_json::Error> {
    let indent = vec![b' '; indent];
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(&indent));
    doc.serialize(&mut serializer)?;
    String::from_utf8(out).map_err(|e| serde_json::Error::io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Read and parse the document stored at `path`.
#[instrument(level = "debug", skip(fs))]
pub fn read(fs: &dyn FileSystem, path: &Path) -> InfraResult<Document> {
    let content = fs.read_to_string(path).map_err(|e| {
        warn!("file for deserialization not readable: {}: {}", path.display(), e);
        InfraError::io(format!("read {}", path.display()), e)
    })?;
    parse(&content, path).map_err(|e| {
        warn!("{}", e);
        e
    })
}

/// Write `doc` to `path`. Empty documents are refused and nothing is written.
#[instrument(level = "debug", skip(fs, doc))]
pub fn write(fs: &dyn FileSystem, path: &Path, doc: &Document, options: &WriteOptions) -> InfraResult<()> {
    if is_empty(doc) {
        warn!("no file serialized, document empty: {}", path.display());
        return Err(InfraError::EmptyDocument(path.to_path_buf()));
    }
    let text = to_pretty_string(doc, options.indent).map_err(|source| InfraError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    if options.create_dirs {
        fs.ensure_parent(path)
            .map_err(|e| InfraError::io(format!("create parent of {}", path.display()), e))?;
    }
    fs.write(path, &text).map_err(|e| {
        warn!("error in opening serialization file: {}: {}", path.display(), e);
        InfraError::io(format!("write {}", path.display()), e)
    })?;
    debug!(bytes = text.len(), "document written");
    Ok(())
}
