//! Domain-level errors (no I/O concerns)

use thiserror::Error;

/// Domain errors raised while walking a node graph.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("no name found for this {kind}")]
    MissingName { kind: &'static str },

    #[error("cannot convert value of '{name}': {source}")]
    Conversion {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("'{name}' expected {expected}, found {found}")]
    UnexpectedShape {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("'{name}' expects exactly {expected} elements, found {found}")]
    MalformedCollection {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("field not found: {0}")]
    FieldNotFound(String),
}

impl DomainError {
    pub(crate) fn conversion(name: Option<&str>, source: serde_json::Error) -> Self {
        Self::Conversion {
            name: name.unwrap_or("<anonymous>").to_string(),
            source,
        }
    }

    pub(crate) fn shape(name: Option<&str>, expected: &'static str, found: &serde_json::Value) -> Self {
        Self::UnexpectedShape {
            name: name.unwrap_or("<anonymous>").to_string(),
            expected,
            found: shape_of(found),
        }
    }
}

/// Short description of a document value's shape, used in error messages.
pub fn shape_of(doc: &serde_json::Value) -> &'static str {
    match doc {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
