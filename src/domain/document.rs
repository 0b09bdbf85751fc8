//! Pure document helpers used while saving node graphs.

use serde_json::{Map, Value};
use tracing::trace;

use crate::domain::node::Document;

/// Shallow merge: every key of `addition` overwrites the same key in `parent`.
///
/// A non-object `parent` is replaced by an empty object first. A non-object
/// `addition` has no keys and leaves `parent` untouched.
pub fn merge<'a>(parent: &'a mut Document, addition: &Document) -> &'a mut Document {
    let Value::Object(additions) = addition else {
        trace!("merge: ignoring non-object addition");
        return parent;
    };
    if !parent.is_object() {
        *parent = Value::Object(Map::new());
    }
    if let Value::Object(map) = &mut *parent {
        for (key, value) in additions {
            map.insert(key.clone(), value.clone());
        }
    }
    parent
}

/// Null, an empty object and an empty array count as empty documents.
pub fn is_empty(doc: &Document) -> bool {
    match doc {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
