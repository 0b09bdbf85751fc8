//! The node contract shared by every persisted datum.
//!
//! A node is a unit of persistence identity: it can deep-copy itself, take
//! values from another node of the same kind, and convert to and from a
//! [`Document`]. The name doubles as the key under which the node's contents
//! live in its parent document. Nodes without a name are anonymous; their
//! contents are saved without a wrapping key.

use std::any::{type_name, Any};
use std::fmt;

use serde_json::{Map, Value};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::registry::Registry;

/// Tree-structured document value used as the wire representation.
pub type Document = Value;

/// Polymorphic persistence contract.
pub trait Node: Any + fmt::Debug {
    /// Key of this node in its parent document, `None` for anonymous nodes.
    fn name(&self) -> Option<&str>;

    /// Concrete kind, used in mismatch errors.
    fn kind(&self) -> &'static str {
        type_name::<Self>()
    }

    /// Deep copy of the whole subtree rooted at this node. The name is kept.
    fn clone_node(&self) -> Box<dyn Node>;

    /// Copy values (never the name) from `other` into `self`.
    ///
    /// # Errors
    ///
    /// `DomainError::TypeMismatch` if `other` is a different kind of node.
    fn assign(&mut self, other: &dyn Node) -> DomainResult<()>;

    /// Replace this node's contents from `doc`, the value stored under the
    /// node's own key.
    fn load(&mut self, doc: &Document) -> DomainResult<()>;

    /// Contents of this node without the name wrapping.
    fn save_contents(&self) -> DomainResult<Document>;

    /// `{name: contents}` for named nodes, bare contents for anonymous ones.
    fn save(&self) -> DomainResult<Document> {
        Ok(wrap(self.name(), self.save_contents()?))
    }

    /// Load from the output of [`Node::save`].
    ///
    /// A named node unwraps `saved` when it is exactly `{name: contents}`, the
    /// shape `save` produces; anything else is handed to [`Node::load`]
    /// unchanged.
    fn load_saved(&mut self, saved: &Document) -> DomainResult<()> {
        let inner = match (self.name(), saved) {
            (Some(name), Value::Object(map)) if map.len() == 1 => map.get(name),
            _ => None,
        };
        match inner {
            Some(inner) => self.load(inner),
            None => self.load(saved),
        }
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Registry view of aggregate nodes, `None` for every other kind.
    fn as_registry(&self) -> Option<&Registry> {
        None
    }

    fn as_registry_mut(&mut self) -> Option<&mut Registry> {
        None
    }
}

/// A node exposing a typed value for direct field access.
pub trait Property: Node {
    type Value;

    fn value(&self) -> &Self::Value;

    fn value_mut(&mut self) -> &mut Self::Value;
}

impl Clone for Box<dyn Node> {
    fn clone(&self) -> Self {
        self.clone_node()
    }
}

/// Capability-checked downcast of a node to a concrete kind.
pub fn downcast<T: Node>(node: &dyn Node) -> DomainResult<&T> {
    node.as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| DomainError::TypeMismatch {
            expected: type_name::<T>(),
            found: node.kind(),
        })
}

pub fn downcast_mut<T: Node>(node: &mut dyn Node) -> DomainResult<&mut T> {
    let found = node.kind();
    node.as_any_mut()
        .downcast_mut::<T>()
        .ok_or(DomainError::TypeMismatch {
            expected: type_name::<T>(),
            found,
        })
}

/// Name check required before a non-aggregate node can load.
pub(crate) fn require_name<'a>(name: Option<&'a str>, kind: &'static str) -> DomainResult<&'a str> {
    name.ok_or(DomainError::MissingName { kind })
}

pub(crate) fn wrap(name: Option<&str>, contents: Document) -> Document {
    match name {
        Some(name) => {
            let mut map = Map::new();
            map.insert(name.to_string(), contents);
            Value::Object(map)
        }
        None => contents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scalar::Scalar;
    use serde_json::json;

    #[test]
    fn given_name_when_wrapping_then_nests_under_key() {
        assert_eq!(wrap(Some("Name"), json!(1)), json!({"Name": 1}));
    }

    #[test]
    fn given_no_name_when_wrapping_then_returns_contents() {
        assert_eq!(wrap(None, json!([1, 2])), json!([1, 2]));
    }

    #[test]
    fn given_wrong_kind_when_downcasting_then_type_mismatch() {
        let node: Box<dyn Node> = Box::new(Scalar::new("Name", 1_i64));
        let result = downcast::<Scalar<String>>(node.as_ref());
        assert!(matches!(result, Err(DomainError::TypeMismatch { .. })));
    }

    #[test]
    fn given_boxed_node_when_cloning_box_then_deep_copies() {
        let node: Box<dyn Node> = Box::new(Scalar::new("Name", 1_i64));
        let mut copy = node.clone();
        downcast_mut::<Scalar<i64>>(copy.as_mut()).unwrap().set(5);

        assert_eq!(*downcast::<Scalar<i64>>(node.as_ref()).unwrap().value(), 1);
        assert_eq!(*downcast::<Scalar<i64>>(copy.as_ref()).unwrap().value(), 5);
        assert_eq!(copy.name(), Some("Name"));
    }

    #[test]
    fn given_saved_document_when_load_saved_then_unwraps_own_key() {
        let mut node = Scalar::new("Name", 0_i64);
        node.load_saved(&json!({"Name": 3})).unwrap();
        assert_eq!(*node.value(), 3);
    }

    #[test]
    fn given_bare_contents_with_child_of_same_name_when_load_saved_then_loads_contents() {
        let mut item = Registry::new("Item");
        let inner = item.add_value("Item", 0_i64);
        let other = item.add_value("Other", 0_i64);

        item.load_saved(&json!({"Item": 5, "Other": 6})).unwrap();

        assert_eq!(*item.value(&inner).unwrap(), 5);
        assert_eq!(*item.value(&other).unwrap(), 6);
    }

    #[test]
    fn given_wrapped_contents_with_child_of_same_name_when_load_saved_then_unwraps() {
        let mut item = Registry::new("Item");
        let inner = item.add_value("Item", 0_i64);

        let saved = item.save().unwrap();
        item.load_saved(&saved).unwrap();
        item.load_saved(&json!({"Item": {"Item": 7}})).unwrap();

        assert_eq!(*item.value(&inner).unwrap(), 7);
    }
}
