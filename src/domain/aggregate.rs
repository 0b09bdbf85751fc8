//! User-defined persisted structs.
//!
//! An aggregate owns a [`Registry`] and builds it in its `Default` impl, one
//! `add*` call per field, keeping the returned [`Field`](crate::domain::Field)
//! handles beside the registry:
//!
//! ```
//! use propreg::aggregate_node;
//! use propreg::domain::{Aggregate, Field, Node, Registry, Scalar};
//! use serde_json::json;
//!
//! #[derive(Debug, Clone)]
//! struct Example {
//!     registry: Registry,
//!     name: Field<Scalar<i64>>,
//! }
//!
//! impl Default for Example {
//!     fn default() -> Self {
//!         let mut registry = Registry::new("Example");
//!         let name = registry.add_value("Name", 0_i64);
//!         Self { registry, name }
//!     }
//! }
//!
//! impl Aggregate for Example {
//!     fn registry(&self) -> &Registry {
//!         &self.registry
//!     }
//!
//!     fn registry_mut(&mut self) -> &mut Registry {
//!         &mut self.registry
//!     }
//! }
//!
//! aggregate_node!(Example);
//!
//! let mut example = Example::default();
//! example.load(&json!({"Name": 1})).unwrap();
//! assert_eq!(*example.registry.value(&example.name).unwrap(), 1);
//! example.registry.set(&example.name, 2).unwrap();
//! assert_eq!(example.save().unwrap(), json!({"Example": {"Name": 2}}));
//! ```

use crate::domain::error::DomainResult;
use crate::domain::node::{Document, Node, Property};
use crate::domain::registry::{Field, Registry};

/// A struct persisted through the registry it owns.
///
/// `Default` must register every field; collections rely on it to allocate
/// fresh elements. `Clone` must deep-copy, which a derived impl does since
/// [`Registry`] clones its children.
pub trait Aggregate: Node + Default + Clone {
    fn registry(&self) -> &Registry;

    fn registry_mut(&mut self) -> &mut Registry;

    /// Value behind one of this aggregate's fields.
    fn get<N: Property>(&self, field: &Field<N>) -> DomainResult<&N::Value> {
        self.registry().value(field)
    }

    fn get_mut<N: Property>(&mut self, field: &Field<N>) -> DomainResult<&mut N::Value> {
        self.registry_mut().value_mut(field)
    }

    /// Fresh default instance loaded from `doc`.
    fn from_document(doc: &Document) -> DomainResult<Self> {
        let mut aggregate = Self::default();
        aggregate.load(doc)?;
        Ok(aggregate)
    }
}
