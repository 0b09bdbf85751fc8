//! Named aggregate of child nodes.
//!
//! Children live in a generational arena. Every `add*` call hands back a typed
//! [`Field`] handle which stays valid for the registry that issued it and for
//! any deep clone of it. Replacing or removing a child frees its slot, so a
//! stale handle fails with `FieldNotFound` instead of reaching a newer child.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use generational_arena::{Arena, Index};
use serde_json::{Map, Value};
use tracing::{debug, instrument, trace};

use crate::domain::aggregate::Aggregate;
use crate::domain::collection::{Array, Sequence};
use crate::domain::document::merge;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{downcast, downcast_mut, Document, Node, Property};
use crate::domain::scalar::{Scalar, ScalarValue};

/// Typed handle to a child of a [`Registry`].
pub struct Field<N> {
    index: Index,
    name: Option<String>,
    _kind: PhantomData<fn() -> N>,
}

impl<N> Field<N> {
    fn new(index: Index, name: Option<String>) -> Self {
        Self {
            index,
            name,
            _kind: PhantomData,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("<anonymous {:?}>", self.index.into_raw_parts()),
        }
    }
}

impl<N> Clone for Field<N> {
    fn clone(&self) -> Self {
        Self::new(self.index, self.name.clone())
    }
}

impl<N> fmt::Debug for Field<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("index", &self.index)
            .finish()
    }
}

/// Named, owned collection of child nodes; itself a node, so registries nest.
#[derive(Debug, Clone)]
pub struct Registry {
    name: Option<String>,
    children: Arena<Box<dyn Node>>,
    /// Declaration order; later children win key collisions on save.
    order: Vec<Index>,
    names: HashMap<String, Index>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl Registry {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_name(Some(name.into()))
    }

    /// Registry whose children save and load at the parent's level.
    pub fn anonymous() -> Self {
        Self::with_name(None)
    }

    fn with_name(name: Option<String>) -> Self {
        Self {
            name,
            children: Arena::new(),
            order: Vec::new(),
            names: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Names of the named children in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.iter().filter_map(|child| child.name())
    }

    /// Children in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Node> {
        self.order
            .iter()
            .filter_map(|index| self.children.get(*index))
            .map(|child| child.as_ref())
    }

    /// Register `node`, dropping any child already registered under its name.
    #[instrument(level = "trace", skip(self, node), fields(registry = ?self.name))]
    pub fn add<N: Node>(&mut self, node: N) -> Field<N> {
        let name = node.name().map(str::to_owned);
        if let Some(name) = &name {
            if self.remove(name) {
                debug!(name = name.as_str(), "replaced existing property");
            }
        }
        let index = self.children.insert(Box::new(node));
        self.order.push(index);
        if let Some(name) = &name {
            self.names.insert(name.clone(), index);
        }
        Field::new(index, name)
    }

    pub fn add_value<T: ScalarValue>(&mut self, name: impl Into<String>, default: T) -> Field<Scalar<T>> {
        self.add(Scalar::new(name, default))
    }

    pub fn add_default<T: ScalarValue + Default>(&mut self, name: impl Into<String>) -> Field<Scalar<T>> {
        self.add(Scalar::with_default(name))
    }

    /// Register a deep copy of `aggregate` under the aggregate's own name.
    pub fn add_aggregate<T: Aggregate>(&mut self, aggregate: &T) -> Field<T> {
        self.add(aggregate.clone())
    }

    pub fn add_sequence<T: Aggregate>(&mut self, name: impl Into<String>) -> Field<Sequence<T>> {
        self.add(Sequence::new(name))
    }

    pub fn add_array<T: Aggregate, const N: usize>(&mut self, name: impl Into<String>) -> Field<Array<T, N>> {
        self.add(Array::new(name))
    }

    /// Drop the named child. Returns whether one was registered.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.names.remove(name) {
            Some(index) => {
                self.children.remove(index);
                self.order.retain(|i| *i != index);
                true
            }
            None => false,
        }
    }

    pub fn node<N: Node>(&self, field: &Field<N>) -> DomainResult<&N> {
        let child = self
            .children
            .get(field.index)
            .ok_or_else(|| DomainError::FieldNotFound(field.label()))?;
        downcast::<N>(child.as_ref())
    }

    pub fn node_mut<N: Node>(&mut self, field: &Field<N>) -> DomainResult<&mut N> {
        let child = self
            .children
            .get_mut(field.index)
            .ok_or_else(|| DomainError::FieldNotFound(field.label()))?;
        downcast_mut::<N>(child.as_mut())
    }

    pub fn value<N: Property>(&self, field: &Field<N>) -> DomainResult<&N::Value> {
        Ok(self.node(field)?.value())
    }

    pub fn value_mut<N: Property>(&mut self, field: &Field<N>) -> DomainResult<&mut N::Value> {
        Ok(self.node_mut(field)?.value_mut())
    }

    pub fn set<N: Property>(&mut self, field: &Field<N>, value: N::Value) -> DomainResult<()> {
        *self.value_mut(field)? = value;
        Ok(())
    }

    pub fn get_dyn(&self, name: &str) -> Option<&dyn Node> {
        let index = self.names.get(name)?;
        self.children.get(*index).map(|child| child.as_ref())
    }

    pub fn get_dyn_mut(&mut self, name: &str) -> Option<&mut dyn Node> {
        let index = self.names.get(name)?;
        self.children.get_mut(*index).map(|child| child.as_mut())
    }

    fn anonymous_indices(&self) -> Vec<Index> {
        self.order
            .iter()
            .copied()
            .filter(|index| {
                self.children
                    .get(*index)
                    .is_some_and(|child| child.name().is_none())
            })
            .collect()
    }

    /// Partial merge: named children present on both sides take the other
    /// side's values, anonymous children pair up by position.
    #[instrument(level = "trace", skip_all, fields(registry = ?self.name))]
    pub fn assign_from(&mut self, other: &Registry) -> DomainResult<()> {
        let mut anonymous = self.anonymous_indices().into_iter();
        for index in &other.order {
            let Some(source) = other.children.get(*index) else {
                continue;
            };
            let target = match source.name() {
                Some(name) => self.names.get(name).copied(),
                None => anonymous.next(),
            };
            if let Some(child) = target.and_then(|target| self.children.get_mut(target)) {
                child.assign(source.as_ref())?;
            }
        }
        Ok(())
    }
}

impl Node for Registry {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn clone_node(&self) -> Box<dyn Node> {
        Box::new(self.clone())
    }

    fn assign(&mut self, other: &dyn Node) -> DomainResult<()> {
        let source = other.as_registry().ok_or(DomainError::TypeMismatch {
            expected: "registry",
            found: other.kind(),
        })?;
        self.assign_from(source)
    }

    #[instrument(level = "trace", skip_all, fields(registry = ?self.name))]
    fn load(&mut self, doc: &Document) -> DomainResult<()> {
        let Value::Object(map) = doc else {
            return Err(DomainError::shape(self.name(), "object", doc));
        };
        for (key, value) in map {
            match self.names.get(key) {
                Some(index) => {
                    if let Some(child) = self.children.get_mut(*index) {
                        child.load(value)?;
                    }
                }
                None => trace!(key = key.as_str(), "ignoring unknown key"),
            }
        }
        for index in self.anonymous_indices() {
            if let Some(child) = self.children.get_mut(index) {
                child.load(doc)?;
            }
        }
        Ok(())
    }

    fn save_contents(&self) -> DomainResult<Document> {
        let mut merged = Value::Object(Map::new());
        for child in self.iter() {
            merge(&mut merged, &child.save()?);
        }
        Ok(merged)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_registry(&self) -> Option<&Registry> {
        Some(self)
    }

    fn as_registry_mut(&mut self) -> Option<&mut Registry> {
        Some(self)
    }
}

impl Property for Registry {
    type Value = Registry;

    fn value(&self) -> &Registry {
        self
    }

    fn value_mut(&mut self) -> &mut Registry {
        self
    }
}
