//! Leaf node wrapping a single value.

use std::any::Any;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::trace;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{downcast, require_name, Document, Node, Property};

/// Values a [`Scalar`] can hold: anything serde can move in and out of a document.
pub trait ScalarValue: Serialize + DeserializeOwned + Clone + PartialEq + fmt::Debug + 'static {}

impl<T> ScalarValue for T where T: Serialize + DeserializeOwned + Clone + PartialEq + fmt::Debug + 'static {}

/// Named leaf value.
#[derive(Debug, Clone)]
pub struct Scalar<T: ScalarValue> {
    name: Option<String>,
    value: T,
}

impl<T: ScalarValue> Scalar<T> {
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }

    pub fn with_default(name: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self::new(name, T::default())
    }

    /// Scalar without a key. It saves as the bare value and refuses to load.
    pub fn unnamed(value: T) -> Self {
        Self { name: None, value }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Equality compares values only; names are ignored.
impl<T: ScalarValue> PartialEq for Scalar<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: ScalarValue> Node for Scalar<T> {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn clone_node(&self) -> Box<dyn Node> {
        Box::new(self.clone())
    }

    fn assign(&mut self, other: &dyn Node) -> DomainResult<()> {
        self.value = downcast::<Self>(other)?.value.clone();
        Ok(())
    }

    fn load(&mut self, doc: &Document) -> DomainResult<()> {
        let name = require_name(self.name(), "scalar")?;
        trace!(name, "load scalar");
        let value = serde_json::from_value::<T>(doc.clone())
            .map_err(|e| DomainError::conversion(Some(name), e))?;
        self.value = value;
        Ok(())
    }

    fn save_contents(&self) -> DomainResult<Document> {
        serde_json::to_value(&self.value).map_err(|e| DomainError::conversion(self.name(), e))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<T: ScalarValue> Property for Scalar<T> {
    type Value = T;

    fn value(&self) -> &T {
        &self.value
    }

    fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }
}
