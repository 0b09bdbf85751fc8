//! Domain layer: the property-node model
//!
//! This layer is independent of external concerns (no I/O, no config loading).

pub mod aggregate;
pub mod collection;
pub mod document;
pub mod error;
pub mod node;
pub mod registry;
pub mod scalar;

pub use aggregate::Aggregate;
pub use collection::{Array, Sequence};
pub use error::{DomainError, DomainResult};
pub use node::{downcast, downcast_mut, Document, Node, Property};
pub use registry::{Field, Registry};
pub use scalar::{Scalar, ScalarValue};
