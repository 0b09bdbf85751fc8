//! propreg: registry-based persistence of nested structs as JSON documents.
//!
//! Layers:
//! - [`domain`]: the node model (scalars, registries, collections, aggregates)
//! - [`application`]: persistence use cases on top of the node model
//! - [`infrastructure`]: document files, filesystem seam, service wiring
//! - [`config`]: layered settings

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
mod macros;
pub mod util;

pub use application::services::PersistenceService;
pub use application::{ApplicationError, ApplicationResult};
pub use config::Settings;
pub use domain::{
    Aggregate, Array, Document, DomainError, DomainResult, Field, Node, Property, Registry, Scalar,
    Sequence,
};
pub use infrastructure::di::ServiceContainer;
