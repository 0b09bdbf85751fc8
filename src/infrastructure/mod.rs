//! Infrastructure layer: document files, I/O boundary traits and DI container
//!
//! This layer implements I/O boundary traits and wires up services.

pub mod di;
pub mod document;
pub mod error;
pub mod traits;

pub use document::WriteOptions;
pub use error::{InfraError, InfraResult};
pub use traits::{FileSystem, RealFileSystem};
