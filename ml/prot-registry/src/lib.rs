//! Component registry for prot-class.
//!
//! Models and datasets are selected by name from configuration. This crate
//! provides the lookup table that maps a `(name, category)` pair to the
//! constructor that builds the component.
//!
//! # Registry
//!
//! - [`Registry`] - Mapping from `(name, category)` to a constructor
//! - [`Category`] - Kind of component a name refers to
//! - [`ComponentKey`] - The `(name, category)` pair itself
//!
//! # Lifecycle
//!
//! Registration happens once during start-up, before the first
//! [`Registry::resolve`]. After that the registry is only read, so it can be
//! shared behind a plain reference or an `Arc` without locking.
//!
//! # Example
//!
//! ```
//! use prot_registry::{Category, Registry};
//!
//! fn double(x: u32) -> u32 {
//!     x * 2
//! }
//!
//! let mut registry: Registry<fn(u32) -> u32> = Registry::new();
//! registry.register("double", Category::Model, double).unwrap();
//!
//! let ctor = registry.resolve("double", Category::Model).unwrap();
//! assert_eq!(ctor(21), 42);
//! ```
//!
//! # Quality Standards
//!
//! - Zero clippy/doc warnings
//! - Zero `unwrap`/`expect` in library code

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod registry;

// Re-export registry types
pub use registry::{Category, ComponentKey, Registry};

// Re-export error types
pub use error::{RegistryError, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{Category, ComponentKey, Registry, RegistryError};
}
