//! Error types for prot-registry crate.

use thiserror::Error;

use crate::registry::Category;

/// Errors raised when registering or resolving components.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The `(name, category)` pair is already registered.
    #[error("component '{name}' is already registered as a {category}")]
    Duplicate {
        /// Component name.
        name: String,
        /// Component category.
        category: Category,
    },

    /// No component is registered under the `(name, category)` pair.
    #[error("no {category} registered under '{name}'")]
    Unknown {
        /// Component name.
        name: String,
        /// Component category.
        category: Category,
    },
}

impl RegistryError {
    /// Creates a duplicate registration error.
    #[must_use]
    pub fn duplicate(name: impl Into<String>, category: Category) -> Self {
        Self::Duplicate {
            name: name.into(),
            category,
        }
    }

    /// Creates an unknown component error.
    #[must_use]
    pub fn unknown(name: impl Into<String>, category: Category) -> Self {
        Self::Unknown {
            name: name.into(),
            category,
        }
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
