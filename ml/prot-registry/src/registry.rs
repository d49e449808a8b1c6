//! `(name, category)` keyed constructor table.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RegistryError, Result};

/// Kind of component a registered name refers to.
///
/// Names only need to be unique within a category, so `"classifier"` can
/// name both a model and, say, a dataset.
///
/// # Example
///
/// ```
/// use prot_registry::Category;
///
/// assert_eq!(Category::Model.name(), "model");
/// assert_eq!(Category::Dataset.to_string(), "dataset");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Neural network components (encoders, heads, full classifiers).
    Model,
    /// Dataset tasks.
    Dataset,
}

impl Category {
    /// Returns the category name as a string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Dataset => "dataset",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A `(name, category)` pair identifying one registered component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentKey {
    /// Component name as used in configuration.
    pub name: String,
    /// Component category.
    pub category: Category,
}

impl ComponentKey {
    /// Creates a new key.
    #[must_use]
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
        }
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category, self.name)
    }
}

/// Lookup table from `(name, category)` to a constructor.
///
/// `F` is whatever the caller uses as a constructor: usually a function
/// pointer or a small `Copy` wrapper around one.
///
/// Populate it with [`register`](Self::register) during start-up, then share
/// it read-only. Registering a pair twice is an error rather than an
/// overwrite, so two components can never silently shadow each other.
///
/// # Example
///
/// ```
/// use prot_registry::{Category, Registry, RegistryError};
///
/// let mut registry: Registry<fn() -> &'static str> = Registry::new();
/// registry.register("hello", Category::Model, || "hi").unwrap();
///
/// let again = registry.register("hello", Category::Model, || "hey");
/// assert!(matches!(again, Err(RegistryError::Duplicate { .. })));
///
/// let missing = registry.resolve("bye", Category::Model);
/// assert!(matches!(missing, Err(RegistryError::Unknown { .. })));
/// ```
#[derive(Debug, Clone)]
pub struct Registry<F> {
    entries: HashMap<ComponentKey, F>,
}

impl<F> Default for Registry<F> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<F> Registry<F> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `constructor` under `(name, category)`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the pair is already taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        category: Category,
        constructor: F,
    ) -> Result<()> {
        let key = ComponentKey::new(name, category);
        if self.entries.contains_key(&key) {
            return Err(RegistryError::duplicate(key.name, category));
        }
        debug!("Registered {}", key);
        self.entries.insert(key, constructor);
        Ok(())
    }

    /// Returns the constructor registered under `(name, category)`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unknown`] if nothing is registered there.
    pub fn resolve(&self, name: &str, category: Category) -> Result<&F> {
        self.entries
            .get(&ComponentKey::new(name, category))
            .ok_or_else(|| RegistryError::unknown(name, category))
    }

    /// Returns `true` if `(name, category)` is registered.
    #[must_use]
    pub fn contains(&self, name: &str, category: Category) -> bool {
        self.entries.contains_key(&ComponentKey::new(name, category))
    }

    /// Returns the sorted names registered in `category`.
    #[must_use]
    pub fn names(&self, category: Category) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .entries
            .keys()
            .filter(|key| key.category == category)
            .map(|key| key.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one() -> u8 {
        1
    }

    fn two() -> u8 {
        2
    }

    #[test]
    fn register_and_resolve() {
        let mut registry: Registry<fn() -> u8> = Registry::new();
        assert!(registry.register("one", Category::Model, one).is_ok());

        let ctor = registry.resolve("one", Category::Model);
        assert!(ctor.is_ok());
        assert_eq!(ctor.map(|f| f()).unwrap_or_default(), 1);
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry: Registry<fn() -> u8> = Registry::new();
        assert!(registry.register("one", Category::Model, one).is_ok());

        let err = registry.register("one", Category::Model, two);
        assert_eq!(
            err,
            Err(RegistryError::duplicate("one", Category::Model))
        );

        // The first registration is kept.
        assert_eq!(
            registry
                .resolve("one", Category::Model)
                .map(|f| f())
                .unwrap_or_default(),
            1
        );
    }

    #[test]
    fn same_name_in_other_category_is_allowed() {
        let mut registry: Registry<fn() -> u8> = Registry::new();
        assert!(registry.register("shared", Category::Model, one).is_ok());
        assert!(registry.register("shared", Category::Dataset, two).is_ok());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn unknown_component_fails() {
        let registry: Registry<fn() -> u8> = Registry::new();
        let err = registry.resolve("missing", Category::Dataset);
        assert_eq!(
            err.err(),
            Some(RegistryError::unknown("missing", Category::Dataset))
        );
    }

    #[test]
    fn names_are_sorted_per_category() {
        let mut registry: Registry<fn() -> u8> = Registry::new();
        let _ = registry.register("mlp_classifier", Category::Model, one);
        let _ = registry.register("classifier", Category::Model, two);
        let _ = registry.register("proteins", Category::Dataset, one);

        assert_eq!(
            registry.names(Category::Model),
            vec!["classifier", "mlp_classifier"]
        );
        assert_eq!(registry.names(Category::Dataset), vec!["proteins"]);
        assert!(registry.contains("classifier", Category::Model));
        assert!(!registry.contains("classifier", Category::Dataset));
    }

    #[test]
    fn empty_registry() {
        let registry: Registry<fn() -> u8> = Registry::default();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn category_serialization() {
        let json = serde_json::to_string(&Category::Model).unwrap_or_default();
        assert_eq!(json, "\"model\"");

        let parsed: std::result::Result<Category, _> = serde_json::from_str("\"dataset\"");
        assert_eq!(parsed.ok(), Some(Category::Dataset));
    }

    #[test]
    fn component_key_display() {
        let key = ComponentKey::new("identity", Category::Model);
        assert_eq!(key.to_string(), "model:identity");
    }
}
