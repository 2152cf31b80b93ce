//! Arena of named schemas for recursive and mutually recursive definitions.
//!
//! A slot is declared first, referenced from other schemas through a lazy
//! handle, and defined later. References hold a `Weak` pointer back to the
//! arena so a schema that refers to itself never forms an `Arc` cycle.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::warn;

use crate::schema::modifiers::LazyDef;
use crate::schema::{Kind, Schema};

/// Handle of a registry slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaId(usize);

impl SchemaId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Default)]
pub(crate) struct RegistryInner {
    slots: RwLock<Vec<Option<Schema>>>,
    names: RwLock<HashMap<String, SchemaId>>,
}

impl RegistryInner {
    pub(crate) fn get(&self, id: SchemaId) -> Option<Schema> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.get(id.0).cloned().flatten()
    }
}

/// A registry of schemas addressed by [`SchemaId`] or by name.
///
/// # Example
/// ```rust
/// use zod_runtime::prelude::*;
/// use zod_runtime::SchemaRegistry;
///
/// let registry = SchemaRegistry::new();
/// let category = registry.declare("Category");
/// registry.define(
///     category,
///     z::object()
///         .field("name", z::string())
///         .field("children", registry.reference(category).array()),
/// );
///
/// let tree = registry.reference(category);
/// assert!(tree.is(serde_json::json!({
///     "name": "root",
///     "children": [{"name": "leaf", "children": []}]
/// })));
/// ```
#[derive(Clone, Default)]
pub struct SchemaRegistry {
    inner: Arc<RegistryInner>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a slot for `name`, returning the existing one if the name is
    /// already declared.
    pub fn declare(&self, name: impl Into<String>) -> SchemaId {
        let name = name.into();
        let mut names = self.inner.names.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(id) = names.get(&name) {
            return *id;
        }
        let mut slots = self.inner.slots.write().unwrap_or_else(PoisonError::into_inner);
        let id = SchemaId(slots.len());
        slots.push(None);
        names.insert(name, id);
        id
    }

    /// Fill a declared slot. Redefining a slot replaces its schema.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by another registry.
    pub fn define(&self, id: SchemaId, schema: impl Into<Schema>) {
        let mut slots = self.inner.slots.write().unwrap_or_else(PoisonError::into_inner);
        let Some(slot) = slots.get_mut(id.0) else {
            panic!("schema {id} does not belong to this registry");
        };
        if slot.is_some() {
            warn!(id = %id, "redefining registered schema");
        }
        *slot = Some(schema.into());
    }

    /// Declare and define in one step.
    pub fn register(&self, name: impl Into<String>, schema: impl Into<Schema>) -> SchemaId {
        let id = self.declare(name);
        self.define(id, schema);
        id
    }

    /// Lazy schema that resolves `id` when it is parsed.
    ///
    /// Parsing the reference panics if the registry has been dropped or the
    /// slot is still undefined.
    pub fn reference(&self, id: SchemaId) -> Schema {
        Schema::from_kind(Kind::Lazy(LazyDef::registry(Arc::downgrade(&self.inner), id)))
    }

    pub fn get(&self, id: SchemaId) -> Option<Schema> {
        self.inner.get(id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<Schema> {
        self.id_of(name).and_then(|id| self.get(id))
    }

    pub fn id_of(&self, name: &str) -> Option<SchemaId> {
        let names = self.inner.names.read().unwrap_or_else(PoisonError::into_inner);
        names.get(name).copied()
    }

    /// Number of declared slots.
    pub fn len(&self) -> usize {
        self.inner.slots.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::string::string;

    #[test]
    fn test_declare_is_idempotent_per_name() {
        let registry = SchemaRegistry::new();
        let a = registry.declare("A");
        let b = registry.declare("B");
        assert_ne!(a, b);
        assert_eq!(registry.declare("A"), a);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_define_and_lookup() {
        let registry = SchemaRegistry::new();
        let id = registry.register("Name", string());
        assert!(registry.get(id).is_some());
        assert!(registry.get_by_name("Name").is_some());
        assert!(registry.get_by_name("Missing").is_none());
        assert_eq!(registry.id_of("Name"), Some(id));
    }

    #[test]
    fn test_undefined_slot_is_empty() {
        let registry = SchemaRegistry::new();
        let id = registry.declare("Later");
        assert!(registry.get(id).is_none());
    }
}
