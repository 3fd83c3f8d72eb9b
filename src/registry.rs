use std::any::{type_name, Any};
use std::collections::HashMap;
use std::sync::Arc;

use crate::collection::Collection;
use crate::entity::Entity;
use crate::error::DaoError;

/// Registry of collections keyed by name.
///
/// Each entry holds an `Arc<dyn Collection<E>>` for some entity type `E`;
/// [`resolve`](Self::resolve) checks the type when the entry is looked up.
#[derive(Default)]
pub struct CollectionRegistry {
    collections: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl CollectionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            collections: HashMap::new(),
        }
    }

    /// Register a collection under `key`, replacing any previous entry
    pub fn register<E: Entity>(
        &mut self,
        key: impl Into<String>,
        collection: Arc<dyn Collection<E>>,
    ) {
        self.collections.insert(key.into(), Box::new(collection));
    }

    /// Look up the collection registered under `key`
    pub fn resolve<E: Entity>(&self, key: &str) -> Result<Arc<dyn Collection<E>>, DaoError> {
        let entry = self
            .collections
            .get(key)
            .ok_or_else(|| DaoError::UnknownCollection(key.to_string()))?;

        entry
            .downcast_ref::<Arc<dyn Collection<E>>>()
            .cloned()
            .ok_or_else(|| DaoError::CollectionType {
                key: key.to_string(),
                expected: type_name::<E>(),
            })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.collections.contains_key(key)
    }

    /// Get list of all registered keys
    pub fn keys(&self) -> Vec<&str> {
        self.collections.keys().map(|s| s.as_str()).collect()
    }
}
