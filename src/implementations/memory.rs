//! In-memory Collection implementation

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::collection::Collection;
use crate::entity::Entity;
use crate::error::DaoError;
use crate::query::Select;
use crate::sink::Sink;

type Validator<E> = Box<dyn Fn(&E) -> Result<(), String> + Send + Sync>;

/// In-memory collection keyed by entity id.
///
/// The natural result order is ascending id order. `put` upserts.
pub struct MemoryCollection<E: Entity> {
    name: String,
    entries: Mutex<BTreeMap<E::Id, E>>,
    validator: Option<Validator<E>>,
}

impl<E: Entity> MemoryCollection<E> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Mutex::new(BTreeMap::new()),
            validator: None,
        }
    }

    /// Reject writes for which `validator` returns an error.
    ///
    /// Rejected writes fail with [`DaoError::Rejected`] and leave the
    /// collection unchanged.
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&E) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Box::new(validator));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.entries()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.entries()?.is_empty())
    }

    fn entries(&self) -> Result<MutexGuard<'_, BTreeMap<E::Id, E>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow!("collection '{}' lock poisoned", self.name))
    }
}

#[async_trait]
impl<E: Entity> Collection<E> for MemoryCollection<E> {
    async fn put(&self, entity: E) -> Result<E> {
        if let Some(validator) = &self.validator {
            validator(&entity).map_err(|reason| DaoError::Rejected {
                collection: self.name.clone(),
                reason,
            })?;
        }
        tracing::trace!(collection = %self.name, id = ?entity.id(), "put");
        self.entries()?.insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn find(&self, id: &E::Id) -> Result<Option<E>> {
        Ok(self.entries()?.get(id).cloned())
    }

    async fn select(&self, sink: &mut dyn Sink<E>, query: &Select<E>) -> Result<()> {
        let mut matched: Vec<E> = {
            let entries = self.entries()?;
            entries
                .values()
                .filter(|e| query.predicate().map_or(true, |p| p.matches(e)))
                .cloned()
                .collect()
        };
        if let Some(order) = query.order() {
            matched.sort_by(|a, b| order.compare(a, b));
        }
        let page = query.page(matched);
        tracing::trace!(collection = %self.name, count = page.len(), "select");

        for entity in page {
            sink.put(entity);
        }
        sink.eof();
        Ok(())
    }
}
