//! The collection (DAO) contract
//!
//! Every store of entities, and every adapter that presents itself as one,
//! implements [`Collection`]. Implementations live in `implementations/`;
//! the many-to-many adapter is in [`crate::many_to_many`].

use anyhow::Result;
use async_trait::async_trait;

use crate::entity::Entity;
use crate::query::Select;
use crate::sink::{ArraySink, Sink};

/// An asynchronous collection of entities of type `E`.
///
/// Failed operations must leave the collection's state uncorrupted; errors
/// are reported through the returned `Result`.
#[async_trait]
pub trait Collection<E: Entity>: Send + Sync {
    /// Insert or replace an entity, returning it as stored
    async fn put(&self, entity: E) -> Result<E>;

    /// Look up an entity by id; `Ok(None)` when absent
    async fn find(&self, id: &E::Id) -> Result<Option<E>>;

    /// Feed the entities matching `query` into `sink`, in result order
    async fn select(&self, sink: &mut dyn Sink<E>, query: &Select<E>) -> Result<()>;
}

/// Convenience wrappers over [`Collection::select`].
#[async_trait]
pub trait CollectionExt<E: Entity>: Collection<E> {
    /// Select into an owned sink and hand it back populated
    async fn select_into<S>(&self, mut sink: S, query: &Select<E>) -> Result<S>
    where
        S: Sink<E> + 'static,
    {
        self.select(&mut sink, query).await?;
        Ok(sink)
    }

    /// Select into a `Vec`
    async fn select_all(&self, query: &Select<E>) -> Result<Vec<E>> {
        let sink = self.select_into(ArraySink::new(), query).await?;
        Ok(sink.into_vec())
    }
}

impl<E: Entity, C: Collection<E> + ?Sized> CollectionExt<E> for C {}
