//! Many-to-many relationship adapter
//!
//! [`ManyToManyDao`] presents the targets related to one source entity as a
//! single [`Collection`]. The junction collection (the adapter's delegate)
//! and the target collection are both touched, but callers never see
//! junction records.
//!
//! ## Operations
//!
//! - `put(target)`: upsert the target into the target collection, then
//!   upsert a junction linking it to the source. The two writes are not
//!   atomic. If the junction write fails the target stays stored but
//!   unlinked, and the error is returned as is.
//! - `find(id)`: plain lookup in the target collection. It does **not**
//!   check that `id` is linked to the source; use
//!   [`is_linked`](ManyToManyDao::is_linked) for that.
//! - `select(sink, query)`: two-phase join. Phase 1 projects the target ids
//!   of every junction belonging to the source, ignoring the caller's
//!   paging and order. Phase 2 selects from the target collection with
//!   `AND(caller predicate or TRUE, IN(target_property, ids))`, applying
//!   the caller's sink, skip, limit and order.
//!
//! Each step starts only after the previous one completed. Nothing is held
//! across the awaits, so concurrent writers may interleave between phases.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::collection::Collection;
use crate::config::Settings;
use crate::entity::Entity;
use crate::predicate::Predicate;
use crate::query::Select;
use crate::registry::CollectionRegistry;
use crate::relationship::Relationship;
use crate::sink::{CountSink, ProjectionSink, Sink};
use crate::value::Value;

/// Where the target collection comes from.
enum TargetCollection<T: Entity> {
    /// Handed in at construction
    Bound(Arc<dyn Collection<T>>),
    /// Resolved from a registry on first use, then cached
    Registry {
        registry: Arc<CollectionRegistry>,
        key: String,
        resolved: OnceCell<Arc<dyn Collection<T>>>,
    },
}

impl<T: Entity> TargetCollection<T> {
    async fn get(&self) -> Result<&Arc<dyn Collection<T>>> {
        match self {
            TargetCollection::Bound(collection) => Ok(collection),
            TargetCollection::Registry {
                registry,
                key,
                resolved,
            } => {
                let collection = resolved
                    .get_or_try_init(|| async {
                        tracing::debug!(key = %key, "Resolving target collection");
                        registry.resolve::<T>(key)
                    })
                    .await?;
                Ok(collection)
            }
        }
    }
}

/// The targets related to one source entity, as a collection.
pub struct ManyToManyDao<S: Entity, T: Entity, J: Entity> {
    relationship: Relationship<S, T, J>,
    source: S,
    junctions: Arc<dyn Collection<J>>,
    targets: TargetCollection<T>,
}

impl<S: Entity, T: Entity, J: Entity> ManyToManyDao<S, T, J> {
    pub fn new(
        relationship: Relationship<S, T, J>,
        source: S,
        junctions: Arc<dyn Collection<J>>,
        targets: Arc<dyn Collection<T>>,
    ) -> Self {
        Self {
            relationship,
            source,
            junctions,
            targets: TargetCollection::Bound(targets),
        }
    }

    /// Build from registry keys.
    ///
    /// The junction collection is resolved immediately. The target
    /// collection is resolved on first use and cached for the adapter's
    /// lifetime, so a missing target key surfaces from the first operation
    /// rather than from here.
    pub fn from_registry(
        relationship: Relationship<S, T, J>,
        source: S,
        registry: Arc<CollectionRegistry>,
        junction_key: &str,
        target_key: impl Into<String>,
    ) -> Result<Self> {
        let junctions = registry.resolve::<J>(junction_key)?;
        Ok(Self {
            relationship,
            source,
            junctions,
            targets: TargetCollection::Registry {
                registry,
                key: target_key.into(),
                resolved: OnceCell::new(),
            },
        })
    }

    /// Build from registry keys looked up in `settings` by relationship name
    pub fn from_settings(
        relationship: Relationship<S, T, J>,
        source: S,
        registry: Arc<CollectionRegistry>,
        settings: &Settings,
    ) -> Result<Self> {
        let keys = settings.relationship(relationship.name())?.clone();
        Self::from_registry(relationship, source, registry, &keys.junction_key, keys.target_key)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn relationship(&self) -> &Relationship<S, T, J> {
        &self.relationship
    }

    /// `EQ(inverse, source.id)`: the junctions belonging to this source
    pub fn base_predicate(&self) -> Predicate<J> {
        self.relationship.base_predicate(&self.source)
    }

    /// Target ids of every junction belonging to this source, in the
    /// junction collection's natural order. Duplicate links yield
    /// duplicate ids.
    pub async fn target_ids(&self) -> Result<Vec<Value>> {
        let mut projection = ProjectionSink::new(self.relationship.junction_target());
        let query = Select::all().filter(self.base_predicate());
        self.junctions.select(&mut projection, &query).await?;
        Ok(projection.into_values())
    }

    /// Whether a junction links this source to `id`
    pub async fn is_linked(&self, id: &T::Id) -> Result<bool> {
        let predicate = self
            .base_predicate()
            .and_also(Predicate::equals(self.relationship.junction_target(), id.clone()));
        let mut count = CountSink::new();
        let query = Select::all().filter(predicate).limit(1);
        self.junctions.select(&mut count, &query).await?;
        Ok(count.count() > 0)
    }
}

#[async_trait]
impl<S: Entity, T: Entity, J: Entity> Collection<T> for ManyToManyDao<S, T, J> {
    async fn put(&self, target: T) -> Result<T> {
        let target = self.targets.get().await?.put(target).await?;

        let junction = self.relationship.adapt_target(&self.source, &target);
        if let Err(e) = self.junctions.put(junction).await {
            tracing::warn!(
                relationship = %self.relationship.name(),
                source = ?self.source.id(),
                target = ?target.id(),
                "Junction write failed, target stored without link: {}",
                e
            );
            return Err(e);
        }

        tracing::debug!(
            relationship = %self.relationship.name(),
            source = ?self.source.id(),
            target = ?target.id(),
            "Linked target"
        );
        Ok(target)
    }

    async fn find(&self, id: &T::Id) -> Result<Option<T>> {
        self.targets.get().await?.find(id).await
    }

    async fn select(&self, sink: &mut dyn Sink<T>, query: &Select<T>) -> Result<()> {
        let ids = self.target_ids().await?;
        tracing::debug!(
            relationship = %self.relationship.name(),
            source = ?self.source.id(),
            candidates = ids.len(),
            "Collected junction targets"
        );

        let membership = Predicate::in_values(self.relationship.target_property(), ids);
        let predicate = Predicate::and(
            query.predicate().cloned().unwrap_or_else(Predicate::truth),
            membership,
        );
        let scoped = query.clone().filter(predicate);

        self.targets.get().await?.select(sink, &scoped).await
    }
}
