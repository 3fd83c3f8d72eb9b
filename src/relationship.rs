//! Many-to-many relationship descriptors
//!
//! A [`Relationship`] describes one association between a source entity
//! type `S` and a target entity type `T`, stored as junction records `J`.
//! It is built once per relationship type and never changes afterwards.

use std::fmt;
use std::sync::Arc;

use crate::collection::Collection;
use crate::entity::{Entity, Field};
use crate::many_to_many::ManyToManyDao;
use crate::predicate::Predicate;

type AdaptTarget<S, T, J> = Arc<dyn Fn(&S, &T) -> J + Send + Sync>;

/// Static metadata for one many-to-many association.
///
/// - `inverse`: the junction field holding the source id
/// - `junction_target`: the junction field holding the target id
/// - `target_property`: the target field that `junction_target` refers to,
///   the target's id unless overridden
/// - `adapt_target`: builds the junction record linking a source and a target
pub struct Relationship<S: Entity, T: Entity, J: Entity> {
    name: String,
    inverse: Field<J, S::Id>,
    junction_target: Field<J, T::Id>,
    target_property: Field<T, T::Id>,
    adapt_target: AdaptTarget<S, T, J>,
}

impl<S: Entity, T: Entity, J: Entity> Relationship<S, T, J> {
    pub fn new<F>(
        name: impl Into<String>,
        inverse: Field<J, S::Id>,
        junction_target: Field<J, T::Id>,
        adapt_target: F,
    ) -> Self
    where
        F: Fn(&S, &T) -> J + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            inverse,
            junction_target,
            target_property: Field::id(),
            adapt_target: Arc::new(adapt_target),
        }
    }

    /// Match junction targets against a target field other than its id
    pub fn with_target_property(mut self, field: Field<T, T::Id>) -> Self {
        self.target_property = field;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inverse(&self) -> Field<J, S::Id> {
        self.inverse
    }

    pub fn junction_target(&self) -> Field<J, T::Id> {
        self.junction_target
    }

    pub fn target_property(&self) -> Field<T, T::Id> {
        self.target_property
    }

    /// Build the junction record linking `source` to `target`
    pub fn adapt_target(&self, source: &S, target: &T) -> J {
        (self.adapt_target)(source, target)
    }

    /// Junction records belonging to `source`.
    ///
    /// Always filters on the inverse field, whichever side of the
    /// relationship the caller sees as its own.
    pub fn base_predicate(&self, source: &S) -> Predicate<J> {
        Predicate::equals(self.inverse, source.id())
    }

    /// Expose the targets related to `source` as a collection
    pub fn dao_for(
        &self,
        source: S,
        junctions: Arc<dyn Collection<J>>,
        targets: Arc<dyn Collection<T>>,
    ) -> ManyToManyDao<S, T, J> {
        ManyToManyDao::new(self.clone(), source, junctions, targets)
    }
}

impl<S: Entity, T: Entity, J: Entity> Clone for Relationship<S, T, J> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            inverse: self.inverse,
            junction_target: self.junction_target,
            target_property: self.target_property,
            adapt_target: Arc::clone(&self.adapt_target),
        }
    }
}

impl<S: Entity, T: Entity, J: Entity> fmt::Debug for Relationship<S, T, J> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relationship")
            .field("name", &self.name)
            .field("inverse", &self.inverse.name())
            .field("junction_target", &self.junction_target.name())
            .field("target_property", &self.target_property.name())
            .finish()
    }
}
