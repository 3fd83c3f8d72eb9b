//! Sinks consume the entities produced by a `select` traversal

use std::fmt;

use crate::entity::{Field, FieldRef};
use crate::value::Value;

/// A consumer of entities produced during a `select`.
///
/// Collections call `put` once per matching entity, in result order, then
/// `eof` once the traversal is complete.
pub trait Sink<E>: Send {
    fn put(&mut self, entity: E);

    /// Called after the last entity
    fn eof(&mut self) {}
}

/// Collects whole entities into a `Vec`.
#[derive(Clone, Debug)]
pub struct ArraySink<E> {
    items: Vec<E>,
}

impl<E> ArraySink<E> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<E> {
        self.items
    }
}

impl<E> Default for ArraySink<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Send> Sink<E> for ArraySink<E> {
    fn put(&mut self, entity: E) {
        self.items.push(entity);
    }
}

/// Projects one field of every entity into an ordered sequence of values,
/// keeping result order and duplicates.
pub struct ProjectionSink<E> {
    field: FieldRef<E>,
    values: Vec<Value>,
}

impl<E: 'static> ProjectionSink<E> {
    pub fn new<V: Into<Value> + 'static>(field: Field<E, V>) -> Self {
        Self {
            field: field.into(),
            values: Vec::new(),
        }
    }
}

impl<E> ProjectionSink<E> {
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl<E> Sink<E> for ProjectionSink<E> {
    fn put(&mut self, entity: E) {
        self.values.push(self.field.read(&entity));
    }
}

impl<E> fmt::Debug for ProjectionSink<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectionSink")
            .field("field", &self.field)
            .field("values", &self.values)
            .finish()
    }
}

/// Counts entities without retaining them.
#[derive(Clone, Copy, Debug, Default)]
pub struct CountSink {
    count: usize,
}

impl CountSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl<E> Sink<E> for CountSink {
    fn put(&mut self, _: E) {
        self.count += 1;
    }
}
