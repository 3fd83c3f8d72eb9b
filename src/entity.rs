//! Entities and strongly typed field references

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::value::Value;

/// An entity stored in a [`Collection`](crate::Collection).
///
/// Entities are identified by an opaque, comparable id. Collections key
/// their storage by it and order by it when no explicit order is given.
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Clone + Ord + fmt::Debug + Into<Value> + Send + Sync + 'static;

    /// Name reported for the id field in predicates and logs
    const ID_FIELD: &'static str = "id";

    fn id(&self) -> Self::Id;
}

/// A typed reference to one field of `E` holding values of type `V`.
///
/// Fields are declared once, usually as associated constants on the
/// entity type, and passed to predicate and order constructors. The value
/// type parameter means `Predicate::equals(User::NAME, 3)` does not compile
/// when `NAME` holds a `String`.
pub struct Field<E, V> {
    name: &'static str,
    get: fn(&E) -> V,
}

impl<E, V> Field<E, V> {
    pub const fn new(name: &'static str, get: fn(&E) -> V) -> Self {
        Self { name, get }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Read the field from an entity
    pub fn get(&self, entity: &E) -> V {
        (self.get)(entity)
    }
}

impl<E, V: Into<Value>> Field<E, V> {
    /// Read the field from an entity as a dynamic [`Value`]
    pub fn value(&self, entity: &E) -> Value {
        self.get(entity).into()
    }
}

impl<E: Entity> Field<E, E::Id> {
    /// The entity's own id field
    pub fn id() -> Self {
        Self::new(E::ID_FIELD, |entity: &E| entity.id())
    }
}

impl<E, V> Clone for Field<E, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, V> Copy for Field<E, V> {}

impl<E, V> fmt::Debug for Field<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.name).finish()
    }
}

/// A field reference with its value type erased to [`Value`].
///
/// This is what predicates, orderings and projection sinks hold internally;
/// build one from a [`Field`] with `From`.
pub struct FieldRef<E> {
    name: &'static str,
    read: Arc<dyn Fn(&E) -> Value + Send + Sync>,
    _entity: PhantomData<fn(&E)>,
}

impl<E> FieldRef<E> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn read(&self, entity: &E) -> Value {
        (self.read)(entity)
    }
}

impl<E, V> From<Field<E, V>> for FieldRef<E>
where
    E: 'static,
    V: Into<Value> + 'static,
{
    fn from(field: Field<E, V>) -> Self {
        let get = field.get;
        Self {
            name: field.name,
            read: Arc::new(move |entity: &E| get(entity).into()),
            _entity: PhantomData,
        }
    }
}

impl<E> Clone for FieldRef<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            read: Arc::clone(&self.read),
            _entity: PhantomData,
        }
    }
}

impl<E> fmt::Debug for FieldRef<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
