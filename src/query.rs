//! Select parameters: paging, ordering and filtering

use std::cmp::Ordering;
use std::fmt;

use crate::entity::{Field, FieldRef};
use crate::predicate::Predicate;
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// A lexicographic sort order over one or more fields.
pub struct Order<E> {
    keys: Vec<(FieldRef<E>, Direction)>,
}

impl<E: 'static> Order<E> {
    pub fn asc<V: Into<Value> + 'static>(field: Field<E, V>) -> Self {
        Self {
            keys: vec![(field.into(), Direction::Asc)],
        }
    }

    pub fn desc<V: Into<Value> + 'static>(field: Field<E, V>) -> Self {
        Self {
            keys: vec![(field.into(), Direction::Desc)],
        }
    }

    /// Break ties with an ascending key
    pub fn then_asc<V: Into<Value> + 'static>(mut self, field: Field<E, V>) -> Self {
        self.keys.push((field.into(), Direction::Asc));
        self
    }

    /// Break ties with a descending key
    pub fn then_desc<V: Into<Value> + 'static>(mut self, field: Field<E, V>) -> Self {
        self.keys.push((field.into(), Direction::Desc));
        self
    }
}

impl<E> Order<E> {
    pub fn compare(&self, a: &E, b: &E) -> Ordering {
        for (field, direction) in &self.keys {
            let ordering = field.read(a).cmp(&field.read(b));
            let ordering = match direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

impl<E> Clone for Order<E> {
    fn clone(&self) -> Self {
        Self {
            keys: self.keys.clone(),
        }
    }
}

impl<E> fmt::Debug for Order<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.keys.iter().map(|(field, dir)| (field.name(), dir)))
            .finish()
    }
}

/// Parameters of a `select`.
///
/// Every part is optional; [`Select::all`] selects everything in the
/// collection's natural order.
///
/// ```ignore
/// let query = Select::all()
///     .filter(Predicate::equals(Group::NAME, "admins".to_string()))
///     .order_by(Order::asc(Group::NAME))
///     .skip(10)
///     .limit(5);
/// ```
pub struct Select<E> {
    skip: Option<usize>,
    limit: Option<usize>,
    order: Option<Order<E>>,
    predicate: Option<Predicate<E>>,
}

impl<E> Select<E> {
    pub fn all() -> Self {
        Self {
            skip: None,
            limit: None,
            order: None,
            predicate: None,
        }
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn order_by(mut self, order: Order<E>) -> Self {
        self.order = Some(order);
        self
    }

    /// Replace the filter predicate
    pub fn filter(mut self, predicate: Predicate<E>) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn skip_count(&self) -> Option<usize> {
        self.skip
    }

    pub fn limit_count(&self) -> Option<usize> {
        self.limit
    }

    pub fn order(&self) -> Option<&Order<E>> {
        self.order.as_ref()
    }

    pub fn predicate(&self) -> Option<&Predicate<E>> {
        self.predicate.as_ref()
    }

    /// Apply skip and limit to an already filtered and ordered result
    pub fn page<T>(&self, items: Vec<T>) -> Vec<T> {
        let skipped = items.into_iter().skip(self.skip.unwrap_or(0));
        match self.limit {
            Some(limit) => skipped.take(limit).collect(),
            None => skipped.collect(),
        }
    }
}

impl<E> Default for Select<E> {
    fn default() -> Self {
        Self::all()
    }
}

impl<E> Clone for Select<E> {
    fn clone(&self) -> Self {
        Self {
            skip: self.skip,
            limit: self.limit,
            order: self.order.clone(),
            predicate: self.predicate.clone(),
        }
    }
}

impl<E> fmt::Debug for Select<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Select")
            .field("skip", &self.skip)
            .field("limit", &self.limit)
            .field("order", &self.order)
            .field("predicate", &self.predicate)
            .finish()
    }
}
