//! Predicate algebra over entity fields
//!
//! Predicates are immutable values built from typed [`Field`]s. They are
//! pure: building or cloning one has no side effects, and evaluation only
//! reads the entity.

use std::collections::BTreeSet;
use std::fmt;

use crate::entity::{Field, FieldRef};
use crate::value::Value;

/// A boolean expression over the fields of `E`.
pub enum Predicate<E> {
    /// Accepts every entity
    True,
    /// Field equals a value
    Eq { field: FieldRef<E>, value: Value },
    /// Field is one of a set of values; an empty set accepts nothing
    In { field: FieldRef<E>, values: BTreeSet<Value> },
    /// All operands hold; no operands accepts everything
    And(Vec<Predicate<E>>),
    /// Any operand holds; no operands accepts nothing
    Or(Vec<Predicate<E>>),
    Not(Box<Predicate<E>>),
}

impl<E: 'static> Predicate<E> {
    /// The constant-true predicate
    pub fn truth() -> Self {
        Predicate::True
    }

    /// `field == value`
    pub fn equals<V>(field: Field<E, V>, value: V) -> Self
    where
        V: Into<Value> + 'static,
    {
        Predicate::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// `field ∈ values`
    pub fn in_set<V, I>(field: Field<E, V>, values: I) -> Self
    where
        V: Into<Value> + 'static,
        I: IntoIterator<Item = V>,
    {
        Self::in_values(field, values.into_iter().map(Into::into))
    }

    /// `field ∈ values` for values that are already dynamic, e.g. the output
    /// of a projection sink.
    pub fn in_values<V, I>(field: Field<E, V>, values: I) -> Self
    where
        V: Into<Value> + 'static,
        I: IntoIterator<Item = Value>,
    {
        Predicate::In {
            field: field.into(),
            values: values.into_iter().collect(),
        }
    }

    pub fn and(left: Self, right: Self) -> Self {
        Predicate::And(vec![left, right])
    }

    pub fn or(left: Self, right: Self) -> Self {
        Predicate::Or(vec![left, right])
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Self) -> Self {
        Predicate::Not(Box::new(inner))
    }

    /// Conjoin another predicate onto this one
    pub fn and_also(self, other: Self) -> Self {
        match self {
            Predicate::And(mut operands) => {
                operands.push(other);
                Predicate::And(operands)
            }
            lhs => Self::and(lhs, other),
        }
    }
}

impl<E> Predicate<E> {
    /// Evaluate against one entity
    pub fn matches(&self, entity: &E) -> bool {
        match self {
            Predicate::True => true,
            Predicate::Eq { field, value } => field.read(entity) == *value,
            Predicate::In { field, values } => {
                !values.is_empty() && values.contains(&field.read(entity))
            }
            Predicate::And(operands) => operands.iter().all(|p| p.matches(entity)),
            Predicate::Or(operands) => operands.iter().any(|p| p.matches(entity)),
            Predicate::Not(inner) => !inner.matches(entity),
        }
    }
}

impl<E> Clone for Predicate<E> {
    fn clone(&self) -> Self {
        match self {
            Predicate::True => Predicate::True,
            Predicate::Eq { field, value } => Predicate::Eq {
                field: field.clone(),
                value: value.clone(),
            },
            Predicate::In { field, values } => Predicate::In {
                field: field.clone(),
                values: values.clone(),
            },
            Predicate::And(operands) => Predicate::And(operands.clone()),
            Predicate::Or(operands) => Predicate::Or(operands.clone()),
            Predicate::Not(inner) => Predicate::Not(inner.clone()),
        }
    }
}

fn write_operands<E>(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    operands: &[Predicate<E>],
) -> fmt::Result {
    write!(f, "{}(", name)?;
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{:?}", operand)?;
    }
    write!(f, ")")
}

impl<E> fmt::Debug for Predicate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::True => write!(f, "TRUE"),
            Predicate::Eq { field, value } => write!(f, "EQ({:?}, {})", field, value),
            Predicate::In { field, values } => {
                write!(f, "IN({:?}, [", field)?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "])")
            }
            Predicate::And(operands) => write_operands(f, "AND", operands),
            Predicate::Or(operands) => write_operands(f, "OR", operands),
            Predicate::Not(inner) => write!(f, "NOT({:?})", inner),
        }
    }
}
