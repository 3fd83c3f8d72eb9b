//! Many-to-many relationships exposed as async collections
//!
//! This crate provides:
//! - **Collections**: the async `Collection` trait (`put`, `find`, `select`)
//!   and an in-memory `MemoryCollection`
//! - **Queries**: typed `Field` references, the `Predicate` algebra, `Order`
//!   and `Select` parameters, and `Sink`s that consume select results
//! - **Relationships**: a `Relationship` descriptor and `ManyToManyDao`, which
//!   presents the targets linked to one source through a junction collection
//!   as a `Collection` of its own
//! - **Wiring**: `CollectionRegistry` and TOML `Settings` for looking up
//!   collections by key
//!
//! # Example
//!
//! ```ignore
//! use relationship_dao::{Collection, CollectionExt, Predicate, Select};
//!
//! let groups = memberships.dao_for(user, junctions, group_collection);
//! groups.put(admins).await?;
//! let found = groups
//!     .select_all(&Select::all().filter(Predicate::equals(Group::NAME, "admins".into())))
//!     .await?;
//! ```
pub mod collection;
pub mod config;
pub mod entity;
pub mod error;
pub mod ids;
pub mod implementations;
pub mod many_to_many;
pub mod predicate;
pub mod query;
pub mod registry;
pub mod relationship;
pub mod sink;
pub mod value;

pub use collection::{Collection, CollectionExt};
pub use config::{RelationshipSettings, Settings};
pub use entity::{Entity, Field, FieldRef};
pub use error::DaoError;
pub use implementations::MemoryCollection;
pub use many_to_many::ManyToManyDao;
pub use predicate::Predicate;
pub use query::{Direction, Order, Select};
pub use registry::CollectionRegistry;
pub use relationship::Relationship;
pub use sink::{ArraySink, CountSink, ProjectionSink, Sink};
pub use value::Value;
