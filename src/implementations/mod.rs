//! Collection implementations
//!
//! ## Available Implementations
//!
//! - `memory` - In-memory collection, for tests and embedding applications
//!   that do not need persistence

pub mod memory;

pub use memory::MemoryCollection;
