//! Type-safe ID newtypes for entities
//!
//! IDs are UUID strings wrapped in newtypes for compile-time safety. Use
//! [`define_id!`](crate::define_id) to declare one per entity type.

use uuid::Uuid;

/// Generate a fresh random id string
#[doc(hidden)]
pub fn random_id() -> String {
    Uuid::new_v4().to_string()
}

/// Define a type-safe ID newtype backed by a UUID string.
///
/// ```ignore
/// relationship_dao::define_id!(UserId, "Unique identifier for a user");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self($crate::ids::random_id())
            }

            /// Create from an existing string (for loading from a store)
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Get the inner string value
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<$name> for $crate::Value {
            fn from(id: $name) -> Self {
                $crate::Value::Text(id.0)
            }
        }
    };
}
