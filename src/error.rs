use thiserror::Error;

/// Errors raised by this crate's own collections, registry and settings.
///
/// Backing-collection failures are not wrapped: they travel through
/// `anyhow::Error` exactly as the collection produced them, and callers can
/// `downcast_ref::<DaoError>()` to recognise the ones below.
#[derive(Debug, Error)]
pub enum DaoError {
    /// A collection refused to store an entity
    #[error("Rejected by '{collection}': {reason}")]
    Rejected { collection: String, reason: String },

    /// Nothing is registered under the requested key
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    /// A collection is registered under the key, but for another entity type
    #[error("Collection '{key}' does not hold {expected}")]
    CollectionType { key: String, expected: &'static str },

    /// The settings do not describe the requested relationship
    #[error("Unknown relationship: {0}")]
    UnknownRelationship(String),

    /// Settings file could not be read
    #[error("Failed to read settings: {0}")]
    SettingsIo(#[from] std::io::Error),

    /// Settings could not be parsed
    #[error("Failed to parse settings: {0}")]
    SettingsParse(#[from] toml::de::Error),

    /// Settings could not be serialized
    #[error("Failed to serialize settings: {0}")]
    SettingsSerialize(#[from] toml::ser::Error),
}
