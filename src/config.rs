//! Relationship settings
//!
//! Maps relationship names to the registry keys of their junction and
//! target collections:
//!
//! ```toml
//! [relationships.memberships]
//! junction_key = "memberships"
//! target_key = "groups"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::DaoError;

/// Registry keys for one relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipSettings {
    /// Key of the junction collection (the adapter's delegate)
    pub junction_key: String,
    /// Key of the target collection
    pub target_key: String,
}

/// Settings for all configured relationships
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub relationships: HashMap<String, RelationshipSettings>,
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self, DaoError> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DaoError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load settings, falling back to defaults when the file is missing or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::debug!(path = %path.display(), "Using default settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn to_toml_string(&self) -> Result<String, DaoError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the settings for a named relationship
    pub fn relationship(&self, name: &str) -> Result<&RelationshipSettings, DaoError> {
        self.relationships
            .get(name)
            .ok_or_else(|| DaoError::UnknownRelationship(name.to_string()))
    }

    /// Add or replace a relationship entry
    pub fn insert_relationship(
        &mut self,
        name: impl Into<String>,
        junction_key: impl Into<String>,
        target_key: impl Into<String>,
    ) {
        self.relationships.insert(
            name.into(),
            RelationshipSettings {
                junction_key: junction_key.into(),
                target_key: target_key.into(),
            },
        );
    }
}
