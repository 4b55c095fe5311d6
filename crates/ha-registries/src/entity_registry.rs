//! Entity Registry
//!
//! Read-only view of the entity registry as reported by the backend, indexed
//! by entity_id.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Reason an entity was disabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisabledBy {
    /// Disabled by a config entry
    ConfigEntry,
    /// Disabled by device
    Device,
    /// Disabled by Home Assistant itself
    Hass,
    /// Disabled by the integration
    Integration,
    /// Disabled by the user
    User,
}

/// A registered entity entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityEntry {
    /// Full entity ID (domain.object_id)
    pub entity_id: String,

    /// Parent device ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,

    /// Assigned area, overriding the device's area
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_id: Option<String>,

    /// Component/platform that provides this entity
    #[serde(default)]
    pub platform: String,

    /// User-set name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Disable reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_by: Option<DisabledBy>,
}

impl EntityEntry {
    /// Create an entry with only the entity ID set
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            device_id: None,
            area_id: None,
            platform: String::new(),
            name: None,
            disabled_by: None,
        }
    }

    pub fn with_device(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub fn with_area(mut self, area_id: impl Into<String>) -> Self {
        self.area_id = Some(area_id.into());
        self
    }

    /// Directly assigned area, ignoring empty strings
    pub fn direct_area(&self) -> Option<&str> {
        self.area_id.as_deref().filter(|a| !a.is_empty())
    }

    /// Owning device, ignoring empty strings
    pub fn owning_device(&self) -> Option<&str> {
        self.device_id.as_deref().filter(|d| !d.is_empty())
    }
}

/// Snapshot of the entity registry, indexed by entity_id
#[derive(Debug, Default)]
pub struct EntityRegistry {
    by_entity_id: IndexMap<String, EntityEntry>,
}

impl EntityRegistry {
    /// Index the backend's entry list
    ///
    /// A later entry for the same entity_id replaces the earlier one.
    pub fn from_entries(entries: impl IntoIterator<Item = EntityEntry>) -> Self {
        Self {
            by_entity_id: entries
                .into_iter()
                .map(|entry| (entry.entity_id.clone(), entry))
                .collect(),
        }
    }

    pub fn get(&self, entity_id: &str) -> Option<&EntityEntry> {
        self.by_entity_id.get(entity_id)
    }
}
