//! Device Registry
//!
//! Read-only view of the device registry, used to resolve the area of
//! entities that inherit it from their device.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::entity_registry::DisabledBy;

/// A registered device entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceEntry {
    /// Device ID
    pub id: String,

    /// Assigned area
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_id: Option<String>,

    /// Integration-provided name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// User-set name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_by_user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_by: Option<DisabledBy>,
}

impl DeviceEntry {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            area_id: None,
            name: None,
            name_by_user: None,
            disabled_by: None,
        }
    }

    pub fn with_area(mut self, area_id: impl Into<String>) -> Self {
        self.area_id = Some(area_id.into());
        self
    }

    /// Assigned area, ignoring empty strings
    pub fn area(&self) -> Option<&str> {
        self.area_id.as_deref().filter(|a| !a.is_empty())
    }
}

/// Snapshot of the device registry, indexed by device id
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    by_id: IndexMap<String, DeviceEntry>,
}

impl DeviceRegistry {
    pub fn from_entries(entries: impl IntoIterator<Item = DeviceEntry>) -> Self {
        Self {
            by_id: entries
                .into_iter()
                .map(|entry| (entry.id.clone(), entry))
                .collect(),
        }
    }

    pub fn get(&self, device_id: &str) -> Option<&DeviceEntry> {
        self.by_id.get(device_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let registry = DeviceRegistry::from_entries([
            DeviceEntry::new("dev1").with_area("office"),
            DeviceEntry::new("dev2"),
        ]);

        assert_eq!(registry.get("dev1").and_then(DeviceEntry::area), Some("office"));
        assert_eq!(registry.get("dev2").and_then(DeviceEntry::area), None);
        assert!(registry.get("dev3").is_none());
    }

    #[test]
    fn test_deserialize_backend_entry() {
        let device: DeviceEntry = serde_json::from_value(serde_json::json!({
            "id": "abc123",
            "area_id": "kitchen",
            "name": "Hue Bridge",
            "name_by_user": "Bridge",
            "manufacturer": "Signify"
        }))
        .unwrap();

        assert_eq!(device.area(), Some("kitchen"));
        assert_eq!(device.name_by_user.as_deref(), Some("Bridge"));
    }

    #[test]
    fn test_empty_area_is_unset() {
        assert_eq!(DeviceEntry::new("dev1").with_area("").area(), None);
    }
}
