//! State type representing an entity snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity_id::split_domain;
use crate::value::{ConfigMap, ConfigValue};

/// Attribute holding an entity's display name
pub const ATTR_FRIENDLY_NAME: &str = "friendly_name";

/// Attribute holding member entity IDs (scenes, groups)
pub const ATTR_ENTITY_ID: &str = "entity_id";

/// The state of an entity at a point in time
///
/// Snapshots are fetched per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// The entity this state belongs to
    pub entity_id: String,

    /// The state value (e.g., "on", "off", "23.5", "unavailable")
    pub state: String,

    /// Attributes in the order the backend reported them
    #[serde(default)]
    pub attributes: ConfigMap,

    /// When the state value last changed
    pub last_changed: DateTime<Utc>,

    /// When the state was last written, even if unchanged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl State {
    pub fn new(
        entity_id: impl Into<String>,
        state: impl Into<String>,
        attributes: ConfigMap,
        last_changed: DateTime<Utc>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            state: state.into(),
            attributes,
            last_changed,
            last_updated: None,
        }
    }

    /// Domain prefix of the entity ID
    pub fn domain(&self) -> &str {
        split_domain(&self.entity_id)
    }

    /// Friendly name attribute, falling back to the entity ID
    pub fn friendly_name(&self) -> &str {
        self.attribute(ATTR_FRIENDLY_NAME)
            .and_then(ConfigValue::as_str)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.entity_id)
    }

    pub fn attribute(&self, key: &str) -> Option<&ConfigValue> {
        self.attributes.get(key)
    }

    /// Entity IDs listed in the `entity_id` attribute
    pub fn member_entity_ids(&self) -> Vec<&str> {
        self.attribute(ATTR_ENTITY_ID)
            .map(ConfigValue::string_values)
            .unwrap_or_default()
    }
}
