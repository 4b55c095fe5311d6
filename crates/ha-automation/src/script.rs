//! Script snapshots
//!
//! Scripts are reported as entity states whose attributes carry the action
//! sequence. There is no trigger or condition phase.

use ha_core::{ConfigValue, State};
use serde::{Deserialize, Serialize};

/// Attribute holding the script's action sequence
pub const ATTR_SEQUENCE: &str = "sequence";

/// Attribute holding the script's declared variables
pub const ATTR_VARIABLES: &str = "variables";

/// A script entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script(pub State);

impl Script {
    pub fn entity_id(&self) -> &str {
        &self.0.entity_id
    }

    pub fn friendly_name(&self) -> &str {
        self.0.friendly_name()
    }

    /// The action sequence; a lone action counts as a one-step sequence
    pub fn sequence(&self) -> &[ConfigValue] {
        self.0
            .attribute(ATTR_SEQUENCE)
            .map(ConfigValue::as_sequence)
            .unwrap_or_default()
    }

    /// The `variables` attribute, or null
    pub fn variables(&self) -> &ConfigValue {
        static NULL: ConfigValue = ConfigValue::Null;
        self.0.attribute(ATTR_VARIABLES).unwrap_or(&NULL)
    }

    pub fn state(&self) -> &State {
        &self.0
    }
}

impl From<State> for Script {
    fn from(state: State) -> Self {
        Self(state)
    }
}
