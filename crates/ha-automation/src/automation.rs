//! Automation snapshots
//!
//! An automation ties together triggers, conditions, and actions. The backend
//! lists automations as entity states and serves each one's configuration
//! separately; both halves are combined into [`Automation`].

use chrono::{DateTime, Utc};
use ha_core::{ConfigValue, State};
use serde::{Deserialize, Serialize};

/// Attribute carrying the last trigger time
pub const ATTR_LAST_TRIGGERED: &str = "last_triggered";

/// The phase of an automation a value was found in
///
/// Ordering follows the phases' execution order, which is also the order
/// `used_in` lists are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Trigger,
    Condition,
    Action,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Trigger, Phase::Condition, Phase::Action];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Trigger => "trigger",
            Phase::Condition => "condition",
            Phase::Action => "action",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Automation configuration as stored by Home Assistant
///
/// Accepts both the current plural keys and the legacy singular ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutomationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Human-readable name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, alias = "trigger", deserialize_with = "sequence")]
    pub triggers: Vec<ConfigValue>,

    #[serde(default, alias = "condition", deserialize_with = "sequence")]
    pub conditions: Vec<ConfigValue>,

    #[serde(default, alias = "action", deserialize_with = "sequence")]
    pub actions: Vec<ConfigValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    /// Variables available to the automation
    #[serde(default, skip_serializing_if = "ConfigValue::is_null")]
    pub variables: ConfigValue,
}

impl AutomationConfig {
    /// Items of one phase
    pub fn phase(&self, phase: Phase) -> &[ConfigValue] {
        match phase {
            Phase::Trigger => &self.triggers,
            Phase::Condition => &self.conditions,
            Phase::Action => &self.actions,
        }
    }
}

/// Deserialize a phase that may be written as a single item or a list
fn sequence<'de, D>(deserializer: D) -> Result<Vec<ConfigValue>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = ConfigValue::deserialize(deserializer)?;
    Ok(value.as_sequence().to_vec())
}

/// An automation entity together with its configuration, if fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Automation {
    pub entity_id: String,

    pub friendly_name: String,

    /// "on" when enabled, "off" when disabled
    pub state: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_triggered: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<AutomationConfig>,
}

impl Automation {
    /// Build the listing half of an automation from its entity state
    pub fn from_state(state: &State) -> Self {
        let last_triggered = state
            .attribute(ATTR_LAST_TRIGGERED)
            .and_then(ConfigValue::as_str)
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc));

        Self {
            entity_id: state.entity_id.clone(),
            friendly_name: state.friendly_name().to_string(),
            state: state.state.clone(),
            last_triggered,
            config: None,
        }
    }

    pub fn with_config(mut self, config: AutomationConfig) -> Self {
        self.config = Some(config);
        self
    }
}
