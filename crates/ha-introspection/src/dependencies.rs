//! Dependency extraction
//!
//! Answers "what does this automation or script depend on?". Entity
//! dependencies are classified by the role the surrounding map gives them
//! (trigger kind, condition, service call, action target); services, areas,
//! devices and variables are plain sorted lists.

use std::collections::{BTreeMap, BTreeSet};

use ha_automation::{AutomationConfig, Script};
use ha_core::{ConfigMap, ConfigValue};
use serde::{Deserialize, Serialize};

use crate::search::{self, KEY_ACTION, KEY_ENTITY_ID, KEY_SERVICE, KEY_TARGET};

/// Keys whose values are walked for further entity dependencies. Anything
/// else (trigger metadata, templates, notification payloads) is left alone.
const STRUCTURAL_KEYS: [&str; 7] = [
    "data",
    "choose",
    "sequence",
    "conditions",
    "then",
    "else",
    "default",
];

pub const TYPE_CONDITION: &str = "condition";
pub const TYPE_SERVICE_CALL: &str = "service_call";
pub const TYPE_TARGET: &str = "target";
pub const TYPE_UNKNOWN: &str = "unknown";

/// One entity an automation or script depends on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEntry {
    pub entity_id: String,

    /// Trigger kind ("state", "numeric_state", ...), or one of
    /// "condition", "service_call", "target", "unknown"
    #[serde(rename = "type")]
    pub dependency_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DependencyEntry {
    fn target(entity_id: &str) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            dependency_type: TYPE_TARGET.to_string(),
            description: Some("Action target".to_string()),
        }
    }

    /// Classify a direct `entity_id` by the other fields of its map
    fn classify(entity_id: &str, map: &ConfigMap) -> Self {
        let str_field = |key: &str| map.get(key).and_then(ConfigValue::as_str);

        let dependency_type = if let Some(kind) = str_field("trigger").or_else(|| str_field("platform")) {
            kind
        } else if map.contains_key("condition") {
            TYPE_CONDITION
        } else if map.contains_key(KEY_SERVICE) || map.contains_key(KEY_ACTION) {
            TYPE_SERVICE_CALL
        } else {
            TYPE_UNKNOWN
        };

        Self {
            entity_id: entity_id.to_string(),
            dependency_type: dependency_type.to_string(),
            description: describe(dependency_type, map),
        }
    }
}

/// Human-readable description for the known dependency types
fn describe(dependency_type: &str, map: &ConfigMap) -> Option<String> {
    let field = |key: &str| map.get(key).filter(|v| !v.is_null());

    match dependency_type {
        "state" => Some(match (field("from"), field("to")) {
            (Some(from), Some(to)) => format!("State change from '{from}' to '{to}'"),
            (None, Some(to)) => format!("State change to '{to}'"),
            (Some(from), None) => format!("State change from '{from}'"),
            (None, None) => "State change".to_string(),
        }),
        "numeric_state" => match (field("above"), field("below")) {
            (Some(above), Some(below)) => {
                Some(format!("Numeric state above {above} and below {below}"))
            }
            (Some(above), None) => Some(format!("Numeric state above {above}")),
            (None, Some(below)) => Some(format!("Numeric state below {below}")),
            (None, None) => None,
        },
        "time" => field("at").map(|at| format!("At time {at}")),
        TYPE_CONDITION => map
            .get("condition")
            .and_then(ConfigValue::as_str)
            .map(|kind| format!("{kind} condition")),
        _ => None,
    }
}

/// Everything an automation or script depends on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyCategories {
    pub triggers: Vec<DependencyEntry>,
    pub conditions: Vec<DependencyEntry>,
    pub actions: Vec<DependencyEntry>,
    pub variables: Vec<String>,
    pub areas: Vec<String>,
    pub devices: Vec<String>,
    pub services: Vec<String>,
}

impl DependencyCategories {
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
            && self.conditions.is_empty()
            && self.actions.is_empty()
            && self.variables.is_empty()
            && self.areas.is_empty()
            && self.devices.is_empty()
            && self.services.is_empty()
    }
}

/// Classified entity dependencies of one phase or sequence, one entry per
/// entity id, sorted by entity id.
///
/// The first occurrence of an entity decides its type and description.
pub fn extract_entries(items: &[ConfigValue]) -> Vec<DependencyEntry> {
    let mut seen = BTreeMap::new();
    for item in items {
        walk(item, &mut seen);
    }
    seen.into_values().collect()
}

fn walk(value: &ConfigValue, seen: &mut BTreeMap<String, DependencyEntry>) {
    match value {
        ConfigValue::List(items) => {
            for item in items {
                walk(item, seen);
            }
        }
        ConfigValue::Map(map) => {
            if let Some(entity_id) = map
                .get(KEY_ENTITY_ID)
                .and_then(ConfigValue::first_string)
                .filter(|id| !id.is_empty())
            {
                seen.entry(entity_id.to_string())
                    .or_insert_with(|| DependencyEntry::classify(entity_id, map));
            }

            if let Some(targets) = map.get(KEY_TARGET).and_then(|t| t.get(KEY_ENTITY_ID)) {
                for entity_id in targets.string_values().into_iter().filter(|id| !id.is_empty()) {
                    seen.entry(entity_id.to_string())
                        .or_insert_with(|| DependencyEntry::target(entity_id));
                }
            }

            for key in STRUCTURAL_KEYS {
                if let Some(child) = map.get(key) {
                    walk(child, seen);
                }
            }
        }
        _ => {}
    }
}

fn sorted(set: BTreeSet<String>) -> Vec<String> {
    set.into_iter().collect()
}

/// Dependencies of an automation's three phases
pub fn automation_dependencies(config: &AutomationConfig) -> DependencyCategories {
    let mut variables = search::extract_variable_names(&config.actions);
    variables.extend(search::map_keys(&config.variables));

    DependencyCategories {
        triggers: extract_entries(&config.triggers),
        conditions: extract_entries(&config.conditions),
        actions: extract_entries(&config.actions),
        variables: sorted(variables),
        areas: sorted(search::extract_areas(&config.actions)),
        devices: sorted(search::extract_devices(&config.actions)),
        services: sorted(search::extract_services(&config.actions)),
    }
}

/// Dependencies of a script's action sequence
pub fn script_dependencies(script: &Script) -> DependencyCategories {
    let sequence = script.sequence();
    let mut variables = search::extract_variable_names(sequence);
    variables.extend(search::map_keys(script.variables()));

    DependencyCategories {
        triggers: Vec::new(),
        conditions: Vec::new(),
        actions: extract_entries(sequence),
        variables: sorted(variables),
        areas: sorted(search::extract_areas(sequence)),
        devices: sorted(search::extract_devices(sequence)),
        services: sorted(search::extract_services(sequence)),
    }
}
