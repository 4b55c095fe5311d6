//! Configuration tree search
//!
//! Two traversal modes over [`ConfigValue`] trees:
//!
//! - **Presence** ([`references`]): is a literal id reachable through a given
//!   key, either directly on a map or under its `target`? Used to decide
//!   whether an automation or script refers to an entity or area.
//! - **Extraction** ([`extract`]): collect every string stored under a set of
//!   keys anywhere in the tree. Used for the service/area/device lists of a
//!   dependency report.
//!
//! Neither mode fails on unexpected shapes: a number where an id was
//! expected is simply not a match.

use std::collections::BTreeSet;

use ha_core::ConfigValue;

pub const KEY_ENTITY_ID: &str = "entity_id";
pub const KEY_AREA_ID: &str = "area_id";
pub const KEY_DEVICE_ID: &str = "device_id";
pub const KEY_SERVICE: &str = "service";
pub const KEY_ACTION: &str = "action";
pub const KEY_TARGET: &str = "target";
pub const KEY_VARIABLES: &str = "variables";

/// Check whether `needle` is reachable from `value` through `key`.
///
/// Matches `key: needle`, `key: [.., needle, ..]` and the same under
/// `target`, on any map nested anywhere in the tree.
pub fn references(value: &ConfigValue, key: &str, needle: &str) -> bool {
    match value {
        ConfigValue::List(items) => items.iter().any(|item| references(item, key, needle)),
        ConfigValue::Map(map) => {
            let direct = map.get(key).is_some_and(|v| v.contains_string(needle));
            let targeted = map
                .get(KEY_TARGET)
                .and_then(|target| target.get(key))
                .is_some_and(|v| v.contains_string(needle));

            direct || targeted || map.values().any(|v| references(v, key, needle))
        }
        _ => false,
    }
}

/// [`references`] over every item of a phase or sequence
pub fn references_any(items: &[ConfigValue], key: &str, needle: &str) -> bool {
    items.iter().any(|item| references(item, key, needle))
}

/// Whether `entity_id` appears under an `entity_id` key anywhere in `items`
///
/// Only `entity_id` fields are matched. Entities referenced through other
/// keys, such as a time trigger's `at:`, a numeric state's `above:` or
/// `below:`, or a zone trigger's `zone:`, are not detected.
pub fn references_entity(items: &[ConfigValue], entity_id: &str) -> bool {
    references_any(items, KEY_ENTITY_ID, entity_id)
}

pub fn references_area(items: &[ConfigValue], area_id: &str) -> bool {
    references_any(items, KEY_AREA_ID, area_id)
}

/// Collect every non-empty string stored under any of `keys`, anywhere in
/// `items`, sorted and deduplicated.
pub fn extract(items: &[ConfigValue], keys: &[&str]) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    for item in items {
        collect(item, keys, &mut found);
    }
    found
}

fn collect(value: &ConfigValue, keys: &[&str], found: &mut BTreeSet<String>) {
    match value {
        ConfigValue::List(items) => {
            for item in items {
                collect(item, keys, found);
            }
        }
        ConfigValue::Map(map) => {
            for (key, child) in map {
                if keys.contains(&key.as_str()) {
                    found.extend(
                        child
                            .string_values()
                            .into_iter()
                            .filter(|s| !s.is_empty())
                            .map(String::from),
                    );
                }
                collect(child, keys, found);
            }
        }
        _ => {}
    }
}

/// Service names called via `service:` or `action:`
pub fn extract_services(items: &[ConfigValue]) -> BTreeSet<String> {
    extract(items, &[KEY_SERVICE, KEY_ACTION])
}

pub fn extract_areas(items: &[ConfigValue]) -> BTreeSet<String> {
    extract(items, &[KEY_AREA_ID])
}

pub fn extract_devices(items: &[ConfigValue]) -> BTreeSet<String> {
    extract(items, &[KEY_DEVICE_ID])
}

/// Names defined by `variables:` maps anywhere in `items`
pub fn extract_variable_names(items: &[ConfigValue]) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for item in items {
        collect_variable_names(item, &mut names);
    }
    names
}

fn collect_variable_names(value: &ConfigValue, names: &mut BTreeSet<String>) {
    match value {
        ConfigValue::List(items) => {
            for item in items {
                collect_variable_names(item, names);
            }
        }
        ConfigValue::Map(map) => {
            for (key, child) in map {
                if key == KEY_VARIABLES {
                    names.extend(map_keys(child));
                }
                collect_variable_names(child, names);
            }
        }
        _ => {}
    }
}

/// Keys of a map value; nothing for any other shape
pub fn map_keys(value: &ConfigValue) -> impl Iterator<Item = String> + '_ {
    value
        .as_map()
        .into_iter()
        .flat_map(|map| map.keys().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> Vec<ConfigValue> {
        ConfigValue::from(value).as_sequence().to_vec()
    }

    #[test]
    fn test_references_direct_list_and_target() {
        let items = tree(json!([
            {"platform": "state", "entity_id": "light.a"},
            {"service": "light.turn_on", "entity_id": ["light.b", "light.c"]},
            {"service": "light.turn_on", "target": {"entity_id": "light.d"}},
            {"service": "light.turn_on", "target": {"entity_id": ["light.e"]}}
        ]));

        for id in ["light.a", "light.b", "light.c", "light.d", "light.e"] {
            assert!(references_entity(&items, id), "{id}");
        }
        assert!(!references_entity(&items, "light.f"));
    }

    #[test]
    fn test_references_nested_anywhere() {
        let items = tree(json!([{
            "choose": [{
                "conditions": [{"condition": "state", "entity_id": "sun.sun", "state": "below_horizon"}],
                "sequence": [{"repeat": {"count": 2, "sequence": [
                    {"action": "light.toggle", "target": {"area_id": ["den", "hall"]}}
                ]}}]
            }]
        }]));

        assert!(references_entity(&items, "sun.sun"));
        assert!(references_area(&items, "hall"));
        assert!(!references_area(&items, "kitchen"));
    }

    #[test]
    fn test_references_requires_key() {
        // A matching string under an unrelated key is not a reference
        let items = tree(json!([{"service": "notify.mobile", "data": {"message": "light.a"}}]));
        assert!(!references_entity(&items, "light.a"));

        // area_id is not an entity_id
        let items = tree(json!([{"target": {"area_id": "light.a"}}]));
        assert!(!references_entity(&items, "light.a"));
    }

    #[test]
    fn test_entity_in_other_trigger_keys_is_not_detected() {
        let items = tree(json!([
            {"platform": "time", "at": "input_datetime.wake_up"},
            {"platform": "numeric_state", "entity_id": "sensor.temp", "above": "input_number.max_temp"},
            {"platform": "zone", "entity_id": "person.anna", "zone": "zone.home", "event": "enter"}
        ]));

        assert!(references_entity(&items, "sensor.temp"));
        assert!(references_entity(&items, "person.anna"));
        for id in ["input_datetime.wake_up", "input_number.max_temp", "zone.home"] {
            assert!(!references_entity(&items, id), "{id}");
        }
    }

    #[test]
    fn test_type_mismatches_are_not_matches() {
        let items = tree(json!([
            {"entity_id": 42},
            {"entity_id": {"nested": "light.a"}},
            {"target": "light.a"},
            null,
            "light.a",
            [true, 1.5]
        ]));
        assert!(!references_entity(&items, "light.a"));
        assert!(!references_entity(&items, "42"));
    }

    #[test]
    fn test_extract_collects_everything_sorted() {
        let items = tree(json!([
            {"service": "switch.turn_on", "target": {"device_id": "dev2", "area_id": "b"}},
            {"action": "light.turn_on", "data": {"brightness": 200}, "target": {"area_id": ["a", "b"]}},
            {"if": [{"condition": "device", "device_id": "dev1"}],
             "then": [{"action": "scene.turn_on", "target": {"entity_id": "scene.x"}}]},
            {"service": 12, "area_id": ""}
        ]));

        assert_eq!(
            extract_services(&items).into_iter().collect::<Vec<_>>(),
            vec!["light.turn_on", "scene.turn_on", "switch.turn_on"]
        );
        assert_eq!(extract_areas(&items).into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(extract_devices(&items).into_iter().collect::<Vec<_>>(), vec!["dev1", "dev2"]);
    }

    #[test]
    fn test_extract_variable_names() {
        let items = tree(json!([
            {"variables": {"target": "light.a", "level": 3}},
            {"sequence": [{"variables": {"level": 4, "done": false}}]},
            {"variables": "not a map"}
        ]));
        assert_eq!(
            extract_variable_names(&items).into_iter().collect::<Vec<_>>(),
            vec!["done", "level", "target"]
        );
    }
}
