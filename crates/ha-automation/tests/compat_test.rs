//! Compatibility tests for automation snapshots against Home Assistant configs
//!
//! These tests feed configuration in the shapes Home Assistant actually emits
//! (automations.yaml, the automation config endpoint, script state attributes)
//! and check that nothing is lost on the way into the untyped trees.

use ha_automation::{AutomationConfig, Phase, Scene, Script};
use ha_core::ConfigValue;
use serde_json::json;

// ============================================================================
// Automation configs
// ============================================================================

#[test]
fn test_ha_compat_modern_plural_keys() {
    let config: AutomationConfig = serde_json::from_value(json!({
        "id": "1712345678901",
        "alias": "Porch light at sunset",
        "description": "",
        "triggers": [{"trigger": "sun", "event": "sunset", "offset": "-00:30:00"}],
        "conditions": [{"condition": "state", "entity_id": "input_boolean.away", "state": "off"}],
        "actions": [{"action": "light.turn_on", "target": {"entity_id": "light.porch"}}],
        "mode": "single"
    }))
    .unwrap();

    assert_eq!(config.alias.as_deref(), Some("Porch light at sunset"));
    assert_eq!(config.mode.as_deref(), Some("single"));
    for phase in Phase::ALL {
        assert_eq!(config.phase(phase).len(), 1, "phase {phase}");
    }
}

#[test]
fn test_ha_compat_legacy_singular_keys_yaml() {
    let yaml = r#"
alias: Motion hallway
trigger:
  - platform: state
    entity_id: binary_sensor.hall_motion
    to: "on"
condition: []
action:
  - service: light.turn_on
    target:
      area_id: hallway
  - delay:
      minutes: 2
  - service: light.turn_off
    data:
      entity_id: light.hallway
"#;

    let config: AutomationConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.triggers.len(), 1);
    assert!(config.conditions.is_empty());
    assert_eq!(config.actions.len(), 3);

    let trigger = &config.triggers[0];
    assert_eq!(trigger.get("platform").and_then(ConfigValue::as_str), Some("state"));
    assert_eq!(trigger.get("to").and_then(ConfigValue::as_str), Some("on"));
}

#[test]
fn test_ha_compat_variables_kept_verbatim() {
    let config: AutomationConfig = serde_json::from_value(json!({
        "triggers": [],
        "actions": [],
        "variables": {"brightness": 180, "target_light": "light.desk"}
    }))
    .unwrap();

    let variables = config.variables.as_map().unwrap();
    assert_eq!(variables.keys().collect::<Vec<_>>(), vec!["brightness", "target_light"]);
}

#[test]
fn test_ha_compat_serialize_skips_unset() {
    let config = AutomationConfig::default();
    let value = serde_json::to_value(&config).unwrap();
    assert_eq!(value, json!({"triggers": [], "conditions": [], "actions": []}));
}

// ============================================================================
// Script and scene states
// ============================================================================

#[test]
fn test_ha_compat_script_state() {
    let script: Script = serde_json::from_value(json!({
        "entity_id": "script.goodnight",
        "state": "off",
        "attributes": {
            "friendly_name": "Goodnight",
            "last_triggered": null,
            "mode": "single",
            "current": 0,
            "sequence": [
                {"action": "light.turn_off", "target": {"area_id": ["bedroom", "hall"]}},
                {"choose": [{
                    "conditions": [{"condition": "state", "entity_id": "lock.front", "state": "unlocked"}],
                    "sequence": [{"action": "lock.lock", "target": {"entity_id": "lock.front"}}]
                }]}
            ]
        },
        "last_changed": "2026-02-10T21:00:00+00:00",
        "last_updated": "2026-02-10T21:00:00+00:00"
    }))
    .unwrap();

    assert_eq!(script.friendly_name(), "Goodnight");
    assert_eq!(script.sequence().len(), 2);
    assert!(script.state().last_updated.is_some());
}

#[test]
fn test_ha_compat_scene_state() {
    let scene: Scene = serde_json::from_value(json!({
        "entity_id": "scene.relax",
        "state": "2026-02-10T20:00:00+00:00",
        "attributes": {
            "entity_id": ["light.sofa", "light.floor_lamp"],
            "id": "1690000000",
            "friendly_name": "Relax"
        },
        "last_changed": "2026-02-10T20:00:00+00:00"
    }))
    .unwrap();

    assert_eq!(scene.members(), vec!["light.sofa", "light.floor_lamp"]);
    assert!(scene.contains("light.sofa"));
    assert_eq!(scene.entity_id(), "scene.relax");
}
