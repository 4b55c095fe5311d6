//! Shared fixtures for introspection tests

#![allow(dead_code)]

use std::sync::Arc;

use ha_introspection::{Introspector, Snapshot, SnapshotBackend};
use serde_json::{json, Value};

pub const CHANGED: &str = "2026-01-01T00:00:00Z";

pub fn state(entity_id: &str, state: &str, attributes: Value) -> Value {
    json!({
        "entity_id": entity_id,
        "state": state,
        "attributes": attributes,
        "last_changed": CHANGED
    })
}

/// A small house: a living room light used by automations, scripts, a scene
/// and a group, plus a kitchen whose area is inherited through a device.
pub fn house() -> Value {
    json!({
        "states": [
            state("light.living_room", "on", json!({"friendly_name": "Living Room Light"})),
            state("light.kitchen", "off", json!({"friendly_name": "Kitchen Light"})),
            state("sensor.unused", "12", json!({})),
            state("automation.evening_lights", "on", json!({
                "friendly_name": "Evening Lights",
                "last_triggered": "2026-01-01T18:00:00Z"
            })),
            state("automation.guard", "on", json!({"friendly_name": "Guard"})),
            state("automation.kitchen_off", "off", json!({"friendly_name": "Kitchen Off"})),
            state("script.movie_night", "off", json!({
                "friendly_name": "Movie Night",
                "sequence": [
                    {"service": "light.turn_off", "target": {"entity_id": "light.living_room"}},
                    {"service": "media_player.turn_on", "entity_id": "media_player.tv"}
                ]
            })),
            state("script.kitchen_clean", "off", json!({
                "friendly_name": "Kitchen Clean",
                "sequence": [{"action": "vacuum.start", "target": {"area_id": ["hall", "kitchen"]}}]
            })),
            state("scene.relax", "scening", json!({
                "friendly_name": "Relax",
                "entity_id": ["light.living_room", "media_player.tv"]
            })),
            state("group.downstairs", "on", json!({
                "friendly_name": "Downstairs",
                "entity_id": ["light.living_room", "light.kitchen"]
            }))
        ],
        "automations": {
            "automation.evening_lights": {
                "alias": "Evening Lights",
                "triggers": [{"platform": "state", "entity_id": "light.living_room", "to": "off"}],
                "actions": [{"service": "light.turn_on", "target": {"entity_id": "light.living_room"}}]
            },
            "automation.guard": {
                "trigger": [{"platform": "time", "at": "22:00"}],
                "condition": [{"condition": "state", "entity_id": "light.living_room", "state": "on"}],
                "action": [{"service": "notify.notify", "data": {"message": "Lights on"}}]
            },
            "automation.kitchen_off": {
                "triggers": [{"platform": "time", "at": "23:00"}],
                "actions": [{"action": "light.turn_off", "target": {"area_id": "kitchen"}}]
            }
        },
        "entity_registry": [
            {"entity_id": "light.living_room", "area_id": "living_room", "platform": "hue"},
            {"entity_id": "light.kitchen", "device_id": "dev_kitchen", "platform": "hue"}
        ],
        "device_registry": [
            {"id": "dev_kitchen", "area_id": "kitchen", "name": "Kitchen Bulb"}
        ]
    })
}

pub fn snapshot(value: Value) -> Snapshot {
    serde_json::from_value(value).expect("fixture snapshot")
}

pub fn backend(value: Value) -> Arc<SnapshotBackend> {
    Arc::new(SnapshotBackend::new(snapshot(value)))
}

pub fn introspector(backend: &Arc<SnapshotBackend>) -> Introspector {
    Introspector::new(backend.clone())
}
