//! End-to-end tests for dependency reports against a snapshot backend

mod common;

use common::{backend, house, introspector, state};
use ha_introspection::tools::get_entity_dependencies;
use ha_introspection::{AnalysisError, BackendError, BackendMethod, DependencyOwner, RequestContext};
use serde_json::{json, Value};

#[tokio::test]
async fn test_automation_trigger_and_service() {
    let backend = backend(json!({
        "states": [state("automation.x", "on", json!({"friendly_name": "X"}))],
        "automations": {
            "automation.x": {
                "triggers": [{"platform": "state", "entity_id": "light.living_room"}],
                "actions": [{"service": "light.turn_on"}]
            }
        }
    }));
    let ctx = RequestContext::background();

    let output = get_entity_dependencies(
        &introspector(&backend),
        &ctx,
        json!({"entity_id": "automation.x"}),
    )
    .await;
    assert!(!output.is_error, "{}", output.text);

    let result: Value = serde_json::from_str(&output.text).unwrap();
    assert_eq!(result["type"], "automation");
    let trigger = &result["dependencies"]["triggers"][0];
    assert_eq!(trigger["entity_id"], "light.living_room");
    assert_eq!(trigger["type"], "state");
    assert_eq!(result["dependencies"]["services"], json!(["light.turn_on"]));
    assert_eq!(
        result["summary"],
        "Automation 'X' (automation.x) dependencies:\n\
         - Triggers: 1 entity(ies)\n\
         - Services: light.turn_on"
    );
}

#[tokio::test]
async fn test_non_rule_entity_is_rejected_without_calls() {
    let backend = backend(house());
    let ctx = RequestContext::background();

    let output = get_entity_dependencies(
        &introspector(&backend),
        &ctx,
        json!({"entity_id": "light.x"}),
    )
    .await;
    assert!(output.is_error);
    assert!(output.text.contains("must be an automation or script"));

    let output = get_entity_dependencies(&introspector(&backend), &ctx, json!({})).await;
    assert!(output.is_error);
    assert!(output.text.contains("entity_id is required"));

    assert_eq!(backend.total_calls(), 0);
}

#[tokio::test]
async fn test_legacy_keys_and_conditions() {
    let backend = backend(house());
    let ctx = RequestContext::background();

    let deps = introspector(&backend)
        .entity_dependencies(&ctx, "automation.guard")
        .await
        .unwrap();

    assert_eq!(deps.owner, DependencyOwner::Automation);
    assert_eq!(deps.friendly_name, "Guard");
    assert!(deps.dependencies.triggers.is_empty());
    assert_eq!(deps.dependencies.conditions.len(), 1);
    assert_eq!(deps.dependencies.conditions[0].dependency_type, "condition");
    assert_eq!(
        deps.dependencies.conditions[0].description.as_deref(),
        Some("state condition")
    );
    assert_eq!(deps.dependencies.services, vec!["notify.notify"]);
    assert_eq!(backend.call_count(BackendMethod::GetAutomation), 1);
}

#[tokio::test]
async fn test_script_dependencies() {
    let backend = backend(house());
    let ctx = RequestContext::background();

    let deps = introspector(&backend)
        .entity_dependencies(&ctx, "script.movie_night")
        .await
        .unwrap();

    assert_eq!(deps.owner, DependencyOwner::Script);
    let ids: Vec<&str> = deps
        .dependencies
        .actions
        .iter()
        .map(|e| e.entity_id.as_str())
        .collect();
    assert_eq!(ids, vec!["light.living_room", "media_player.tv"]);
    assert_eq!(
        deps.dependencies.services,
        vec!["light.turn_off", "media_player.turn_on"]
    );
    assert_eq!(
        deps.summary,
        "Script 'Movie Night' (script.movie_night) dependencies:\n\
         - Actions: 2 entity(ies)\n\
         - Services: light.turn_off, media_player.turn_on"
    );
    assert_eq!(backend.call_count(BackendMethod::GetState), 1);
}

#[tokio::test]
async fn test_script_areas_and_variables() {
    let backend = backend(json!({
        "states": [state("script.tidy", "off", json!({
            "variables": {"rooms": ["kitchen"]},
            "sequence": [
                {"variables": {"power": "max"}},
                {"action": "vacuum.start", "target": {"area_id": ["kitchen", "hall"], "device_id": "vac1"}}
            ]
        }))]
    }));
    let ctx = RequestContext::background();

    let deps = introspector(&backend)
        .entity_dependencies(&ctx, "script.tidy")
        .await
        .unwrap()
        .dependencies;

    assert!(deps.actions.is_empty());
    assert_eq!(deps.areas, vec!["hall", "kitchen"]);
    assert_eq!(deps.devices, vec!["vac1"]);
    assert_eq!(deps.variables, vec!["power", "rooms"]);
}

#[tokio::test]
async fn test_empty_rule_summary() {
    let backend = backend(json!({
        "states": [state("script.noop", "off", json!({"friendly_name": "Noop"}))]
    }));
    let ctx = RequestContext::background();

    let deps = introspector(&backend)
        .entity_dependencies(&ctx, "script.noop")
        .await
        .unwrap();
    assert!(deps.dependencies.is_empty());
    assert!(deps.summary.ends_with("- No dependencies found"));
}

#[tokio::test]
async fn test_mandatory_fetch_failures() {
    let backend = backend(json!({
        "states": [state("automation.bare", "on", json!({}))]
    }));
    let ctx = RequestContext::background();
    let introspector = introspector(&backend);

    let err = introspector
        .entity_dependencies(&ctx, "automation.bare")
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::MissingConfig(_)));
    assert_eq!(
        err.to_string(),
        "failed to get automation: automation.bare has no configuration"
    );

    let err = introspector
        .entity_dependencies(&ctx, "automation.nope")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "failed to get automation: automation.nope not found");

    let err = introspector
        .entity_dependencies(&ctx, "script.nope")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "failed to get script: script.nope not found");

    backend.fail_on(BackendMethod::GetAutomation, BackendError::request("HTTP 500"));
    let output = get_entity_dependencies(
        &introspector,
        &ctx,
        json!({"entity_id": "automation.bare"}),
    )
    .await;
    assert!(output.is_error);
    assert_eq!(output.text, "failed to get automation: HTTP 500");
}
