//! Narrative summaries
//!
//! Deterministic plain-text renderings of analysis results. The wording is
//! relied on by callers, so changes here are output changes.

use ha_core::State;

use crate::dependencies::DependencyCategories;
use crate::references::References;

/// Summary of an entity and everything that refers to it
pub fn entity_summary(entity: &State, domain: &str, references: &References) -> String {
    let mut lines = vec![format!(
        "{} ({}) is a {} entity, currently '{}'.",
        entity.friendly_name(),
        entity.entity_id,
        domain,
        entity.state
    )];

    if references.total_references == 0 {
        lines.push("It is not referenced by any automations, scripts, or scenes.".to_string());
    } else {
        let counts = [
            (references.automations.len(), "automation(s)"),
            (references.scripts.len(), "script(s)"),
            (references.scenes.len(), "scene(s)"),
            (references.groups.len(), "group(s)"),
            (references.areas.len(), "area rule(s)"),
        ];
        let parts: Vec<String> = counts
            .iter()
            .filter(|(count, _)| *count > 0)
            .map(|(count, label)| format!("{count} {label}"))
            .collect();

        lines.push(format!(
            "It is referenced by {} item(s): {}.",
            references.total_references,
            parts.join(", ")
        ));
    }

    for automation in &references.automations {
        let phases: Vec<&str> = automation.used_in.iter().map(|p| p.as_str()).collect();
        lines.push(format!(
            "- Automation '{}' uses it in: {}",
            automation.friendly_name,
            phases.join(", ")
        ));
    }

    lines.join("\n")
}

/// Summary of an automation's or script's dependencies.
///
/// `kind` is the capitalized owner label, "Automation" or "Script".
pub fn dependency_summary(
    kind: &str,
    friendly_name: &str,
    entity_id: &str,
    dependencies: &DependencyCategories,
) -> String {
    let mut lines = vec![format!("{kind} '{friendly_name}' ({entity_id}) dependencies:")];

    let entity_counts = [
        ("Triggers", dependencies.triggers.len()),
        ("Conditions", dependencies.conditions.len()),
        ("Actions", dependencies.actions.len()),
    ];
    for (label, count) in entity_counts {
        if count > 0 {
            lines.push(format!("- {label}: {count} entity(ies)"));
        }
    }

    if !dependencies.services.is_empty() {
        lines.push(format!("- Services: {}", dependencies.services.join(", ")));
    }
    if !dependencies.areas.is_empty() {
        lines.push(format!("- Areas: {}", dependencies.areas.join(", ")));
    }

    if lines.len() == 1 {
        lines.push("- No dependencies found".to_string());
    }

    lines.join("\n")
}
