//! Reference finding
//!
//! Answers "what refers to this entity?" across five categories:
//! automations, scripts, scenes, groups, and automations/scripts that target
//! the entity's area. Each category tolerates its own backend failures.

use chrono::{DateTime, Utc};
use ha_automation::{Automation, AutomationConfig, Group, Phase, Scene, Script};
use ha_core::State;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::area::AreaResolver;
use crate::backend::HomeAssistantBackend;
use crate::context::RequestContext;
use crate::error::{optional, AnalysisError, AnalysisResult};
use crate::search;

/// An automation that refers to the entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationReference {
    pub entity_id: String,
    pub friendly_name: String,
    pub state: String,
    /// Matching phases, always in trigger, condition, action order
    pub used_in: Vec<Phase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_triggered: Option<DateTime<Utc>>,
}

/// A script whose sequence refers to the entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptReference {
    pub entity_id: String,
    pub friendly_name: String,
    /// Scripts only have an action phase
    pub used_in: Phase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneReference {
    pub entity_id: String,
    pub friendly_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupReference {
    pub entity_id: String,
    pub friendly_name: String,
}

/// Kind of rule an area reference was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Automation,
    Script,
}

/// An automation or script that targets the entity's area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaReference {
    pub area_id: String,
    pub entity_id: String,
    pub friendly_name: String,
    pub kind: RuleKind,
    pub used_in: Vec<Phase>,
}

/// Everything that refers to an entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct References {
    pub automations: Vec<AutomationReference>,
    pub scripts: Vec<ScriptReference>,
    pub scenes: Vec<SceneReference>,
    pub groups: Vec<GroupReference>,
    pub areas: Vec<AreaReference>,
    pub total_references: usize,
}

impl References {
    pub fn new(
        automations: Vec<AutomationReference>,
        scripts: Vec<ScriptReference>,
        scenes: Vec<SceneReference>,
        groups: Vec<GroupReference>,
        areas: Vec<AreaReference>,
    ) -> Self {
        let total_references =
            automations.len() + scripts.len() + scenes.len() + groups.len() + areas.len();
        Self {
            automations,
            scripts,
            scenes,
            groups,
            areas,
            total_references,
        }
    }
}

/// Phases of `config` in which `needle` is reachable through `key`
pub fn matching_phases(config: &AutomationConfig, key: &str, needle: &str) -> Vec<Phase> {
    Phase::ALL
        .into_iter()
        .filter(|phase| search::references_any(config.phase(*phase), key, needle))
        .collect()
}

/// Automations that use `entity_id`, in listing order
pub fn automation_references(entity_id: &str, automations: &[Automation]) -> Vec<AutomationReference> {
    automations
        .iter()
        .filter_map(|automation| {
            let config = automation.config.as_ref()?;
            let used_in = matching_phases(config, search::KEY_ENTITY_ID, entity_id);
            (!used_in.is_empty()).then(|| AutomationReference {
                entity_id: automation.entity_id.clone(),
                friendly_name: automation.friendly_name.clone(),
                state: automation.state.clone(),
                used_in,
                last_triggered: automation.last_triggered,
            })
        })
        .collect()
}

pub fn script_references(entity_id: &str, scripts: &[Script]) -> Vec<ScriptReference> {
    scripts
        .iter()
        .filter(|script| search::references_entity(script.sequence(), entity_id))
        .map(|script| ScriptReference {
            entity_id: script.entity_id().to_string(),
            friendly_name: script.friendly_name().to_string(),
            used_in: Phase::Action,
        })
        .collect()
}

pub fn scene_references(entity_id: &str, scenes: &[Scene]) -> Vec<SceneReference> {
    scenes
        .iter()
        .filter(|scene| scene.contains(entity_id))
        .map(|scene| SceneReference {
            entity_id: scene.entity_id().to_string(),
            friendly_name: scene.friendly_name().to_string(),
        })
        .collect()
}

pub fn group_references(entity_id: &str, states: &[State]) -> Vec<GroupReference> {
    states
        .iter()
        .filter_map(Group::from_state)
        .filter(|group| group.contains(entity_id))
        .map(|group| GroupReference {
            entity_id: group.entity_id().to_string(),
            friendly_name: group.friendly_name().to_string(),
        })
        .collect()
}

/// Automations, then scripts, that target `area_id`
pub fn area_references(area_id: &str, automations: &[Automation], scripts: &[Script]) -> Vec<AreaReference> {
    let from_automations = automations.iter().filter_map(|automation| {
        let config = automation.config.as_ref()?;
        let used_in = matching_phases(config, search::KEY_AREA_ID, area_id);
        (!used_in.is_empty()).then(|| AreaReference {
            area_id: area_id.to_string(),
            entity_id: automation.entity_id.clone(),
            friendly_name: automation.friendly_name.clone(),
            kind: RuleKind::Automation,
            used_in,
        })
    });

    let from_scripts = scripts
        .iter()
        .filter(|script| search::references_area(script.sequence(), area_id))
        .map(|script| AreaReference {
            area_id: area_id.to_string(),
            entity_id: script.entity_id().to_string(),
            friendly_name: script.friendly_name().to_string(),
            kind: RuleKind::Script,
            used_in: vec![Phase::Action],
        });

    from_automations.chain(from_scripts).collect()
}

/// References found for an entity, plus the area they were resolved through
#[derive(Debug, Clone, Default)]
pub struct ReferenceScan {
    pub references: References,
    pub area_id: Option<String>,
}

/// Runs every reference category against a backend for one request
pub struct ReferenceFinder<'a> {
    backend: &'a dyn HomeAssistantBackend,
    ctx: &'a RequestContext,
}

impl<'a> ReferenceFinder<'a> {
    pub fn new(backend: &'a dyn HomeAssistantBackend, ctx: &'a RequestContext) -> Self {
        Self { backend, ctx }
    }

    /// All automations with their configuration.
    ///
    /// Automations whose configuration cannot be fetched are left out.
    pub async fn load_automations(&self) -> AnalysisResult<Vec<Automation>> {
        let Some(listed) = optional(
            self.ctx.run(self.backend.list_automations(self.ctx)).await,
            "automations",
        )?
        else {
            return Ok(Vec::new());
        };

        let mut loaded = Vec::with_capacity(listed.len());
        for automation in listed {
            self.ctx.check().map_err(AnalysisError::aborted)?;

            let fetched = self
                .ctx
                .run(self.backend.get_automation(self.ctx, &automation.entity_id))
                .await;
            match optional(fetched, "automation config")? {
                Some(full) => loaded.push(full),
                None => debug!(entity_id = %automation.entity_id, "Skipping automation"),
            }
        }
        Ok(loaded)
    }

    pub async fn load_scripts(&self) -> AnalysisResult<Vec<Script>> {
        let scripts = optional(
            self.ctx.run(self.backend.list_scripts(self.ctx)).await,
            "scripts",
        )?;
        Ok(scripts.unwrap_or_default())
    }

    pub async fn find_scene_references(&self, entity_id: &str) -> AnalysisResult<Vec<SceneReference>> {
        let scenes = optional(
            self.ctx.run(self.backend.list_scenes(self.ctx)).await,
            "scenes",
        )?;
        Ok(scenes
            .map(|scenes| scene_references(entity_id, &scenes))
            .unwrap_or_default())
    }

    pub async fn find_group_references(&self, entity_id: &str) -> AnalysisResult<Vec<GroupReference>> {
        let states = optional(
            self.ctx.run(self.backend.get_states(self.ctx)).await,
            "groups",
        )?;
        Ok(states
            .map(|states| group_references(entity_id, &states))
            .unwrap_or_default())
    }

    /// Resolve the entity's area and find the rules targeting it
    pub async fn find_area_references(
        &self,
        entity_id: &str,
        automations: &[Automation],
        scripts: &[Script],
    ) -> AnalysisResult<(Option<String>, Vec<AreaReference>)> {
        let area_id = AreaResolver::new(self.backend, self.ctx)
            .resolve_area(entity_id)
            .await?;

        let references = match &area_id {
            Some(area_id) => area_references(area_id, automations, scripts),
            None => Vec::new(),
        };
        Ok((area_id, references))
    }

    /// Run every category. Automations and scripts are fetched once and
    /// shared between the direct and area scans.
    pub async fn find_all(&self, entity_id: &str) -> AnalysisResult<ReferenceScan> {
        let automations = self.load_automations().await?;
        let scripts = self.load_scripts().await?;
        let scenes = self.find_scene_references(entity_id).await?;
        let groups = self.find_group_references(entity_id).await?;
        let (area_id, areas) = self
            .find_area_references(entity_id, &automations, &scripts)
            .await?;

        let references = References::new(
            automation_references(entity_id, &automations),
            script_references(entity_id, &scripts),
            scenes,
            groups,
            areas,
        );

        debug!(
            entity_id,
            total = references.total_references,
            "Reference scan complete"
        );
        Ok(ReferenceScan {
            references,
            area_id,
        })
    }
}
