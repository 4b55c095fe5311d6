//! Analysis orchestration
//!
//! [`Introspector`] validates a request, drives the reference finder or the
//! dependency extractor against the backend, and assembles the structured
//! result together with its narrative summary.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use ha_automation::Script;
use ha_core::{domains, EntityId, State};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::backend::HomeAssistantBackend;
use crate::context::RequestContext;
use crate::dependencies::{automation_dependencies, script_dependencies, DependencyCategories};
use crate::error::{optional, AnalysisError, AnalysisResult};
use crate::references::{ReferenceFinder, References};
use crate::summary;

/// Tunables for entity analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerOptions {
    /// How far back history is fetched
    pub history_window: Duration,
    /// Maximum number of history entries kept
    pub history_limit: usize,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            history_window: Duration::hours(24),
            history_limit: 20,
        }
    }
}

/// Result of analyzing one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityAnalysis {
    pub entity: State,
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_id: Option<String>,
    pub references: References,
    /// Present only when history was requested; empty if unavailable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<State>>,
    pub summary: String,
}

/// What kind of rule a dependency report describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyOwner {
    Automation,
    Script,
}

impl DependencyOwner {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Automation => "Automation",
            Self::Script => "Script",
        }
    }
}

impl fmt::Display for DependencyOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of a dependency report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDependencies {
    pub entity_id: String,
    #[serde(rename = "type")]
    pub owner: DependencyOwner,
    pub friendly_name: String,
    pub dependencies: DependencyCategories,
    pub summary: String,
}

/// Validate a required entity id parameter
fn require_entity_id(entity_id: &str) -> AnalysisResult<EntityId> {
    if entity_id.is_empty() {
        return Err(AnalysisError::validation("entity_id is required"));
    }
    EntityId::parse(entity_id)
        .map_err(|err| AnalysisError::validation(format!("invalid entity_id '{entity_id}': {err}")))
}

/// Which rule kind a dependency request names, checked before any parsing
fn dependency_owner(entity_id: &str) -> AnalysisResult<DependencyOwner> {
    if entity_id.is_empty() {
        return Err(AnalysisError::validation("entity_id is required"));
    }
    let owner = match entity_id.split_once('.') {
        Some((domains::AUTOMATION, _)) => DependencyOwner::Automation,
        Some((domains::SCRIPT, _)) => DependencyOwner::Script,
        _ => {
            return Err(AnalysisError::validation(format!(
                "entity_id must be an automation or script (automation.* or script.*), got '{entity_id}'"
            )))
        }
    };
    require_entity_id(entity_id)?;
    Ok(owner)
}

/// Entity introspection engine
///
/// Stateless between requests: every call fetches fresh data from the
/// backend under the caller's [`RequestContext`].
#[derive(Clone)]
pub struct Introspector {
    backend: Arc<dyn HomeAssistantBackend>,
    options: AnalyzerOptions,
}

impl Introspector {
    pub fn new(backend: Arc<dyn HomeAssistantBackend>) -> Self {
        Self::with_options(backend, AnalyzerOptions::default())
    }

    pub fn with_options(backend: Arc<dyn HomeAssistantBackend>, options: AnalyzerOptions) -> Self {
        Self { backend, options }
    }

    /// Analyze an entity: its state, area, references and optionally history
    #[instrument(skip(self, ctx))]
    pub async fn analyze_entity(
        &self,
        ctx: &RequestContext,
        entity_id: &str,
        include_history: bool,
    ) -> AnalysisResult<EntityAnalysis> {
        let id = require_entity_id(entity_id)?;
        let backend = self.backend.as_ref();

        let entity = ctx
            .run(backend.get_state(ctx, id.as_str()))
            .await
            .map_err(|err| AnalysisError::mandatory(err, AnalysisError::EntityFetch))?;

        let scan = ReferenceFinder::new(backend, ctx)
            .find_all(id.as_str())
            .await?;

        let history = if include_history {
            Some(self.recent_history(ctx, id.as_str()).await?)
        } else {
            None
        };

        let domain = id.domain().to_string();
        let summary = summary::entity_summary(&entity, &domain, &scan.references);

        info!(
            total_references = scan.references.total_references,
            "Entity analysis complete"
        );

        Ok(EntityAnalysis {
            entity,
            domain,
            area_id: scan.area_id,
            references: scan.references,
            history,
            summary,
        })
    }

    /// History over the configured window, truncated to the configured limit
    async fn recent_history(&self, ctx: &RequestContext, entity_id: &str) -> AnalysisResult<Vec<State>> {
        let end = Utc::now();
        // A window reaching past the earliest representable time starts there
        let start = end
            .checked_sub_signed(self.options.history_window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let fetched = optional(
            ctx.run(self.backend.get_history(ctx, entity_id, start, end))
                .await,
            "history",
        )?;

        let mut history = fetched.unwrap_or_default();
        if history.len() > self.options.history_limit {
            debug!(
                available = history.len(),
                limit = self.options.history_limit,
                "Truncating history"
            );
            history.truncate(self.options.history_limit);
        }
        Ok(history)
    }

    /// Report what an automation or script depends on
    #[instrument(skip(self, ctx))]
    pub async fn entity_dependencies(
        &self,
        ctx: &RequestContext,
        entity_id: &str,
    ) -> AnalysisResult<EntityDependencies> {
        let owner = dependency_owner(entity_id)?;
        let backend = self.backend.as_ref();

        let (friendly_name, dependencies) = match owner {
            DependencyOwner::Automation => {
                let automation = ctx
                    .run(backend.get_automation(ctx, entity_id))
                    .await
                    .map_err(|err| AnalysisError::mandatory(err, AnalysisError::AutomationFetch))?;
                let config = automation
                    .config
                    .as_ref()
                    .ok_or_else(|| AnalysisError::MissingConfig(entity_id.to_string()))?;
                (automation.friendly_name.clone(), automation_dependencies(config))
            }
            DependencyOwner::Script => {
                let script = ctx
                    .run(backend.get_state(ctx, entity_id))
                    .await
                    .map(Script::from)
                    .map_err(|err| AnalysisError::mandatory(err, AnalysisError::ScriptFetch))?;
                (script.friendly_name().to_string(), script_dependencies(&script))
            }
        };

        let summary =
            summary::dependency_summary(owner.label(), &friendly_name, entity_id, &dependencies);

        info!(%owner, "Dependency report complete");

        Ok(EntityDependencies {
            entity_id: entity_id.to_string(),
            owner,
            friendly_name,
            dependencies,
            summary,
        })
    }
}
