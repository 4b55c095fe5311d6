//! Snapshot backend
//!
//! An in-memory [`HomeAssistantBackend`] over an exported snapshot of a Home
//! Assistant instance. Used by the `ha-inspect` CLI for offline analysis and
//! by tests, which can count calls, inject failures and add latency.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use ha_automation::{Automation, AutomationConfig, Scene, Script};
use ha_core::{domains, State};
use ha_registries::{DeviceEntry, EntityEntry};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::backend::HomeAssistantBackend;
use crate::context::RequestContext;
use crate::error::BackendError;

/// Errors loading a snapshot document
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON snapshot {path}: {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse YAML snapshot {path}: {source}")]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Exported state of a Home Assistant instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current state of every entity, automations and scripts included
    #[serde(default)]
    pub states: Vec<State>,

    /// Automation configurations keyed by automation entity id
    #[serde(default)]
    pub automations: IndexMap<String, AutomationConfig>,

    #[serde(default)]
    pub entity_registry: Vec<EntityEntry>,

    #[serde(default)]
    pub device_registry: Vec<DeviceEntry>,

    /// Recorded states keyed by entity id, oldest first
    #[serde(default)]
    pub history: IndexMap<String, Vec<State>>,
}

impl Snapshot {
    /// Load a snapshot file; `.yaml`/`.yml` files are YAML, anything else JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let snapshot: Self = if is_yaml {
            serde_yaml::from_str(&content).map_err(|source| SnapshotError::ParseYaml {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            serde_json::from_str(&content).map_err(|source| SnapshotError::ParseJson {
                path: path.to_path_buf(),
                source,
            })?
        };

        debug!(
            path = %path.display(),
            states = snapshot.states.len(),
            automations = snapshot.automations.len(),
            "Loaded snapshot"
        );
        Ok(snapshot)
    }

    fn state(&self, entity_id: &str) -> Option<&State> {
        self.states.iter().find(|s| s.entity_id == entity_id)
    }

    fn states_in(&self, domain: &'static str) -> impl Iterator<Item = &State> {
        self.states.iter().filter(move |s| s.domain() == domain)
    }
}

/// Backend operations, for call accounting and failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendMethod {
    GetState,
    ListAutomations,
    GetAutomation,
    ListScripts,
    ListScenes,
    GetStates,
    GetEntityRegistry,
    GetDeviceRegistry,
    GetHistory,
}

type CallHook = Arc<dyn Fn(BackendMethod) + Send + Sync>;

/// [`HomeAssistantBackend`] serving a [`Snapshot`]
pub struct SnapshotBackend {
    snapshot: Snapshot,
    calls: DashMap<BackendMethod, usize>,
    failures: DashMap<BackendMethod, BackendError>,
    latency: Option<Duration>,
    on_call: Option<CallHook>,
}

impl SnapshotBackend {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            calls: DashMap::new(),
            failures: DashMap::new(),
            latency: None,
            on_call: None,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        Snapshot::load(path).map(Self::new)
    }

    /// Delay every call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Run `hook` at the start of every call
    pub fn with_call_hook(mut self, hook: impl Fn(BackendMethod) + Send + Sync + 'static) -> Self {
        self.on_call = Some(Arc::new(hook));
        self
    }

    /// Make every call to `method` fail with `error`
    pub fn fail_on(&self, method: BackendMethod, error: BackendError) {
        self.failures.insert(method, error);
    }

    pub fn clear_failures(&self) {
        self.failures.clear();
    }

    pub fn call_count(&self, method: BackendMethod) -> usize {
        self.calls.get(&method).map(|count| *count).unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.iter().map(|entry| *entry.value()).sum()
    }

    /// Account for a call and apply latency and injected failures
    async fn enter(&self, ctx: &RequestContext, method: BackendMethod) -> Result<(), BackendError> {
        ctx.check()?;
        *self.calls.entry(method).or_insert(0) += 1;
        trace!(?method, "Snapshot backend call");

        if let Some(hook) = &self.on_call {
            hook(method);
        }
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.failures.get(&method) {
            Some(error) => Err(error.value().clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl HomeAssistantBackend for SnapshotBackend {
    async fn get_state(&self, ctx: &RequestContext, entity_id: &str) -> Result<State, BackendError> {
        self.enter(ctx, BackendMethod::GetState).await?;
        self.snapshot
            .state(entity_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(entity_id.to_string()))
    }

    async fn list_automations(&self, ctx: &RequestContext) -> Result<Vec<Automation>, BackendError> {
        self.enter(ctx, BackendMethod::ListAutomations).await?;
        Ok(self
            .snapshot
            .states_in(domains::AUTOMATION)
            .map(Automation::from_state)
            .collect())
    }

    async fn get_automation(
        &self,
        ctx: &RequestContext,
        entity_id: &str,
    ) -> Result<Automation, BackendError> {
        self.enter(ctx, BackendMethod::GetAutomation).await?;
        let state = self
            .snapshot
            .state(entity_id)
            .filter(|s| s.domain() == domains::AUTOMATION)
            .ok_or_else(|| BackendError::NotFound(entity_id.to_string()))?;

        let automation = Automation::from_state(state);
        Ok(match self.snapshot.automations.get(entity_id) {
            Some(config) => automation.with_config(config.clone()),
            None => automation,
        })
    }

    async fn list_scripts(&self, ctx: &RequestContext) -> Result<Vec<Script>, BackendError> {
        self.enter(ctx, BackendMethod::ListScripts).await?;
        Ok(self
            .snapshot
            .states_in(domains::SCRIPT)
            .cloned()
            .map(Script::from)
            .collect())
    }

    async fn list_scenes(&self, ctx: &RequestContext) -> Result<Vec<Scene>, BackendError> {
        self.enter(ctx, BackendMethod::ListScenes).await?;
        Ok(self
            .snapshot
            .states_in(domains::SCENE)
            .cloned()
            .map(Scene::from)
            .collect())
    }

    async fn get_states(&self, ctx: &RequestContext) -> Result<Vec<State>, BackendError> {
        self.enter(ctx, BackendMethod::GetStates).await?;
        Ok(self.snapshot.states.clone())
    }

    async fn get_entity_registry(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<EntityEntry>, BackendError> {
        self.enter(ctx, BackendMethod::GetEntityRegistry).await?;
        Ok(self.snapshot.entity_registry.clone())
    }

    async fn get_device_registry(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<DeviceEntry>, BackendError> {
        self.enter(ctx, BackendMethod::GetDeviceRegistry).await?;
        Ok(self.snapshot.device_registry.clone())
    }

    async fn get_history(
        &self,
        ctx: &RequestContext,
        entity_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<State>, BackendError> {
        self.enter(ctx, BackendMethod::GetHistory).await?;
        Ok(self
            .snapshot
            .history
            .get(entity_id)
            .map(|states| {
                states
                    .iter()
                    .filter(|s| s.last_changed >= start && s.last_changed <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
