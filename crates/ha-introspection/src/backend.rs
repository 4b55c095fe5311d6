//! Backend Trait
//!
//! Defines the read access the introspection engine needs from Home
//! Assistant. The transport (REST, WebSocket, an exported snapshot) is up to
//! the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ha_automation::{Automation, Scene, Script};
use ha_core::State;
use ha_registries::{DeviceEntry, EntityEntry};

use crate::context::RequestContext;
use crate::error::BackendError;

/// Read-only view of a Home Assistant instance
///
/// Each call is independent and stateless. Implementations should honor the
/// context's cancellation and deadline; the engine additionally abandons any
/// call whose context ends.
#[async_trait]
pub trait HomeAssistantBackend: Send + Sync {
    /// Current state of one entity
    async fn get_state(&self, ctx: &RequestContext, entity_id: &str)
        -> Result<State, BackendError>;

    /// All automation entities, without their configuration
    async fn list_automations(&self, ctx: &RequestContext)
        -> Result<Vec<Automation>, BackendError>;

    /// One automation including its trigger/condition/action configuration
    async fn get_automation(
        &self,
        ctx: &RequestContext,
        entity_id: &str,
    ) -> Result<Automation, BackendError>;

    /// All script entities, with their sequence attribute
    async fn list_scripts(&self, ctx: &RequestContext) -> Result<Vec<Script>, BackendError>;

    /// All scene entities, with their member list attribute
    async fn list_scenes(&self, ctx: &RequestContext) -> Result<Vec<Scene>, BackendError>;

    /// Current state of every entity
    async fn get_states(&self, ctx: &RequestContext) -> Result<Vec<State>, BackendError>;

    async fn get_entity_registry(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<EntityEntry>, BackendError>;

    async fn get_device_registry(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<DeviceEntry>, BackendError>;

    /// Recorded states of one entity between `start` and `end`, oldest first
    async fn get_history(
        &self,
        ctx: &RequestContext,
        entity_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<State>, BackendError>;
}
