//! Area resolution
//!
//! An entity's area is its own registry assignment, or else the area of the
//! device that owns it. Resolution is best-effort: registry failures mean
//! "no area", never an error.

use ha_registries::{DeviceRegistry, EntityRegistry};
use tracing::debug;

use crate::backend::HomeAssistantBackend;
use crate::context::RequestContext;
use crate::error::{optional, AnalysisResult};

/// Resolves entity areas through the entity and device registries
pub struct AreaResolver<'a> {
    backend: &'a dyn HomeAssistantBackend,
    ctx: &'a RequestContext,
}

impl<'a> AreaResolver<'a> {
    pub fn new(backend: &'a dyn HomeAssistantBackend, ctx: &'a RequestContext) -> Self {
        Self { backend, ctx }
    }

    /// Area of `entity_id`, if one can be determined.
    ///
    /// At most two hops: entity → area, else entity → device → area. Only
    /// cancellation or timeout produces an error.
    pub async fn resolve_area(&self, entity_id: &str) -> AnalysisResult<Option<String>> {
        let Some(entries) = optional(
            self.ctx
                .run(self.backend.get_entity_registry(self.ctx))
                .await,
            "entity registry",
        )?
        else {
            return Ok(None);
        };

        let entities = EntityRegistry::from_entries(entries);
        let Some(entry) = entities.get(entity_id) else {
            debug!(entity_id, "Entity not in registry, no area");
            return Ok(None);
        };

        if let Some(area_id) = entry.direct_area() {
            return Ok(Some(area_id.to_string()));
        }

        let Some(device_id) = entry.owning_device() else {
            return Ok(None);
        };

        let Some(devices) = optional(
            self.ctx
                .run(self.backend.get_device_registry(self.ctx))
                .await,
            "device registry",
        )?
        else {
            return Ok(None);
        };

        let area = DeviceRegistry::from_entries(devices)
            .get(device_id)
            .and_then(|device| device.area().map(String::from));
        debug!(entity_id, device_id, area = ?area, "Resolved area through device");
        Ok(area)
    }
}
