//! Home Assistant Registries
//!
//! Snapshot views of the registries the introspection engine needs:
//! - Entities (EntityRegistry)
//! - Devices (DeviceRegistry)
//!
//! Entries deserialize from the backend's registry listings; the registry
//! types index them for the lookups done while resolving areas.

pub mod device_registry;
pub mod entity_registry;

pub use device_registry::{DeviceEntry, DeviceRegistry};
pub use entity_registry::{DisabledBy, EntityEntry, EntityRegistry};
