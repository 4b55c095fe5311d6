//! Core types for Home Assistant introspection
//!
//! This crate provides the fundamental types shared by the introspection
//! workspace: EntityId, the State snapshot, and the untyped ConfigValue tree
//! that automation, script and attribute configuration is carried in.

mod entity_id;
mod state;
mod value;

pub use entity_id::{split_domain, EntityId, EntityIdError};
pub use state::{State, ATTR_ENTITY_ID, ATTR_FRIENDLY_NAME};
pub use value::{ConfigMap, ConfigValue};

/// Entity domains the introspection engine treats specially
pub mod domains {
    pub const AUTOMATION: &str = "automation";
    pub const SCRIPT: &str = "script";
    pub const SCENE: &str = "scene";
    pub const GROUP: &str = "group";
}
