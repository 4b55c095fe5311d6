//! Automation, script and scene snapshots
//!
//! This crate provides the configuration-bearing entities the introspection
//! engine walks.
//!
//! # Architecture
//!
//! ```text
//! AUTOMATION = TRIGGER → CONDITIONS → ACTIONS
//! SCRIPT     = ACTIONS
//! SCENE      = [entity_id, ...]
//! ```
//!
//! # Key Types
//!
//! - [`Automation`] - Automation entity plus its fetched configuration
//! - [`AutomationConfig`] - Triggers, conditions and actions as untyped trees
//! - [`Script`] - Script entity with its action sequence attribute
//! - [`Scene`], [`Group`] - Flat membership lists

pub mod automation;
pub mod scene;
pub mod script;

pub use automation::{Automation, AutomationConfig, Phase};
pub use scene::{Group, Scene};
pub use script::Script;
