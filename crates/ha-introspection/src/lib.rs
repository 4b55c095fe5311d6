//! Entity introspection for Home Assistant
//!
//! Answers two questions about a Home Assistant instance:
//!
//! - what refers to an entity ([`Introspector::analyze_entity`]): automations,
//!   scripts, scenes, groups, and rules that target the entity's area;
//! - what an automation or script depends on
//!   ([`Introspector::entity_dependencies`]): entities by phase, services,
//!   areas, devices and variables.
//!
//! Data comes from a [`HomeAssistantBackend`]; [`SnapshotBackend`] serves an
//! exported snapshot. The [`tools`] module wraps both operations as JSON tool
//! calls.

pub mod analysis;
pub mod area;
pub mod backend;
pub mod context;
pub mod dependencies;
pub mod error;
pub mod references;
pub mod search;
pub mod snapshot;
pub mod summary;
pub mod tools;

pub use analysis::{AnalyzerOptions, DependencyOwner, EntityAnalysis, EntityDependencies, Introspector};
pub use area::AreaResolver;
pub use backend::HomeAssistantBackend;
pub use context::{CancelHandle, RequestContext};
pub use dependencies::{DependencyCategories, DependencyEntry};
pub use error::{AnalysisError, AnalysisResult, BackendError};
pub use references::{
    AreaReference, AutomationReference, GroupReference, ReferenceFinder, References, RuleKind,
    SceneReference, ScriptReference,
};
pub use snapshot::{BackendMethod, Snapshot, SnapshotBackend, SnapshotError};
pub use tools::ToolOutput;
