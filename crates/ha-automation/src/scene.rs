//! Scene and group snapshots
//!
//! Both are flat membership lists: the `entity_id` attribute names the
//! entities a scene sets or a group contains.

use ha_core::{domains, State};
use serde::{Deserialize, Serialize};

/// A scene entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scene(pub State);

impl Scene {
    pub fn entity_id(&self) -> &str {
        &self.0.entity_id
    }

    pub fn friendly_name(&self) -> &str {
        self.0.friendly_name()
    }

    /// Entities the scene sets
    pub fn members(&self) -> Vec<&str> {
        self.0.member_entity_ids()
    }

    /// Exact membership test, no tree search
    pub fn contains(&self, entity_id: &str) -> bool {
        self.members().contains(&entity_id)
    }
}

impl From<State> for Scene {
    fn from(state: State) -> Self {
        Self(state)
    }
}

/// A group entity (any state in the `group` domain)
#[derive(Debug, Clone, Copy)]
pub struct Group<'a>(&'a State);

impl<'a> Group<'a> {
    /// View a state as a group if it belongs to the `group` domain
    pub fn from_state(state: &'a State) -> Option<Self> {
        (state.domain() == domains::GROUP).then_some(Self(state))
    }

    pub fn entity_id(&self) -> &'a str {
        &self.0.entity_id
    }

    pub fn friendly_name(&self) -> &'a str {
        self.0.friendly_name()
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.0.member_entity_ids().contains(&entity_id)
    }
}
