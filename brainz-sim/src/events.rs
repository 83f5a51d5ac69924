//! Decision records and world events.
//!
//! Every decision produces one [`DecisionRecord`]; notable world events
//! (agents meeting) produce a [`SimEvent`]. Both serialize to single JSON
//! lines so a host can ship them wherever it keeps its logs.

use brainz_core::action::{Action, Outcome};
use brainz_core::brain::BrainKind;
use brainz_core::memory::MemoryCategory;
use brainz_core::needs::Needs;
use brainz_core::perception::{Perception, Weather};
use brainz_core::types::{AgentId, Tick, Vec2};
use serde::{Deserialize, Serialize};
use crate::error::Result;

/// Version of the record layout.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// What the agent saw, reduced to what analysis needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerceptionSummary {
    /// Agent position.
    pub position: Vec2,
    /// Drives at decision time.
    pub needs: Needs,
    /// Weather.
    pub weather: Weather,
    /// Time of day.
    pub time_of_day: f32,
    /// Tiles in view.
    pub visible_tiles: usize,
    /// Peers in view.
    pub nearby_agents: Vec<AgentId>,
    /// Salient memory categories.
    pub memory_recalls: Vec<MemoryCategory>,
}

impl From<&Perception> for PerceptionSummary {
    fn from(p: &Perception) -> Self {
        Self {
            position: p.position,
            needs: p.needs,
            weather: p.weather,
            time_of_day: p.time_of_day,
            visible_tiles: p.nearby_tiles.len(),
            nearby_agents: p.nearby_agents.iter().map(|(id, _)| *id).collect(),
            memory_recalls: p.memory_recalls.clone(),
        }
    }
}

/// One decision and what came of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Record layout version.
    pub schema_version: String,
    /// Tick of the decision.
    pub tick: Tick,
    /// Deciding agent.
    pub agent: AgentId,
    /// Brain implementation that decided.
    pub brain: BrainKind,
    /// Input summary.
    pub perception: PerceptionSummary,
    /// Chosen action.
    pub action: Action,
    /// Observed outcome.
    pub outcome: Outcome,
}

impl DecisionRecord {
    /// Build a record stamped with the current schema version.
    #[must_use]
    pub fn new(
        tick: Tick,
        agent: AgentId,
        brain: BrainKind,
        perception: &Perception,
        action: Action,
        outcome: Outcome,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            tick,
            agent,
            brain,
            perception: perception.into(),
            action,
            outcome,
        }
    }

    /// Single-line JSON encoding.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::SimError::Serialization`] if encoding fails.
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A world event worth logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum SimEvent {
    /// Two agents came within meeting distance.
    NpcMet {
        /// Tick of the meeting.
        tick: Tick,
        /// Lower agent id.
        first: AgentId,
        /// Higher agent id.
        second: AgentId,
        /// Distance between them.
        distance: f32,
    },
}

impl SimEvent {
    /// Single-line JSON encoding.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::SimError::Serialization`] if encoding fails.
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
