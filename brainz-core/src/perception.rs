//! The read-only snapshot a brain receives each decision.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::memory::MemoryCategory;
use crate::needs::Needs;
use crate::types::{AgentId, Cell, Tick, Vec2};
use crate::world::TerrainKind;

/// Current weather.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    /// Fair weather.
    #[default]
    Clear,
    /// Rain.
    Rain,
    /// Storm.
    Storm,
}

impl Weather {
    /// Rain or storm.
    #[must_use]
    pub fn is_wet(self) -> bool {
        matches!(self, Self::Rain | Self::Storm)
    }

    /// Stable lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Rain => "rain",
            Self::Storm => "storm",
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an agent knows about its surroundings at one tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Perception {
    /// Agent position.
    pub position: Vec2,
    /// Simulation tick of this snapshot.
    pub tick: Tick,
    /// Tiles in view with their terrain.
    pub nearby_tiles: Vec<(Cell, TerrainKind)>,
    /// Peers in view with their positions.
    pub nearby_agents: Vec<(AgentId, Vec2)>,
    /// Drive state.
    pub needs: Needs,
    /// Weather.
    pub weather: Weather,
    /// Time of day in [0, 1).
    pub time_of_day: f32,
    /// Categories of salient memories surfaced for this decision.
    pub memory_recalls: Vec<MemoryCategory>,
}

impl Perception {
    /// Tiles in view matching `predicate`.
    pub fn tiles_where<'a>(
        &'a self,
        predicate: impl Fn(TerrainKind) -> bool + 'a,
    ) -> impl Iterator<Item = Cell> + 'a {
        self.nearby_tiles
            .iter()
            .filter(move |(_, t)| predicate(*t))
            .map(|(c, _)| *c)
    }

    /// Number of tiles in view matching `predicate`.
    pub fn count_tiles(&self, predicate: impl Fn(TerrainKind) -> bool) -> usize {
        self.tiles_where(predicate).count()
    }

    /// Nearest tile in view matching `predicate`, by Euclidean distance from
    /// the agent. Ties keep the first tile listed.
    pub fn nearest_tile(&self, predicate: impl Fn(TerrainKind) -> bool) -> Option<Cell> {
        let mut best: Option<(Cell, f32)> = None;
        for cell in self.tiles_where(predicate) {
            let d = self.position.distance(cell.to_vec2());
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((cell, d));
            }
        }
        best.map(|(c, _)| c)
    }

    /// Nearest peer in view. Ties keep the first peer listed.
    #[must_use]
    pub fn nearest_agent(&self) -> Option<(AgentId, Vec2)> {
        let mut best: Option<((AgentId, Vec2), f32)> = None;
        for &(id, pos) in &self.nearby_agents {
            let d = self.position.distance(pos);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some(((id, pos), d));
            }
        }
        best.map(|(a, _)| a)
    }
}
