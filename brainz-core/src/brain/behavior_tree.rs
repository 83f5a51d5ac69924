//! Rule-based brain: fixed-priority need arbitration.
//!
//! Evaluated top to bottom, first match wins:
//!
//! 1. Wet weather while safety is below its threshold → seek shelter.
//! 2. hunger > 0.7 → forage
//! 3. energy > 0.7 → rest
//! 4. safety > 0.7 → seek shelter
//! 5. social > 0.6 → socialize
//! 6. otherwise → explore
//!
//! Behaviors check remembered places first, then scan the grid, and
//! remember what they find. Every move toward a target carries an A* route
//! when one exists.

use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::{Brain, BrainKind, BrainState, SALIENCE_THRESHOLD};
use crate::action::{Action, ActionKind, Outcome};
use crate::config::{BehaviorConfig, BrainzConfig, MemoryConfig};
use crate::memory::{MemoryCategory, SpatialMemory};
use crate::pathfinding::{find_path, nearest_tile};
use crate::perception::Perception;
use crate::types::{AgentId, Tick, Vec2};
use crate::world::{GridView, TerrainKind};

/// Significance given to places found by scanning the grid.
const FOUND_SIGNIFICANCE: f32 = 1.0;

/// Rule-based brain with its own spatial memory.
#[derive(Debug)]
pub struct BehaviorTreeBrain {
    owner: AgentId,
    memory: SpatialMemory,
    rng: StdRng,
    behavior: BehaviorConfig,
    recall_radius: f32,
    recall_limit: usize,
    max_expansions: usize,
    last_position: Vec2,
    last_tick: Tick,
}

impl BehaviorTreeBrain {
    /// Create a brain for `owner` with a seeded random stream.
    #[must_use]
    pub fn new(owner: AgentId, seed: u64, config: &BrainzConfig) -> Self {
        Self::with_parts(owner, seed, &config.behavior, &config.memory, config.pathfinding.max_expansions)
    }

    fn with_parts(
        owner: AgentId,
        seed: u64,
        behavior: &BehaviorConfig,
        memory: &MemoryConfig,
        max_expansions: usize,
    ) -> Self {
        Self {
            owner,
            memory: SpatialMemory::new(memory),
            rng: StdRng::seed_from_u64(seed),
            behavior: behavior.clone(),
            recall_radius: memory.recall_radius,
            recall_limit: memory.recall_limit,
            max_expansions,
            last_position: Vec2::ZERO,
            last_tick: 0,
        }
    }

    /// The agent this brain belongs to.
    #[must_use]
    pub fn owner(&self) -> AgentId {
        self.owner
    }

    /// Spatial memory.
    #[must_use]
    pub fn memory(&self) -> &SpatialMemory {
        &self.memory
    }

    /// Mutable spatial memory, for seeding knowledge.
    pub fn memory_mut(&mut self) -> &mut SpatialMemory {
        &mut self.memory
    }

    // ---- Targeting ----

    /// A remembered place of `category` in recall range, else the nearest
    /// tile of `terrain` within `radius`, which is then remembered.
    fn locate(
        &mut self,
        p: &Perception,
        grid: &dyn GridView,
        category: MemoryCategory,
        terrain: TerrainKind,
        radius: f32,
    ) -> Option<Vec2> {
        if let Some(mem) =
            self.memory
                .recall_within(category, p.position, self.recall_radius, self.recall_limit)
        {
            return Some(mem.location);
        }
        let cell = nearest_tile(grid, p.position.cell(), radius, |t| t.terrain == terrain)?;
        let target = cell.to_vec2();
        self.memory.add_memory(category, target, p.tick, FOUND_SIGNIFICANCE);
        Some(target)
    }

    /// Action of `kind` toward `target`, with an A* route when one exists.
    fn routed(&self, kind: ActionKind, p: &Perception, grid: &dyn GridView, target: Vec2) -> Action {
        let path = find_path(grid, p.position.cell(), target.cell(), self.max_expansions);
        Action::toward(kind, target).with_waypoints(path)
    }

    // ---- Behaviors ----

    fn forage(&mut self, p: &Perception, grid: &dyn GridView) -> Action {
        let radius = self.behavior.forage_radius;
        match self.locate(p, grid, MemoryCategory::Food, TerrainKind::BerryBush, radius) {
            Some(target) if p.position.distance(target) < self.behavior.eat_distance => {
                Action::toward(ActionKind::Eat, target)
            }
            Some(target) => self.routed(ActionKind::Move, p, grid, target),
            None => self.explore(p, grid),
        }
    }

    fn rest(&mut self, p: &Perception, grid: &dyn GridView) -> Action {
        let radius = self.behavior.rest_radius;
        match self.locate(p, grid, MemoryCategory::Shelter, TerrainKind::Cave, radius) {
            Some(target) if p.position.distance(target) < self.behavior.rest_distance => {
                Action::new(ActionKind::Rest)
            }
            Some(target) => self.routed(ActionKind::Move, p, grid, target),
            None => Action::new(ActionKind::Rest),
        }
    }

    fn shelter(&mut self, p: &Perception, grid: &dyn GridView) -> Action {
        let cave = self.locate(
            p,
            grid,
            MemoryCategory::Shelter,
            TerrainKind::Cave,
            self.behavior.shelter_cave_radius,
        );
        let target = cave.or_else(|| {
            nearest_tile(grid, p.position.cell(), self.behavior.shelter_tree_radius, |t| {
                t.terrain == TerrainKind::Tree
            })
            .map(|c| c.to_vec2())
        });
        match target {
            Some(target) => self.routed(ActionKind::SeekShelter, p, grid, target),
            None => Action::idle(),
        }
    }

    fn socialize(&mut self, p: &Perception, grid: &dyn GridView) -> Action {
        let Some((peer, pos)) = p.nearest_agent() else {
            return self.explore(p, grid);
        };
        self.memory
            .add_memory(MemoryCategory::Npc, pos, p.tick, p.needs.social);
        if p.position.distance(pos) < self.behavior.socialize_distance {
            Action::toward(ActionKind::Socialize, pos).with_agent(peer)
        } else {
            self.routed(ActionKind::Move, p, grid, pos).with_agent(peer)
        }
    }

    fn explore(&mut self, p: &Perception, grid: &dyn GridView) -> Action {
        let outer = self.behavior.explore_radius.max(f32::EPSILON);
        for _ in 0..self.behavior.explore_attempts {
            let angle = self.rng.gen_range(0.0..TAU);
            let r = self.rng.gen_range(outer * 0.5..outer);
            let target = p.position + Vec2::new(angle.cos(), angle.sin()) * r;
            let cell = target.cell();
            if grid.is_walkable(cell.x, cell.y) {
                return Action::toward(ActionKind::Explore, target);
            }
        }
        Action::toward(ActionKind::Explore, p.position)
    }
}

impl Brain for BehaviorTreeBrain {
    fn decide(&mut self, p: &Perception, grid: &dyn GridView) -> Action {
        self.last_position = p.position;
        self.last_tick = p.tick;
        let needs = &p.needs;
        let b = &self.behavior;

        let action = if p.weather.is_wet() && needs.safety < b.weather_safety_threshold {
            self.shelter(p, grid)
        } else if needs.hunger > b.hunger_threshold {
            self.forage(p, grid)
        } else if needs.energy > b.energy_threshold {
            self.rest(p, grid)
        } else if needs.safety > b.threat_threshold {
            self.shelter(p, grid)
        } else if needs.social > b.social_threshold {
            self.socialize(p, grid)
        } else {
            self.explore(p, grid)
        };

        debug!(
            agent = %self.owner,
            tick = p.tick,
            urgent = needs.most_urgent_name(),
            action = %action.kind,
            "rule-based decision"
        );
        action
    }

    fn on_outcome(&mut self, outcome: &Outcome) {
        if outcome.event_mentions("danger") || outcome.event_mentions("attacked") {
            self.memory.add_memory(
                MemoryCategory::Danger,
                self.last_position,
                self.last_tick,
                FOUND_SIGNIFICANCE,
            );
        }
        self.memory.decay(self.last_tick);
    }

    fn describe_state(&self) -> BrainState {
        BrainState {
            kind: BrainKind::RuleBased,
            salient_memories: self.memory.salient(SALIENCE_THRESHOLD),
            memory_count: self.memory.len(),
            ..BrainState::default()
        }
    }

    fn kind(&self) -> BrainKind {
        BrainKind::RuleBased
    }
}
