//! A self-contained world: grid, agents, and clock.

use brainz_core::brain::{AgentBrain, BrainKind};
use brainz_core::types::{AgentId, Tick, Vec2};
use brainz_core::world::TileGrid;
use tracing::debug;

use crate::components::Agent;
use crate::config::{Environment, SimConfig};
use crate::events::{DecisionRecord, SimEvent};
use crate::systems::{meetings, step};

/// Seconds in one simulated day.
pub const DAY_LENGTH: f32 = 600.0;

/// Grid, agents, and the shared clock.
#[derive(Debug)]
pub struct Simulation {
    grid: TileGrid,
    agents: Vec<Agent>,
    env: Environment,
    config: SimConfig,
    tick: Tick,
    seed: u64,
    next_id: u32,
    events: Vec<SimEvent>,
}

impl Simulation {
    /// An empty world on `grid`. Every spawned brain's random stream is
    /// derived from `seed` and its agent id.
    #[must_use]
    pub fn new(grid: TileGrid, config: SimConfig, seed: u64) -> Self {
        Self {
            grid,
            agents: Vec::new(),
            env: Environment::default(),
            config,
            tick: 0,
            seed,
            next_id: 1,
            events: Vec::new(),
        }
    }

    /// Add an agent with a fresh brain. Ids are assigned from 1 upward.
    pub fn spawn(&mut self, kind: BrainKind, position: Vec2) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        let seed = self.seed.wrapping_add(u64::from(id.0));
        self.agents
            .push(Agent::new(id, position, kind, seed, &self.config.core));
        id
    }

    /// Add an agent around an existing brain, for restored or custom brains.
    pub fn spawn_with_brain(&mut self, position: Vec2, brain: AgentBrain) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        self.agents.push(Agent::with_brain(id, position, brain));
        id
    }

    /// Advance one tick of `dt` seconds and return one record per agent.
    /// Meetings seen during the tick are available from [`Self::events`]
    /// until the next call.
    pub fn tick(&mut self, dt: f32) -> Vec<DecisionRecord> {
        let records = step(
            &mut self.agents,
            &mut self.grid,
            &self.env,
            self.tick,
            dt,
            &self.config,
        );
        self.events = meetings(&self.agents, self.tick, self.config.meet_distance);
        if !self.events.is_empty() {
            debug!(tick = self.tick, meetings = self.events.len(), "agents met");
        }

        self.tick += 1;
        self.env.advance(dt, DAY_LENGTH);
        records
    }

    /// World events from the most recent tick.
    #[must_use]
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Agents in spawn order.
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Look up an agent.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// Mutable agent lookup.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    /// The grid.
    #[must_use]
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Shared conditions.
    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Ticks completed.
    #[must_use]
    pub fn current_tick(&self) -> Tick {
        self.tick
    }
}
