//! Per-tick systems: perceive, decide, act, learn.
//!
//! Agents take turns in ascending id order. Each turn sees the world as
//! earlier turns in the same tick left it, so an agent that moves or eats
//! first is visible to everyone after it.

use brainz_core::action::{ActionKind, Outcome};
use brainz_core::brain::Brain;
use brainz_core::needs::NeedKind;
use brainz_core::perception::Perception;
use brainz_core::types::{AgentId, Cell, Tick, Vec2};
use brainz_core::world::{GridView, TileGrid};
use tracing::trace;

use crate::components::Agent;
use crate::config::{Environment, SimConfig};
use crate::events::{DecisionRecord, SimEvent};

/// Build an agent's perception: every in-bounds tile in the square of
/// half-width `perception_radius` around its cell, every other agent
/// strictly within `peer_radius`, and the categories its brain currently
/// finds salient.
#[must_use]
pub fn gather_perception(
    agent: &Agent,
    grid: &dyn GridView,
    peers: &[(AgentId, Vec2)],
    env: &Environment,
    tick: Tick,
    cfg: &SimConfig,
) -> Perception {
    let center = agent.position.cell();
    let r = cfg.perception_radius.max(0);
    let mut nearby_tiles = Vec::new();
    for y in center.y - r..=center.y + r {
        for x in center.x - r..=center.x + r {
            if grid.in_bounds(x, y) {
                nearby_tiles.push((Cell::new(x, y), grid.tile(x, y).terrain));
            }
        }
    }

    let nearby_agents = peers
        .iter()
        .filter(|(id, pos)| *id != agent.id && agent.position.distance(*pos) < cfg.peer_radius)
        .copied()
        .collect();

    Perception {
        position: agent.position,
        tick,
        nearby_tiles,
        nearby_agents,
        needs: agent.needs,
        weather: env.weather,
        time_of_day: env.time_of_day,
        memory_recalls: agent.brain.describe_state().salient_memories,
    }
}

/// Where a moving agent heads this tick: the first planned waypoint it is
/// not already standing on, else the action's target.
fn movement_target(agent: &Agent) -> Option<Vec2> {
    let here = agent.position.cell();
    let action = &agent.current_action;
    action
        .waypoints
        .iter()
        .find(|c| **c != here)
        .map(|c| c.to_vec2())
        .or(action.target_position)
}

/// Carry out the agent's current action for `dt` seconds. The returned
/// outcome holds the action's own need changes, its event tag, and the
/// peer involved.
pub fn execute_action(agent: &mut Agent, grid: &mut TileGrid, dt: f32, cfg: &SimConfig) -> Outcome {
    let before = agent.needs;
    let kind = agent.current_action.kind;
    let mut peer = None;

    let event = match kind {
        ActionKind::Move | ActionKind::Explore | ActionKind::Forage | ActionKind::SeekShelter => {
            if let Some(target) = movement_target(agent) {
                agent.move_towards(target, cfg.speed, dt, &*grid);
            }
            kind.as_str().to_string()
        }
        ActionKind::Eat => {
            let cell = agent
                .current_action
                .target_position
                .filter(|t| agent.position.distance(*t) <= cfg.eat_reach)
                .unwrap_or(agent.position)
                .cell();
            match grid.tile_mut(cell.x, cell.y) {
                Some(tile) if tile.has_food() => {
                    tile.food -= 1;
                    agent.needs.apply_delta(NeedKind::Hunger, -cfg.eat_relief);
                    "food".to_string()
                }
                _ => "nothing_to_eat".to_string(),
            }
        }
        ActionKind::Rest => {
            agent.needs.apply_delta(NeedKind::Energy, -cfg.rest_rate * dt);
            "rest".to_string()
        }
        ActionKind::Socialize => {
            agent.needs.apply_delta(NeedKind::Social, -cfg.socialize_rate * dt);
            match agent.current_action.target_agent {
                Some(other) => {
                    peer = Some(other);
                    "social:cooperative".to_string()
                }
                None => "social".to_string(),
            }
        }
        ActionKind::Idle | ActionKind::BuildShelter => kind.as_str().to_string(),
    };

    let mut outcome = Outcome::between(&before, &agent.needs, event);
    outcome.peer = peer;
    outcome
}

/// Run one tick for every agent in ascending id order: advance drives,
/// update mood, perceive, decide, act, and feed the outcome back to the
/// brain. Outcome deltas span the whole turn, drive growth included.
pub fn step(
    agents: &mut [Agent],
    grid: &mut TileGrid,
    env: &Environment,
    tick: Tick,
    dt: f32,
    cfg: &SimConfig,
) -> Vec<DecisionRecord> {
    let mut order: Vec<usize> = (0..agents.len()).collect();
    order.sort_by_key(|&i| agents[i].id);

    let mut records = Vec::with_capacity(agents.len());
    for i in order {
        let peers: Vec<(AgentId, Vec2)> = agents.iter().map(|a| (a.id, a.position)).collect();
        let agent = &mut agents[i];

        let before = agent.needs;
        agent.needs.update(dt);
        agent.update_mood();

        let perception = gather_perception(agent, &*grid, &peers, env, tick, cfg);
        let action = agent.brain.decide(&perception, &*grid);
        agent.current_action = action.clone();

        let effect = execute_action(agent, grid, dt, cfg);
        let mut outcome = Outcome::between(&before, &agent.needs, effect.event);
        outcome.peer = effect.peer;
        agent.brain.on_outcome(&outcome);

        trace!(
            agent = %agent.id,
            tick,
            action = %action.kind,
            event = %outcome.event,
            mood = %agent.mood,
            "agent turn"
        );
        records.push(DecisionRecord::new(
            tick,
            agent.id,
            agent.brain.kind(),
            &perception,
            action,
            outcome,
        ));
    }
    records
}

/// Pairs of agents strictly closer than `distance`, lower id first.
#[must_use]
pub fn meetings(agents: &[Agent], tick: Tick, distance: f32) -> Vec<SimEvent> {
    let mut sorted: Vec<&Agent> = agents.iter().collect();
    sorted.sort_by_key(|a| a.id);
    let mut events = Vec::new();
    for (i, a) in sorted.iter().enumerate() {
        for b in &sorted[i + 1..] {
            let d = a.position.distance(b.position);
            if d < distance {
                events.push(SimEvent::NpcMet {
                    tick,
                    first: a.id,
                    second: b.id,
                    distance: d,
                });
            }
        }
    }
    events
}
