//! Actions brains emit and the outcomes they are told about afterwards.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::needs::{NeedKind, Needs};
use crate::types::{AgentId, Cell, Vec2};

/// Number of action kinds; the length of every action distribution.
pub const ACTION_COUNT: usize = 9;

/// Discrete action vocabulary. The declaration order is the index order of
/// action probability vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Do nothing.
    #[default]
    Idle,
    /// Walk toward a target.
    Move,
    /// Head for food.
    Forage,
    /// Eat from the tile underfoot.
    Eat,
    /// Recover energy.
    Rest,
    /// Wander to a random point.
    Explore,
    /// Interact with a peer.
    Socialize,
    /// Build a shelter.
    BuildShelter,
    /// Head for cover.
    SeekShelter,
}

impl ActionKind {
    /// Every action kind in index order.
    pub const ALL: [Self; ACTION_COUNT] = [
        Self::Idle,
        Self::Move,
        Self::Forage,
        Self::Eat,
        Self::Rest,
        Self::Explore,
        Self::Socialize,
        Self::BuildShelter,
        Self::SeekShelter,
    ];

    /// Position of this kind in probability vectors.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Kind at a probability-vector index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Stable lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Move => "move",
            Self::Forage => "forage",
            Self::Eat => "eat",
            Self::Rest => "rest",
            Self::Explore => "explore",
            Self::Socialize => "socialize",
            Self::BuildShelter => "build_shelter",
            Self::SeekShelter => "seek_shelter",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decision: what to do and where.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Action {
    /// What to do.
    pub kind: ActionKind,
    /// Where to do it.
    pub target_position: Option<Vec2>,
    /// Whom to do it with.
    pub target_agent: Option<AgentId>,
    /// Planned route from the agent's cell to the target, start and goal
    /// inclusive. Empty when no route was planned.
    pub waypoints: Vec<Cell>,
}

impl Action {
    /// An action with no target.
    #[must_use]
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Idle in place.
    #[must_use]
    pub fn idle() -> Self {
        Self::new(ActionKind::Idle)
    }

    /// An action aimed at a position.
    #[must_use]
    pub fn toward(kind: ActionKind, target: Vec2) -> Self {
        Self {
            kind,
            target_position: Some(target),
            ..Self::default()
        }
    }

    /// Attach a target agent.
    #[must_use]
    pub fn with_agent(mut self, agent: AgentId) -> Self {
        self.target_agent = Some(agent);
        self
    }

    /// Attach a planned route.
    #[must_use]
    pub fn with_waypoints(mut self, waypoints: Vec<Cell>) -> Self {
        self.waypoints = waypoints;
        self
    }
}

/// What happened after an action was executed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Outcome {
    /// Signed change per drive. Negative means the need was relieved.
    pub need_deltas: BTreeMap<NeedKind, f32>,
    /// Free-form event tag, e.g. `"food"`, `"danger"`, `"social:cooperative"`.
    pub event: String,
    /// Peer involved in the event, if any.
    pub peer: Option<AgentId>,
}

impl Outcome {
    /// An outcome carrying only an event tag.
    #[must_use]
    pub fn event(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            ..Self::default()
        }
    }

    /// Build deltas from two need snapshots. Zero deltas are omitted.
    #[must_use]
    pub fn between(before: &Needs, after: &Needs, event: impl Into<String>) -> Self {
        let need_deltas = NeedKind::ALL
            .iter()
            .filter_map(|&k| {
                let d = after.get(k) - before.get(k);
                (d.abs() > f32::EPSILON).then_some((k, d))
            })
            .collect();
        Self {
            need_deltas,
            event: event.into(),
            peer: None,
        }
    }

    /// Attach a delta.
    #[must_use]
    pub fn with_delta(mut self, kind: NeedKind, delta: f32) -> Self {
        self.need_deltas.insert(kind, delta);
        self
    }

    /// Attach the peer involved.
    #[must_use]
    pub fn with_peer(mut self, peer: AgentId) -> Self {
        self.peer = Some(peer);
        self
    }

    /// Whether the event tag mentions `needle`.
    #[must_use]
    pub fn event_mentions(&self, needle: &str) -> bool {
        self.event.contains(needle)
    }
}
