//! Decision units ("brains").
//!
//! Both brains implement [`Brain`]: take a [`Perception`] plus a read-only
//! grid, return an [`Action`], then learn from the [`Outcome`]. The
//! simulation holds them as an [`AgentBrain`] so the set is closed and
//! dispatch is static.
//!
//! Callers never downcast; brain internals they need for display or
//! logging come from [`Brain::describe_state`].

pub mod behavior_tree;
pub mod neural;

pub use behavior_tree::BehaviorTreeBrain;
pub use neural::NeuralBrain;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::action::{ACTION_COUNT, Action, Outcome};
use crate::config::BrainzConfig;
use crate::emotion::EmotionalState;
use crate::memory::MemoryCategory;
use crate::perception::Perception;
use crate::types::AgentId;
use crate::world::GridView;

/// Which brain implementation is driving an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrainKind {
    /// Priority-ordered need arbitration.
    #[default]
    RuleBased,
    /// Emotion-modulated vector pipeline.
    Neural,
}

impl BrainKind {
    /// Stable lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RuleBased => "rule_based",
            Self::Neural => "neural",
        }
    }
}

impl fmt::Display for BrainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view of a brain's internals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BrainState {
    /// Implementation.
    pub kind: BrainKind,
    /// Emotional state, for brains that have one.
    pub emotion: Option<EmotionalState>,
    /// Distribution behind the last decision, for brains that sample.
    pub action_probabilities: Option<[f32; ACTION_COUNT]>,
    /// Categories of currently salient memories.
    pub salient_memories: Vec<MemoryCategory>,
    /// Number of stored memories.
    pub memory_count: usize,
    /// Number of stored experiences.
    pub replay_len: usize,
    /// Number of known peers.
    pub relationship_count: usize,
    /// Active policy name, for brains with a policy.
    pub policy: Option<String>,
}

/// Significance above which a memory counts as salient.
pub const SALIENCE_THRESHOLD: f32 = 0.5;

/// A decision unit.
pub trait Brain {
    /// Choose an action. Never fails; missing targets degrade to exploring,
    /// idling, or resting in place.
    fn decide(&mut self, perception: &Perception, grid: &dyn GridView) -> Action;

    /// Learn from what happened after the last action.
    fn on_outcome(&mut self, outcome: &Outcome);

    /// Snapshot of internals for display and logging.
    fn describe_state(&self) -> BrainState;

    /// Which implementation this is.
    fn kind(&self) -> BrainKind;
}

/// The brain an agent owns.
#[derive(Debug)]
pub enum AgentBrain {
    /// Rule-based brain.
    RuleBased(BehaviorTreeBrain),
    /// Vector brain.
    Neural(Box<NeuralBrain>),
}

impl AgentBrain {
    /// Build a brain of `kind` for `owner`, seeding its random stream with
    /// `seed`.
    #[must_use]
    pub fn from_config(kind: BrainKind, owner: AgentId, seed: u64, config: &BrainzConfig) -> Self {
        match kind {
            BrainKind::RuleBased => Self::RuleBased(BehaviorTreeBrain::new(owner, seed, config)),
            BrainKind::Neural => Self::Neural(Box::new(NeuralBrain::new(owner, seed, config))),
        }
    }

    fn inner(&self) -> &dyn Brain {
        match self {
            Self::RuleBased(b) => b,
            Self::Neural(b) => b.as_ref(),
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Brain {
        match self {
            Self::RuleBased(b) => b,
            Self::Neural(b) => b.as_mut(),
        }
    }
}

impl Brain for AgentBrain {
    fn decide(&mut self, perception: &Perception, grid: &dyn GridView) -> Action {
        self.inner_mut().decide(perception, grid)
    }

    fn on_outcome(&mut self, outcome: &Outcome) {
        self.inner_mut().on_outcome(outcome);
    }

    fn describe_state(&self) -> BrainState {
        self.inner().describe_state()
    }

    fn kind(&self) -> BrainKind {
        self.inner().kind()
    }
}
