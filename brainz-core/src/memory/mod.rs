//! Agent memory.
//!
//! Two stores share one entry shape:
//!
//! - [`SpatialMemory`]: "Where things are." A bounded list of remembered
//!   places used by the rule-based brain, evicted by significance and
//!   faded linearly with age.
//! - [`EpisodicBuffer`]: "What stood out." A smaller buffer of embedded
//!   memories used by the vector brain, weighted by attention against the
//!   current situation.

pub mod episodic;
pub mod store;

pub use episodic::{EpisodicBuffer, EpisodicMemory};
pub use store::SpatialMemory;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Tick, Vec2};

/// What a remembered place holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryCategory {
    /// Food source.
    Food,
    /// Cover from weather or threats.
    Shelter,
    /// Where something bad happened.
    Danger,
    /// Where a peer was seen.
    Npc,
}

impl MemoryCategory {
    /// Every category, in one-hot encoding order.
    pub const ALL: [Self; 4] = [Self::Food, Self::Shelter, Self::Danger, Self::Npc];

    /// Stable lowercase tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Shelter => "shelter",
            Self::Danger => "danger",
            Self::Npc => "npc",
        }
    }

    /// Parse a tag produced by [`as_str`](Self::as_str).
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == tag)
    }

    /// Position of this category in one-hot encodings.
    #[must_use]
    pub fn one_hot_index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for MemoryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remembered place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// What is there.
    pub category: MemoryCategory,
    /// Where it is.
    pub location: Vec2,
    /// Tick the memory was formed.
    pub timestamp: Tick,
    /// How much the memory matters, in [floor, 1].
    pub significance: f32,
}

impl MemoryEntry {
    /// Ticks elapsed since formation. Zero if `now` precedes it.
    #[must_use]
    pub fn age(&self, now: Tick) -> Tick {
        now.saturating_sub(self.timestamp)
    }
}
