//! Per-agent state owned by the host.
//!
//! An [`Agent`] bundles a position, drives, a coarse [`Mood`] that scales
//! movement speed, and the [`AgentBrain`] that decides for it.

use std::fmt;

use brainz_core::action::Action;
use brainz_core::brain::{AgentBrain, BrainKind};
use brainz_core::config::BrainzConfig;
use brainz_core::needs::Needs;
use brainz_core::types::{AgentId, Vec2};
use brainz_core::world::GridView;
use serde::{Deserialize, Serialize};

/// Coarse mood derived from drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    /// Needs well met.
    Happy,
    /// Nothing pressing.
    #[default]
    Neutral,
    /// Needs building up.
    Anxious,
    /// Needs largely unmet.
    Sad,
    /// Curiosity dominates.
    Excited,
}

impl Mood {
    /// Mood for a drive state: the mean of hunger, energy, and social picks
    /// Happy (< 0.3), Neutral (< 0.5), Anxious (< 0.7) or Sad, and high
    /// curiosity overrides all of them with Excited.
    #[must_use]
    pub fn from_needs(needs: &Needs) -> Self {
        if needs.curiosity > 0.7 {
            return Self::Excited;
        }
        let avg = (needs.hunger + needs.energy + needs.social) / 3.0;
        if avg < 0.3 {
            Self::Happy
        } else if avg < 0.5 {
            Self::Neutral
        } else if avg < 0.7 {
            Self::Anxious
        } else {
            Self::Sad
        }
    }

    /// Movement speed multiplier.
    #[must_use]
    pub fn speed_multiplier(self) -> f32 {
        match self {
            Self::Happy | Self::Excited => 1.2,
            Self::Sad | Self::Anxious => 0.8,
            Self::Neutral => 1.0,
        }
    }

    /// Stable lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Neutral => "neutral",
            Self::Anxious => "anxious",
            Self::Sad => "sad",
            Self::Excited => "excited",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One simulated agent.
#[derive(Debug)]
pub struct Agent {
    /// Identity.
    pub id: AgentId,
    /// Continuous position in tile units.
    pub position: Vec2,
    /// Drive state.
    pub needs: Needs,
    /// Mood derived from `needs`.
    pub mood: Mood,
    /// Decision unit.
    pub brain: AgentBrain,
    /// Most recent decision.
    pub current_action: Action,
}

impl Agent {
    /// Create an agent with a fresh brain of `kind`.
    #[must_use]
    pub fn new(id: AgentId, position: Vec2, kind: BrainKind, seed: u64, config: &BrainzConfig) -> Self {
        Self::with_brain(id, position, AgentBrain::from_config(kind, id, seed, config))
    }

    /// Create an agent around an existing brain.
    #[must_use]
    pub fn with_brain(id: AgentId, position: Vec2, brain: AgentBrain) -> Self {
        let needs = Needs::default();
        Self {
            id,
            position,
            needs,
            mood: Mood::from_needs(&needs),
            brain,
            current_action: Action::idle(),
        }
    }

    /// Re-derive mood from the current drives.
    pub fn update_mood(&mut self) {
        self.mood = Mood::from_needs(&self.needs);
    }

    /// Move toward `target` at `speed` (scaled by mood) for `dt` seconds,
    /// snapping onto the target when it is within reach. The result is
    /// clamped to the grid.
    pub fn move_towards(&mut self, target: Vec2, speed: f32, dt: f32, grid: &dyn GridView) {
        let step = speed * self.mood.speed_multiplier() * dt;
        let distance = self.position.distance(target);
        self.position = if distance <= step {
            target
        } else {
            self.position + (target - self.position).normalized() * step
        };

        #[allow(clippy::cast_precision_loss)]
        let (max_x, max_y) = ((grid.width() - 1).max(0) as f32, (grid.height() - 1).max(0) as f32);
        self.position.x = self.position.x.clamp(0.0, max_x);
        self.position.y = self.position.y.clamp(0.0, max_y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brainz_core::world::{TerrainKind, TileGrid};

    #[test]
    fn mood_bands() {
        assert_eq!(Mood::from_needs(&Needs::new(0.1, 0.1, 0.1, 0.0, 1.0)), Mood::Happy);
        assert_eq!(Mood::from_needs(&Needs::new(0.4, 0.4, 0.4, 0.0, 1.0)), Mood::Neutral);
        assert_eq!(Mood::from_needs(&Needs::new(0.6, 0.6, 0.6, 0.0, 1.0)), Mood::Anxious);
        assert_eq!(Mood::from_needs(&Needs::new(0.9, 0.9, 0.9, 0.0, 1.0)), Mood::Sad);
        assert_eq!(Mood::from_needs(&Needs::new(0.9, 0.9, 0.9, 0.8, 1.0)), Mood::Excited);
    }

    #[test]
    fn speed_follows_mood() {
        assert!((Mood::Excited.speed_multiplier() - 1.2).abs() < f32::EPSILON);
        assert!((Mood::Anxious.speed_multiplier() - 0.8).abs() < f32::EPSILON);
        assert!((Mood::Neutral.speed_multiplier() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn movement_snaps_and_clamps() {
        let grid = TileGrid::new(10, 10, TerrainKind::Grass);
        let mut agent = Agent::new(
            AgentId(1),
            Vec2::new(5.0, 5.0),
            BrainKind::RuleBased,
            1,
            &BrainzConfig::default(),
        );
        agent.mood = Mood::Neutral;

        agent.move_towards(Vec2::new(5.5, 5.0), 10.0, 0.1, &grid);
        assert_eq!(agent.position, Vec2::new(5.5, 5.0));

        agent.move_towards(Vec2::new(50.0, 5.0), 10.0, 0.1, &grid);
        assert!((agent.position.x - 6.5).abs() < 1e-5);

        agent.move_towards(Vec2::new(-30.0, 5.0), 10.0, 10.0, &grid);
        assert_eq!(agent.position.x, 0.0);
    }
}
