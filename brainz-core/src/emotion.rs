//! Valence–arousal–dominance emotional state of the vector brain.
//!
//! Each axis ranges from -1.0 to 1.0:
//! - **Valence**: unpleasant (-1) → pleasant (+1)
//! - **Arousal**: calm (-1) → agitated (+1)
//! - **Dominance**: helpless (-1) → in control (+1)
//!
//! Every mutation clamps, so the state never leaves its bounds.

use serde::{Deserialize, Serialize};

use crate::action::{ACTION_COUNT, ActionKind};
use crate::inference::normalize;

/// Arousal above this favors active actions.
const AROUSED: f32 = 0.5;
/// Valence below this favors retreat.
const DISTRESSED: f32 = -0.5;

/// Emotional state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EmotionalState {
    /// Unpleasant (-1.0) to pleasant (+1.0).
    pub valence: f32,
    /// Calm (-1.0) to agitated (+1.0).
    pub arousal: f32,
    /// Helpless (-1.0) to in control (+1.0).
    pub dominance: f32,
}

impl EmotionalState {
    /// Neutral state.
    pub const NEUTRAL: Self = Self {
        valence: 0.0,
        arousal: 0.0,
        dominance: 0.0,
    };

    /// Create a state, clamping each axis to [-1, 1].
    #[must_use]
    pub fn new(valence: f32, arousal: f32, dominance: f32) -> Self {
        let mut s = Self {
            valence,
            arousal,
            dominance,
        };
        s.clamp();
        s
    }

    /// Clamp each axis to [-1, 1]. NaN collapses to neutral.
    pub fn clamp(&mut self) {
        for v in [&mut self.valence, &mut self.arousal, &mut self.dominance] {
            *v = if v.is_nan() { 0.0 } else { v.clamp(-1.0, 1.0) };
        }
    }

    /// Shift each axis and clamp.
    pub fn nudge(&mut self, valence: f32, arousal: f32, dominance: f32) {
        self.valence += valence;
        self.arousal += arousal;
        self.dominance += dominance;
        self.clamp();
    }

    /// Magnitude of the state vector.
    #[must_use]
    pub fn intensity(&self) -> f32 {
        (self.valence * self.valence + self.arousal * self.arousal + self.dominance * self.dominance)
            .sqrt()
    }

    /// Euclidean distance to another state.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f32 {
        let dv = self.valence - other.valence;
        let da = self.arousal - other.arousal;
        let dd = self.dominance - other.dominance;
        (dv * dv + da * da + dd * dd).sqrt()
    }

    /// Reweight an action distribution by mood and renormalize.
    ///
    /// High arousal boosts Explore (×1.5) and Move (×1.3). Strongly negative
    /// valence boosts `SeekShelter` (×2.0) and Rest (×1.5).
    pub fn modulate(&self, probs: &mut [f32; ACTION_COUNT]) {
        if self.arousal > AROUSED {
            probs[ActionKind::Explore.index()] *= 1.5;
            probs[ActionKind::Move.index()] *= 1.3;
        }
        if self.valence < DISTRESSED {
            probs[ActionKind::SeekShelter.index()] *= 2.0;
            probs[ActionKind::Rest.index()] *= 1.5;
        }
        normalize(probs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_and_nudge_clamp() {
        let mut s = EmotionalState::new(3.0, -3.0, f32::NAN);
        assert_eq!(s, EmotionalState::new(1.0, -1.0, 0.0));
        s.nudge(-0.5, 5.0, -2.0);
        assert!((s.valence - 0.5).abs() < 1e-6);
        assert_eq!(s.arousal, 1.0);
        assert_eq!(s.dominance, -1.0);
    }

    #[test]
    fn calm_content_state_leaves_distribution_alone() {
        let mut probs = [1.0 / 9.0; ACTION_COUNT];
        EmotionalState::NEUTRAL.modulate(&mut probs);
        for p in probs {
            assert!((p - 1.0 / 9.0).abs() < 1e-6);
        }
    }

    #[test]
    fn arousal_boosts_active_actions() {
        let mut probs = [1.0 / 9.0; ACTION_COUNT];
        EmotionalState::new(0.0, 0.8, 0.0).modulate(&mut probs);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(probs[ActionKind::Explore.index()] > probs[ActionKind::Move.index()]);
        assert!(probs[ActionKind::Move.index()] > probs[ActionKind::Idle.index()]);
    }

    #[test]
    fn distress_boosts_shelter() {
        let mut probs = [1.0 / 9.0; ACTION_COUNT];
        EmotionalState::new(-0.9, 0.0, 0.0).modulate(&mut probs);
        let shelter = probs[ActionKind::SeekShelter.index()];
        let rest = probs[ActionKind::Rest.index()];
        let idle = probs[ActionKind::Idle.index()];
        assert!((shelter / idle - 2.0).abs() < 1e-4);
        assert!((rest / idle - 1.5).abs() < 1e-4);
    }

    #[test]
    fn intensity_and_distance() {
        let a = EmotionalState::new(0.6, 0.8, 0.0);
        assert!((a.intensity() - 1.0).abs() < 1e-6);
        assert!((a.distance(&EmotionalState::NEUTRAL) - 1.0).abs() < 1e-6);
    }
}
