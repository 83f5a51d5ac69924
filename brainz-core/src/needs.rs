//! Drive state ("needs") of an agent.
//!
//! Hunger, energy, social, and curiosity run from 0 (satisfied) to 1
//! (pressing). Safety is inverted: 0 is safe and 1 is threatened, so its
//! urgency is `1 - safety`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-second growth of each need.
const HUNGER_RATE: f32 = 0.05;
const ENERGY_RATE: f32 = 0.03;
const SOCIAL_RATE: f32 = 0.02;
const CURIOSITY_RATE: f32 = 0.01;
const SAFETY_RATE: f32 = -0.1;

/// One of the five drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeedKind {
    /// Food drive.
    Hunger,
    /// Fatigue drive.
    Energy,
    /// Company drive.
    Social,
    /// Novelty drive.
    Curiosity,
    /// Threat level (inverted urgency).
    Safety,
}

impl NeedKind {
    /// All needs in arbitration order.
    pub const ALL: [Self; 5] = [
        Self::Hunger,
        Self::Energy,
        Self::Social,
        Self::Curiosity,
        Self::Safety,
    ];

    /// Stable lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hunger => "hunger",
            Self::Energy => "energy",
            Self::Social => "social",
            Self::Curiosity => "curiosity",
            Self::Safety => "safety",
        }
    }
}

impl fmt::Display for NeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five drives of an agent, each clamped to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Needs {
    /// 0 = fed, 1 = starving.
    pub hunger: f32,
    /// 0 = rested, 1 = exhausted.
    pub energy: f32,
    /// 0 = content, 1 = lonely.
    pub social: f32,
    /// 0 = bored of novelty, 1 = eager to explore.
    pub curiosity: f32,
    /// 0 = safe, 1 = threatened.
    pub safety: f32,
}

impl Default for Needs {
    fn default() -> Self {
        Self {
            hunger: 0.5,
            energy: 0.5,
            social: 0.5,
            curiosity: 0.5,
            safety: 0.9,
        }
    }
}

impl Needs {
    /// Construct needs, clamping every field.
    #[must_use]
    pub fn new(hunger: f32, energy: f32, social: f32, curiosity: f32, safety: f32) -> Self {
        let mut needs = Self {
            hunger,
            energy,
            social,
            curiosity,
            safety,
        };
        needs.clamp();
        needs
    }

    /// Advance all drives by `dt` seconds. Hunger, energy, social, and
    /// curiosity grow; safety relaxes toward 0.
    pub fn update(&mut self, dt: f32) {
        self.hunger += HUNGER_RATE * dt;
        self.energy += ENERGY_RATE * dt;
        self.social += SOCIAL_RATE * dt;
        self.curiosity += CURIOSITY_RATE * dt;
        self.safety += SAFETY_RATE * dt;
        self.clamp();
    }

    /// Clamp every field to [0, 1]. NaN collapses to 0.
    pub fn clamp(&mut self) {
        for v in [
            &mut self.hunger,
            &mut self.energy,
            &mut self.social,
            &mut self.curiosity,
            &mut self.safety,
        ] {
            *v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        }
    }

    /// Raw value of a drive.
    #[must_use]
    pub fn get(&self, kind: NeedKind) -> f32 {
        match kind {
            NeedKind::Hunger => self.hunger,
            NeedKind::Energy => self.energy,
            NeedKind::Social => self.social,
            NeedKind::Curiosity => self.curiosity,
            NeedKind::Safety => self.safety,
        }
    }

    /// Add `delta` to one drive and clamp it.
    pub fn apply_delta(&mut self, kind: NeedKind, delta: f32) {
        let slot = match kind {
            NeedKind::Hunger => &mut self.hunger,
            NeedKind::Energy => &mut self.energy,
            NeedKind::Social => &mut self.social,
            NeedKind::Curiosity => &mut self.curiosity,
            NeedKind::Safety => &mut self.safety,
        };
        *slot += delta;
        self.clamp();
    }

    /// Urgency of a drive: the value itself, or `1 - safety` for safety.
    #[must_use]
    pub fn urgency(&self, kind: NeedKind) -> f32 {
        match kind {
            NeedKind::Safety => 1.0 - self.safety,
            other => self.get(other),
        }
    }

    /// Highest urgency across all drives.
    #[must_use]
    pub fn most_urgent(&self) -> f32 {
        NeedKind::ALL
            .iter()
            .map(|&k| self.urgency(k))
            .fold(0.0_f32, f32::max)
    }

    /// The drive with the strictly greatest urgency, scanning hunger,
    /// energy, social, curiosity, then safety. Ties keep the earlier drive.
    /// `None` when every urgency is zero.
    #[must_use]
    pub fn most_urgent_kind(&self) -> Option<NeedKind> {
        let mut best = None;
        let mut max = 0.0_f32;
        for kind in NeedKind::ALL {
            let u = self.urgency(kind);
            if u > max {
                max = u;
                best = Some(kind);
            }
        }
        best
    }

    /// Name of the most urgent drive, or `"none"`.
    #[must_use]
    pub fn most_urgent_name(&self) -> &'static str {
        self.most_urgent_kind().map_or("none", NeedKind::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_grows_drives_and_relaxes_safety() {
        let mut n = Needs::new(0.0, 0.0, 0.0, 0.0, 1.0);
        n.update(1.0);
        assert!((n.hunger - 0.05).abs() < 1e-6);
        assert!((n.energy - 0.03).abs() < 1e-6);
        assert!((n.social - 0.02).abs() < 1e-6);
        assert!((n.curiosity - 0.01).abs() < 1e-6);
        assert!((n.safety - 0.9).abs() < 1e-6);
    }

    #[test]
    fn update_saturates() {
        let mut n = Needs::default();
        n.update(1_000.0);
        assert_eq!(n, Needs::new(1.0, 1.0, 1.0, 1.0, 0.0));
    }

    #[test]
    fn most_urgent_ties_favor_earlier_need() {
        let n = Needs::new(0.8, 0.8, 0.1, 0.1, 1.0);
        assert_eq!(n.most_urgent_kind(), Some(NeedKind::Hunger));
        assert_eq!(n.most_urgent_name(), "hunger");
    }

    #[test]
    fn safety_urgency_is_inverted() {
        let n = Needs::new(0.1, 0.1, 0.1, 0.1, 0.05);
        assert_eq!(n.most_urgent_kind(), Some(NeedKind::Safety));
        assert!((n.most_urgent() - 0.95).abs() < 1e-6);
    }

    #[test]
    fn all_zero_urgency_is_none() {
        let n = Needs::new(0.0, 0.0, 0.0, 0.0, 1.0);
        assert_eq!(n.most_urgent_kind(), None);
        assert_eq!(n.most_urgent_name(), "none");
        assert_eq!(n.most_urgent(), 0.0);
    }

    #[test]
    fn apply_delta_clamps() {
        let mut n = Needs::default();
        n.apply_delta(NeedKind::Hunger, -3.0);
        assert_eq!(n.hunger, 0.0);
        n.apply_delta(NeedKind::Safety, 3.0);
        assert_eq!(n.safety, 1.0);
    }
}
