//! Simulation host configuration.
//!
//! [`SimConfig`] carries the host's own tuning (perception range, movement
//! speed, action effects) alongside the core
//! [`BrainzConfig`] every brain is built from. Both load from one TOML file:
//!
//! ```toml
//! perception_radius = 5
//! speed = 10.0
//!
//! [core.general]
//! world_width = 200
//! world_height = 150
//! ```

use std::path::Path;

use brainz_core::config::BrainzConfig;
use brainz_core::perception::Weather;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Host tuning plus the core configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Half-width of the square of tiles an agent sees.
    #[serde(default = "default_perception_radius")]
    pub perception_radius: i32,
    /// Peers strictly closer than this are visible.
    #[serde(default = "default_peer_radius")]
    pub peer_radius: f32,
    /// Base movement speed in tiles per second.
    #[serde(default = "default_speed")]
    pub speed: f32,
    /// Eating reaches a target tile at most this far away; otherwise the
    /// agent eats from its own tile.
    #[serde(default = "default_eat_reach")]
    pub eat_reach: f32,
    /// Hunger removed per unit of food eaten.
    #[serde(default = "default_eat_relief")]
    pub eat_relief: f32,
    /// Energy need recovered per second of rest.
    #[serde(default = "default_rest_rate")]
    pub rest_rate: f32,
    /// Social need satisfied per second of socializing.
    #[serde(default = "default_socialize_rate")]
    pub socialize_rate: f32,
    /// Agents closer than this are reported as having met.
    #[serde(default = "default_meet_distance")]
    pub meet_distance: f32,
    /// Configuration handed to every brain.
    #[serde(default)]
    pub core: BrainzConfig,
}

fn default_perception_radius() -> i32 { 5 }
fn default_peer_radius() -> f32 { 20.0 }
fn default_speed() -> f32 { 10.0 }
fn default_eat_reach() -> f32 { 1.5 }
fn default_eat_relief() -> f32 { 0.3 }
fn default_rest_rate() -> f32 { 0.2 }
fn default_socialize_rate() -> f32 { 0.1 }
fn default_meet_distance() -> f32 { 2.0 }

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            perception_radius: default_perception_radius(),
            peer_radius: default_peer_radius(),
            speed: default_speed(),
            eat_reach: default_eat_reach(),
            eat_relief: default_eat_relief(),
            rest_rate: default_rest_rate(),
            socialize_rate: default_socialize_rate(),
            meet_distance: default_meet_distance(),
            core: BrainzConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parse from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| SimError::Config(e.to_string()))
    }

    /// Load from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be read, or
    /// [`SimError::Config`] if it is not valid configuration.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

/// World conditions shared by every agent in a tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Environment {
    /// Current weather.
    pub weather: Weather,
    /// Time of day in [0, 1).
    pub time_of_day: f32,
}

impl Environment {
    /// Advance the clock by `dt` seconds on a day of `day_length` seconds.
    pub fn advance(&mut self, dt: f32, day_length: f32) {
        if day_length > 0.0 {
            self.time_of_day = (self.time_of_day + dt / day_length).rem_euclid(1.0);
        }
    }
}
