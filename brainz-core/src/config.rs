//! Configuration for the brainz decision core.
//!
//! Maps directly to a `brainz.toml` file. Every field has a default, so a
//! partial file (or an empty one) is valid.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level brainz configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrainzConfig {
    /// World dimensions and general settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Spatial memory store limits and decay.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// A* search budget.
    #[serde(default)]
    pub pathfinding: PathfindingConfig,
    /// Rule-based arbitration thresholds and search radii.
    #[serde(default)]
    pub behavior: BehaviorConfig,
    /// Vector brain settings.
    #[serde(default)]
    pub neural: NeuralConfig,
    /// Relationship embedding settings.
    #[serde(default)]
    pub social: SocialConfig,
    /// Snapshot store settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl BrainzConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `BrainzError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::BrainzError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// World width in tiles, used to normalize positions into features.
    #[serde(default = "default_world_width")]
    pub world_width: f32,
    /// World height in tiles.
    #[serde(default = "default_world_height")]
    pub world_height: f32,
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            world_width: 200.0,
            world_height: 150.0,
            log_level: "info".to_string(),
        }
    }
}

/// Spatial memory store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Hard cap on remembered places per agent.
    #[serde(default = "default_100")]
    pub capacity: usize,
    /// Linear decay rate per tick of age.
    #[serde(default = "default_decay_rate")]
    pub decay_rate: f32,
    /// Significance never drops below this.
    #[serde(default = "default_significance_floor")]
    pub significance_floor: f32,
    /// Radius searched when recalling remembered places.
    #[serde(default = "default_100_f32")]
    pub recall_radius: f32,
    /// Maximum recalled places considered per behavior.
    #[serde(default = "default_3")]
    pub recall_limit: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            decay_rate: 0.001,
            significance_floor: 0.01,
            recall_radius: 100.0,
            recall_limit: 3,
        }
    }
}

/// A* search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathfindingConfig {
    /// Maximum nodes popped from the frontier per search.
    #[serde(default = "default_1000")]
    pub max_expansions: usize,
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            max_expansions: 1000,
        }
    }
}

/// Rule-based brain thresholds and radii.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorConfig {
    /// Hunger above this triggers foraging.
    #[serde(default = "default_0_7")]
    pub hunger_threshold: f32,
    /// Energy above this triggers resting.
    #[serde(default = "default_0_7")]
    pub energy_threshold: f32,
    /// Safety (threat level) above this triggers seeking shelter.
    #[serde(default = "default_0_7")]
    pub threat_threshold: f32,
    /// Social above this triggers socializing.
    #[serde(default = "default_0_6")]
    pub social_threshold: f32,
    /// Curiosity above this triggers exploring.
    #[serde(default = "default_0_6")]
    pub curiosity_threshold: f32,
    /// In rain or storm, safety below this sends the agent to shelter.
    #[serde(default = "default_0_7")]
    pub weather_safety_threshold: f32,
    /// Radius searched for food tiles in view.
    #[serde(default = "default_50_f32")]
    pub forage_radius: f32,
    /// Distance at which food can be eaten.
    #[serde(default = "default_eat_distance")]
    pub eat_distance: f32,
    /// Radius searched for caves when resting.
    #[serde(default = "default_50_f32")]
    pub rest_radius: f32,
    /// Distance at which a cave counts as reached.
    #[serde(default = "default_2_0")]
    pub rest_distance: f32,
    /// Distance at which a peer can be socialized with.
    #[serde(default = "default_3_0")]
    pub socialize_distance: f32,
    /// Radius searched for caves when sheltering.
    #[serde(default = "default_50_f32")]
    pub shelter_cave_radius: f32,
    /// Radius searched for trees when no cave is near.
    #[serde(default = "default_30_f32")]
    pub shelter_tree_radius: f32,
    /// Outer radius of random exploration targets.
    #[serde(default = "default_30_f32")]
    pub explore_radius: f32,
    /// Attempts to find a walkable exploration target.
    #[serde(default = "default_10")]
    pub explore_attempts: u32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            hunger_threshold: 0.7,
            energy_threshold: 0.7,
            threat_threshold: 0.7,
            social_threshold: 0.6,
            curiosity_threshold: 0.6,
            weather_safety_threshold: 0.7,
            forage_radius: 50.0,
            eat_distance: 1.5,
            rest_radius: 50.0,
            rest_distance: 2.0,
            socialize_distance: 3.0,
            shelter_cave_radius: 50.0,
            shelter_tree_radius: 30.0,
            explore_radius: 30.0,
            explore_attempts: 10,
        }
    }
}

/// Vector brain settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuralConfig {
    /// Optional path to a JSON policy model. Absent or unloadable means the
    /// heuristic policy is used for the brain's whole lifetime.
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    /// Episodic buffer capacity.
    #[serde(default = "default_50")]
    pub buffer_capacity: usize,
    /// Dimensionality of episodic embeddings and context slots.
    #[serde(default = "default_32")]
    pub embedding_dim: usize,
    /// Number of memory slots in the model's context input.
    #[serde(default = "default_50")]
    pub context_slots: usize,
    /// Maximum retained experiences.
    #[serde(default = "default_100")]
    pub replay_capacity: usize,
    /// Age (ticks) over which episodic significance fades to its minimum
    /// factor.
    #[serde(default = "default_decay_horizon")]
    pub decay_horizon: f32,
    /// Minimum attention for a faded memory to resurface.
    #[serde(default = "default_0_3")]
    pub recall_attention_threshold: f32,
    /// Significance below which a memory counts as faded.
    #[serde(default = "default_0_3")]
    pub recall_significance_threshold: f32,
    /// Emotional learning rate for the online update.
    #[serde(default = "default_0_05")]
    pub learning_rate: f32,
    /// Experiences required before the online update runs.
    #[serde(default = "default_8")]
    pub min_replay_for_update: usize,
    /// Half-width of random Move/Explore target offsets.
    #[serde(default = "default_20")]
    pub target_offset: i32,
}

impl Default for NeuralConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            buffer_capacity: 50,
            embedding_dim: 32,
            context_slots: 50,
            replay_capacity: 100,
            decay_horizon: 10_000.0,
            recall_attention_threshold: 0.3,
            recall_significance_threshold: 0.3,
            learning_rate: 0.05,
            min_replay_for_update: 8,
            target_offset: 20,
        }
    }
}

/// Relationship embedding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialConfig {
    /// Embedding dimensionality (at least 3).
    #[serde(default = "default_16")]
    pub embedding_dim: usize,
    /// Learning rate applied to directed updates.
    #[serde(default = "default_0_1")]
    pub learning_rate: f32,
    /// Standard deviation of initial embeddings.
    #[serde(default = "default_0_1")]
    pub init_std: f32,
    /// Standard deviation of exploration noise on dimensions 3 and up.
    #[serde(default = "default_0_01")]
    pub noise_std: f32,
    /// Default cosine threshold for peer similarity.
    #[serde(default = "default_0_7")]
    pub similarity_threshold: f32,
    /// Ticks without interaction before a relationship starts fading.
    #[serde(default = "default_1000_u64")]
    pub idle_ticks: u64,
    /// Fractional fade applied per decay pass.
    #[serde(default = "default_decay_rate")]
    pub decay_factor: f32,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            embedding_dim: 16,
            learning_rate: 0.1,
            init_std: 0.1,
            noise_std: 0.01,
            similarity_threshold: 0.7,
            idle_ticks: 1000,
            decay_factor: 0.001,
        }
    }
}

/// Snapshot store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Enable SQLite WAL journaling.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
    /// Store and verify a CRC-32 checksum per snapshot.
    #[serde(default = "default_true")]
    pub checksum_enabled: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            wal_mode: true,
            checksum_enabled: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_world_width() -> f32 { 200.0 }
fn default_world_height() -> f32 { 150.0 }
fn default_decay_rate() -> f32 { 0.001 }
fn default_significance_floor() -> f32 { 0.01 }
fn default_decay_horizon() -> f32 { 10_000.0 }
fn default_eat_distance() -> f32 { 1.5 }
fn default_0_01() -> f32 { 0.01 }
fn default_0_05() -> f32 { 0.05 }
fn default_0_1() -> f32 { 0.1 }
fn default_0_3() -> f32 { 0.3 }
fn default_0_6() -> f32 { 0.6 }
fn default_0_7() -> f32 { 0.7 }
fn default_2_0() -> f32 { 2.0 }
fn default_3_0() -> f32 { 3.0 }
fn default_30_f32() -> f32 { 30.0 }
fn default_50_f32() -> f32 { 50.0 }
fn default_100_f32() -> f32 { 100.0 }
fn default_3() -> usize { 3 }
fn default_8() -> usize { 8 }
fn default_10() -> u32 { 10 }
fn default_16() -> usize { 16 }
fn default_20() -> i32 { 20 }
fn default_32() -> usize { 32 }
fn default_50() -> usize { 50 }
fn default_100() -> usize { 100 }
fn default_1000() -> usize { 1000 }
fn default_1000_u64() -> u64 { 1000 }
