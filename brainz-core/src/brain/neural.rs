//! Vector brain: memory attention, policy distribution, emotional
//! modulation, and online emotional adaptation.
//!
//! Per decision:
//!
//! 1. Record forage tiles and peers in the episodic buffer, then fade it.
//! 2. Encode the perception as a 20-wide feature vector.
//! 3. Weight memories by attention against the features; faded memories
//!    that draw strong attention resurface and raise arousal.
//! 4. Ask the policy for a distribution, let the mood reweight it, sample.
//! 5. Pick a target for the sampled action and route to it.
//!
//! Per outcome: score a reward, nudge the mood, log the experience, update
//! relationships with any peer involved, and once enough experience has
//! accumulated apply a reward-driven online update to the mood.

use std::collections::VecDeque;
use std::path::Path;

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Brain, BrainKind, BrainState, SALIENCE_THRESHOLD};
use crate::action::{ACTION_COUNT, Action, ActionKind, Outcome};
use crate::config::{BrainzConfig, NeuralConfig};
use crate::emotion::EmotionalState;
use crate::error::Result;
use crate::inference::{ActionPolicy, select_policy};
use crate::memory::{EpisodicBuffer, EpisodicMemory, MemoryCategory};
use crate::pathfinding::find_path;
use crate::perception::Perception;
use crate::persistence::{self, BrainSnapshot, SnapshotRelationship};
use crate::social::{InteractionKind, RelationshipEmbedding, SocialModel};
use crate::types::{AgentId, Tick, Vec2};
use crate::world::{GridView, TerrainKind};

/// Width of the perception feature vector.
pub const FEATURE_LEN: usize = 20;

/// Stream offset separating the relationship model's RNG from the brain's.
const SOCIAL_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// Prefix marking an interaction event, e.g. `"social:cooperative"`.
const INTERACTION_PREFIX: &str = "social:";

// ---- Reward and mood constants ----

const DANGER_PENALTY: f32 = -2.0;
const FOOD_BONUS: f32 = 1.0;
const SOCIAL_BONUS: f32 = 0.5;
const INCREASE_WEIGHT: f32 = 0.5;
const REWARD_VALENCE_GAIN: f32 = 0.1;
const FLASHBACK_AROUSAL: f32 = 0.2;

/// One logged decision and how it turned out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    /// Tick of the decision.
    pub tick: Tick,
    /// Feature vector the decision was made from.
    pub features: Vec<f32>,
    /// Action taken.
    pub action: ActionKind,
    /// Reward received.
    pub reward: f32,
}

/// Score an outcome: relieved needs pay their full magnitude, aggravated
/// needs cost half theirs, and the event tag adds a fixed bonus or penalty
/// (danger takes precedence over food, food over social).
#[must_use]
pub fn compute_reward(outcome: &Outcome) -> f32 {
    let mut reward: f32 = outcome
        .need_deltas
        .values()
        .map(|&d| if d < 0.0 { -d } else { -d * INCREASE_WEIGHT })
        .sum();
    if outcome.event_mentions("danger") {
        reward += DANGER_PENALTY;
    } else if outcome.event_mentions("food") {
        reward += FOOD_BONUS;
    } else if outcome.event_mentions("social") {
        reward += SOCIAL_BONUS;
    }
    reward
}

/// The vector brain.
pub struct NeuralBrain {
    owner: AgentId,
    config: NeuralConfig,
    world: (f32, f32),
    max_expansions: usize,
    buffer: EpisodicBuffer,
    emotion: EmotionalState,
    social: SocialModel,
    policy: Box<dyn ActionPolicy>,
    rng: StdRng,
    replay: VecDeque<Experience>,
    last_probs: Option<[f32; ACTION_COUNT]>,
    last_features: Vec<f32>,
    last_action: Option<ActionKind>,
    last_tick: Tick,
}

impl std::fmt::Debug for NeuralBrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeuralBrain")
            .field("owner", &self.owner)
            .field("policy", &self.policy.name())
            .field("emotion", &self.emotion)
            .field("memories", &self.buffer.len())
            .field("replay", &self.replay.len())
            .field("relationships", &self.social.len())
            .finish_non_exhaustive()
    }
}

impl NeuralBrain {
    /// Create a brain, loading the configured policy model if there is one.
    /// A missing or broken model leaves the brain on the heuristic policy
    /// for its whole lifetime.
    #[must_use]
    pub fn new(owner: AgentId, seed: u64, config: &BrainzConfig) -> Self {
        let policy = select_policy(&config.neural);
        Self::with_policy(owner, seed, config, policy)
    }

    /// Create a brain with an explicit policy.
    #[must_use]
    pub fn with_policy(
        owner: AgentId,
        seed: u64,
        config: &BrainzConfig,
        policy: Box<dyn ActionPolicy>,
    ) -> Self {
        let world = (config.general.world_width, config.general.world_height);
        Self {
            owner,
            config: config.neural.clone(),
            world,
            max_expansions: config.pathfinding.max_expansions,
            buffer: EpisodicBuffer::new(&config.neural, world),
            emotion: EmotionalState::NEUTRAL,
            social: SocialModel::new(&config.social, seed ^ SOCIAL_STREAM),
            policy,
            rng: StdRng::seed_from_u64(seed),
            replay: VecDeque::new(),
            last_probs: None,
            last_features: Vec::new(),
            last_action: None,
            last_tick: 0,
        }
    }

    /// The agent this brain belongs to.
    #[must_use]
    pub fn owner(&self) -> AgentId {
        self.owner
    }

    /// Current emotional state.
    #[must_use]
    pub fn emotion(&self) -> EmotionalState {
        self.emotion
    }

    /// Replace the emotional state (clamped).
    pub fn set_emotion(&mut self, emotion: EmotionalState) {
        self.emotion = emotion;
        self.emotion.clamp();
    }

    /// Episodic buffer.
    #[must_use]
    pub fn memory(&self) -> &EpisodicBuffer {
        &self.buffer
    }

    /// Mutable episodic buffer, for seeding knowledge.
    pub fn memory_mut(&mut self) -> &mut EpisodicBuffer {
        &mut self.buffer
    }

    /// Relationship model.
    #[must_use]
    pub fn social(&self) -> &SocialModel {
        &self.social
    }

    /// Mutable relationship model.
    pub fn social_mut(&mut self) -> &mut SocialModel {
        &mut self.social
    }

    /// Logged experiences, oldest first.
    pub fn replay(&self) -> impl Iterator<Item = &Experience> {
        self.replay.iter()
    }

    /// Distribution behind the most recent decision.
    #[must_use]
    pub fn last_probabilities(&self) -> Option<[f32; ACTION_COUNT]> {
        self.last_probs
    }

    // ---- Encoding ----

    /// Encode a perception:
    /// `[x/W, y/H, hunger, energy, social, curiosity, safety, time_of_day,
    /// wet, water/5, forage/5, shelter/3, peers/5, valence, arousal,
    /// dominance, 0, 0, 0, 0]`, with counts capped at 1.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn features(&self, p: &Perception) -> Vec<f32> {
        let capped = |count: usize, scale: f32| (count as f32 / scale).min(1.0);
        let n = &p.needs;
        let mut v = vec![
            p.position.x / self.world.0,
            p.position.y / self.world.1,
            n.hunger,
            n.energy,
            n.social,
            n.curiosity,
            n.safety,
            p.time_of_day,
            if p.weather.is_wet() { 1.0 } else { 0.0 },
            capped(p.count_tiles(|t| t == TerrainKind::Water), 5.0),
            capped(p.count_tiles(TerrainKind::is_forage), 5.0),
            capped(p.count_tiles(TerrainKind::is_shelter), 3.0),
            capped(p.nearby_agents.len(), 5.0),
            self.emotion.valence,
            self.emotion.arousal,
            self.emotion.dominance,
        ];
        v.resize(FEATURE_LEN, 0.0);
        v
    }

    // ---- Action selection ----

    fn sample(&mut self, probs: &[f32; ACTION_COUNT]) -> ActionKind {
        match WeightedIndex::new(probs.iter().copied()) {
            Ok(dist) => ActionKind::from_index(dist.sample(&mut self.rng)).unwrap_or_default(),
            Err(_) => ActionKind::Idle,
        }
    }

    fn target(&mut self, kind: ActionKind, p: &Perception, grid: &dyn GridView) -> Action {
        let here = p.position;
        let action = match kind {
            ActionKind::Move | ActionKind::Explore => {
                let off = self.config.target_offset;
                let target = if off > 0 {
                    let dx = self.rng.gen_range(-off..off);
                    let dy = self.rng.gen_range(-off..off);
                    #[allow(clippy::cast_precision_loss)]
                    let offset = Vec2::new(dx as f32, dy as f32);
                    here + offset
                } else {
                    here
                };
                Action::toward(kind, target)
            }
            ActionKind::Forage | ActionKind::Eat => self
                .seen_or_remembered(p, TerrainKind::is_forage, MemoryCategory::Food)
                .map_or_else(|| Action::new(kind), |t| Action::toward(kind, t)),
            ActionKind::SeekShelter => self
                .seen_or_remembered(p, TerrainKind::is_shelter, MemoryCategory::Shelter)
                .map_or_else(|| Action::new(kind), |t| Action::toward(kind, t)),
            ActionKind::Socialize => match p.nearest_agent() {
                Some((peer, pos)) => Action::toward(kind, pos).with_agent(peer),
                None => Action::new(kind),
            },
            ActionKind::Idle | ActionKind::Rest | ActionKind::BuildShelter => {
                Action::toward(kind, here)
            }
        };

        let moving = matches!(
            kind,
            ActionKind::Move | ActionKind::Explore | ActionKind::Forage | ActionKind::SeekShelter
        );
        match action.target_position {
            Some(target) if moving => {
                let path = find_path(grid, here.cell(), target.cell(), self.max_expansions);
                action.with_waypoints(path)
            }
            _ => action,
        }
    }

    fn seen_or_remembered(
        &self,
        p: &Perception,
        seen: impl Fn(TerrainKind) -> bool,
        remembered: MemoryCategory,
    ) -> Option<Vec2> {
        p.nearest_tile(seen)
            .map(crate::types::Cell::to_vec2)
            .or_else(|| self.buffer.nearest(remembered, p.position))
    }

    // ---- Learning ----

    fn react_to_outcome(&mut self, outcome: &Outcome) {
        for &delta in outcome.need_deltas.values() {
            if delta < 0.0 {
                self.emotion.nudge(0.1, -0.05, 0.0);
            } else {
                self.emotion.nudge(-0.05, 0.1, 0.0);
            }
        }
        if outcome.event_mentions("danger") || outcome.event_mentions("attacked") {
            self.emotion.nudge(-0.3, 0.4, -0.2);
        } else if outcome.event_mentions("food") || outcome.event_mentions("social") {
            self.emotion.nudge(0.2, 0.0, 0.0);
        }
    }

    fn log_experience(&mut self, reward: f32) {
        let Some(action) = self.last_action else {
            return;
        };
        self.replay.push_back(Experience {
            tick: self.last_tick,
            features: self.last_features.clone(),
            action,
            reward,
        });
        while self.replay.len() > self.config.replay_capacity {
            self.replay.pop_front();
        }
    }

    /// Reward-scaled, sign-gated mood adaptation.
    #[allow(clippy::cast_precision_loss)]
    fn online_update(&mut self, reward: f32) {
        if self.replay.len() < self.config.min_replay_for_update.max(1) {
            return;
        }
        let eta = self.config.learning_rate;
        let mean = self.replay.iter().map(|e| e.reward).sum::<f32>() / self.replay.len() as f32;

        self.emotion.nudge(eta * reward, 0.0, 0.0);
        if reward < 0.0 {
            self.emotion.nudge(0.0, eta * reward.abs(), 0.0);
        } else {
            self.emotion.nudge(0.0, -0.5 * eta * reward, 0.0);
        }
        if reward != 0.0 && mean != 0.0 && reward.signum() == mean.signum() {
            self.emotion.nudge(0.0, 0.0, eta * mean);
        }
    }

    fn learn_relationship(&mut self, outcome: &Outcome, reward: f32) {
        let Some(peer) = outcome.peer else {
            return;
        };
        let tag = outcome
            .event
            .find(INTERACTION_PREFIX)
            .map_or(outcome.event.as_str(), |i| &outcome.event[i + INTERACTION_PREFIX.len()..]);
        let kind = InteractionKind::parse(tag);
        self.social
            .record_interaction(peer, kind, reward.clamp(-1.0, 1.0), self.last_tick);
    }

    // ---- Persistence ----

    /// Point-in-time dump of everything worth keeping.
    #[must_use]
    pub fn snapshot(&self) -> BrainSnapshot {
        BrainSnapshot {
            format_version: persistence::FORMAT_VERSION,
            agent_id: self.owner,
            emotional_state: self.emotion,
            memory_buffer: self.buffer.memories().to_vec(),
            relationships: self
                .social
                .iter()
                .map(|r| {
                    (
                        r.peer,
                        SnapshotRelationship {
                            trust: r.trust,
                            affinity: r.affinity,
                            last_interaction: r.last_interaction,
                            embedding: r.embedding.clone(),
                        },
                    )
                })
                .collect(),
            replay_buffer_size: self.replay.len(),
            saved_at: chrono::Utc::now(),
        }
    }

    /// Replace emotional state, memories, and relationships with a
    /// snapshot's. The replay log is not persisted and is left as is.
    pub fn apply_snapshot(&mut self, snapshot: BrainSnapshot) {
        self.set_emotion(snapshot.emotional_state);

        let dim = self.buffer.dim();
        let memories: Vec<EpisodicMemory> = snapshot
            .memory_buffer
            .into_iter()
            .map(|mut m| {
                if m.embedding.len() != dim {
                    m.embedding =
                        self.buffer
                            .embed(m.entry.category, m.entry.location, m.entry.significance);
                }
                m
            })
            .collect();
        self.buffer.restore(memories);

        self.social.clear();
        for (peer, rel) in snapshot.relationships {
            let embedding = if rel.embedding.is_empty() {
                vec![inverse_tanh(rel.trust), inverse_tanh(rel.affinity)]
            } else {
                rel.embedding
            };
            self.social.restore(RelationshipEmbedding {
                peer,
                embedding,
                trust: rel.trust,
                affinity: rel.affinity,
                last_interaction: rel.last_interaction,
            });
        }
    }

    /// Write a snapshot to `path` as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn save_state(&self, path: &Path) -> Result<()> {
        let json = persistence::snapshot_to_json(&self.snapshot())?;
        std::fs::write(path, json)?;
        info!(agent = %self.owner, path = %path.display(), "brain state saved");
        Ok(())
    }

    /// Load a snapshot from `path`. Malformed fields fall back to defaults;
    /// an unreadable or unparseable file is reported and leaves the brain
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a snapshot
    /// document.
    pub fn load_state(&mut self, path: &Path) -> Result<()> {
        let json = std::fs::read_to_string(path)?;
        let snapshot = persistence::snapshot_from_json(&json)?;
        debug!(
            agent = %self.owner,
            memories = snapshot.memory_buffer.len(),
            relationships = snapshot.relationships.len(),
            "brain state loaded"
        );
        self.apply_snapshot(snapshot);
        Ok(())
    }
}

fn inverse_tanh(x: f32) -> f32 {
    x.clamp(-0.999, 0.999).atanh()
}

impl Brain for NeuralBrain {
    fn decide(&mut self, p: &Perception, grid: &dyn GridView) -> Action {
        self.last_tick = p.tick;
        self.buffer.observe(p);
        self.buffer.decay(p.tick);

        let features = self.features(p);
        self.buffer.compute_attention(&features);
        for _ in 0..self.buffer.flashbacks() {
            self.emotion.nudge(0.0, FLASHBACK_AROUSAL, 0.0);
        }
        let context = self.buffer.context_vector(self.config.context_slots);

        let proposal = self.policy.propose(&features, &context, &p.needs);
        if let Some([v, a, d]) = proposal.emotion {
            self.emotion = EmotionalState::new(v, a, d);
        }
        let mut probs = proposal.probabilities;
        self.emotion.modulate(&mut probs);
        self.last_probs = Some(probs);

        let kind = self.sample(&probs);
        let action = self.target(kind, p, grid);
        self.last_features = features;
        self.last_action = Some(kind);

        debug!(
            agent = %self.owner,
            tick = p.tick,
            policy = self.policy.name(),
            action = %action.kind,
            p = probs[kind.index()],
            "neural decision"
        );
        action
    }

    fn on_outcome(&mut self, outcome: &Outcome) {
        let reward = compute_reward(outcome);
        self.react_to_outcome(outcome);
        self.emotion.nudge(REWARD_VALENCE_GAIN * reward, 0.0, 0.0);
        self.log_experience(reward);
        self.learn_relationship(outcome, reward);
        self.social.decay_relationships(self.last_tick);
        self.online_update(reward);
    }

    fn describe_state(&self) -> BrainState {
        let mut salient = Vec::new();
        for m in self.buffer.memories() {
            if m.entry.significance > SALIENCE_THRESHOLD && !salient.contains(&m.entry.category) {
                salient.push(m.entry.category);
            }
        }
        BrainState {
            kind: BrainKind::Neural,
            emotion: Some(self.emotion),
            action_probabilities: self.last_probs,
            salient_memories: salient,
            memory_count: self.buffer.len(),
            replay_len: self.replay.len(),
            relationship_count: self.social.len(),
            policy: Some(self.policy.name().to_string()),
        }
    }

    fn kind(&self) -> BrainKind {
        BrainKind::Neural
    }
}
