//! Learned pairwise relationships.
//!
//! Each known peer gets a small embedding. The first two dimensions carry
//! meaning (trust and affinity, read through `tanh`), the rest drift under
//! exploration noise so that peers with similar histories cluster by cosine
//! similarity.
//!
//! Updates per interaction (α = learning rate, v = valence):
//!   - cooperative: `e0 += α·|v|·0.5`, `e1 += α·|v|·0.3`
//!   - competitive: `e0 -= α·|v|·0.4`, `e1 -= α·|v|·0.6`
//!   - neutral:     `e2 += α·0.1`
//!   - all kinds:   `e3.. += N(0, noise)`, then clamp to [-2, 2]

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SocialConfig;
use crate::types::{AgentId, Tick, cosine_similarity};

/// Embedding component bound.
pub const EMBEDDING_BOUND: f32 = 2.0;

/// Dimensions with fixed meaning; noise applies from here on.
const SEMANTIC_DIMS: usize = 3;

/// How an interaction went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// Helping, sharing food.
    Cooperative,
    /// Fighting, competing for a resource.
    Competitive,
    /// Passing by, observing.
    Neutral,
    /// Anything unrecognized. Only exploration noise applies.
    Other,
}

impl InteractionKind {
    /// Parse an interaction tag. Unknown tags map to [`Other`](Self::Other).
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        let tag = tag.trim().to_ascii_lowercase();
        match tag.as_str() {
            "cooperative" => Self::Cooperative,
            "competitive" | "conflict" => Self::Competitive,
            "neutral" | "observe" => Self::Neutral,
            t if t.starts_with("share") => Self::Cooperative,
            _ => Self::Other,
        }
    }

    /// Stable lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cooperative => "cooperative",
            Self::Competitive => "competitive",
            Self::Neutral => "neutral",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one agent has learned about one peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipEmbedding {
    /// The peer.
    pub peer: AgentId,
    /// Learned vector, each component in [-2, 2].
    pub embedding: Vec<f32>,
    /// `tanh(embedding[0])`.
    pub trust: f32,
    /// `tanh(embedding[1])`.
    pub affinity: f32,
    /// Tick of the most recent interaction.
    pub last_interaction: Tick,
}

impl RelationshipEmbedding {
    /// Clamp the embedding and recompute trust and affinity from it.
    pub fn rederive(&mut self) {
        for v in &mut self.embedding {
            *v = if v.is_nan() {
                0.0
            } else {
                v.clamp(-EMBEDDING_BOUND, EMBEDDING_BOUND)
            };
        }
        self.trust = self.embedding.first().copied().unwrap_or(0.0).tanh();
        self.affinity = self.embedding.get(1).copied().unwrap_or(0.0).tanh();
    }
}

/// All relationships held by one agent.
#[derive(Debug, Clone)]
pub struct SocialModel {
    relationships: BTreeMap<AgentId, RelationshipEmbedding>,
    config: SocialConfig,
    rng: StdRng,
    init: Option<Normal<f32>>,
    noise: Option<Normal<f32>>,
}

impl SocialModel {
    /// Create an empty model with its own seeded random stream.
    #[must_use]
    pub fn new(config: &SocialConfig, seed: u64) -> Self {
        Self {
            relationships: BTreeMap::new(),
            config: config.clone(),
            rng: StdRng::seed_from_u64(seed),
            init: Normal::new(0.0, config.init_std).ok(),
            noise: Normal::new(0.0, config.noise_std).ok(),
        }
    }

    fn dim(&self) -> usize {
        self.config.embedding_dim.max(SEMANTIC_DIMS)
    }

    fn fresh(&mut self, peer: AgentId) -> RelationshipEmbedding {
        let dim = self.dim();
        let embedding = match self.init {
            Some(normal) => (0..dim).map(|_| normal.sample(&mut self.rng)).collect(),
            None => vec![0.0; dim],
        };
        let mut rel = RelationshipEmbedding {
            peer,
            embedding,
            trust: 0.0,
            affinity: 0.0,
            last_interaction: 0,
        };
        rel.rederive();
        rel
    }

    /// Learn from one interaction with `peer`. Unknown peers are created
    /// with a random embedding first.
    pub fn record_interaction(
        &mut self,
        peer: AgentId,
        kind: InteractionKind,
        valence: f32,
        tick: Tick,
    ) {
        if !self.relationships.contains_key(&peer) {
            let rel = self.fresh(peer);
            self.relationships.insert(peer, rel);
        }
        let alpha = self.config.learning_rate;
        let strength = if valence.is_nan() { 0.0 } else { valence.abs() };
        let noise: Vec<f32> = match self.noise {
            Some(normal) => (SEMANTIC_DIMS..self.dim())
                .map(|_| normal.sample(&mut self.rng))
                .collect(),
            None => Vec::new(),
        };

        let Some(rel) = self.relationships.get_mut(&peer) else {
            return;
        };
        let e = &mut rel.embedding;
        match kind {
            InteractionKind::Cooperative => {
                e[0] += alpha * strength * 0.5;
                e[1] += alpha * strength * 0.3;
            }
            InteractionKind::Competitive => {
                e[0] -= alpha * strength * 0.4;
                e[1] -= alpha * strength * 0.6;
            }
            InteractionKind::Neutral => {
                e[2] += alpha * 0.1;
            }
            InteractionKind::Other => {}
        }
        for (v, n) in e.iter_mut().skip(SEMANTIC_DIMS).zip(noise) {
            *v += n;
        }
        rel.last_interaction = tick;
        rel.rederive();
        debug!(
            peer = %peer,
            kind = %kind,
            trust = rel.trust,
            affinity = rel.affinity,
            "relationship updated"
        );
    }

    /// What is known about `peer`.
    #[must_use]
    pub fn relationship(&self, peer: AgentId) -> Option<&RelationshipEmbedding> {
        self.relationships.get(&peer)
    }

    /// Cosine similarity between two known peers' embeddings; 0 if either
    /// is unknown.
    #[must_use]
    pub fn similarity(&self, a: AgentId, b: AgentId) -> f32 {
        match (self.relationships.get(&a), self.relationships.get(&b)) {
            (Some(x), Some(y)) => cosine_similarity(&x.embedding, &y.embedding),
            _ => 0.0,
        }
    }

    /// Every peer that belongs to at least one pair with cosine similarity
    /// at or above `threshold`, in ascending id order.
    #[must_use]
    pub fn find_similar_peers(&self, threshold: f32) -> Vec<AgentId> {
        let rels: Vec<&RelationshipEmbedding> = self.relationships.values().collect();
        let mut hits = BTreeSet::new();
        for (i, a) in rels.iter().enumerate() {
            for b in &rels[i + 1..] {
                if cosine_similarity(&a.embedding, &b.embedding) >= threshold {
                    hits.insert(a.peer);
                    hits.insert(b.peer);
                }
            }
        }
        hits.into_iter().collect()
    }

    /// [`find_similar_peers`](Self::find_similar_peers) at the configured
    /// threshold.
    #[must_use]
    pub fn similar_peers(&self) -> Vec<AgentId> {
        self.find_similar_peers(self.config.similarity_threshold)
    }

    /// Peer with the highest affinity. Ties keep the lowest id.
    #[must_use]
    pub fn closest_ally(&self) -> Option<AgentId> {
        let mut best: Option<&RelationshipEmbedding> = None;
        for rel in self.relationships.values() {
            if best.is_none_or(|b| rel.affinity > b.affinity) {
                best = Some(rel);
            }
        }
        best.map(|r| r.peer)
    }

    /// Peer with the lowest affinity. Ties keep the lowest id.
    #[must_use]
    pub fn strongest_rival(&self) -> Option<AgentId> {
        let mut worst: Option<&RelationshipEmbedding> = None;
        for rel in self.relationships.values() {
            if worst.is_none_or(|w| rel.affinity < w.affinity) {
                worst = Some(rel);
            }
        }
        worst.map(|r| r.peer)
    }

    /// Fade relationships that have been quiet for longer than the idle
    /// window.
    pub fn decay_relationships(&mut self, now: Tick) {
        let factor = 1.0 - self.config.decay_factor;
        for rel in self.relationships.values_mut() {
            if now.saturating_sub(rel.last_interaction) > self.config.idle_ticks {
                for v in &mut rel.embedding {
                    *v *= factor;
                }
                rel.rederive();
            }
        }
    }

    /// Insert a relationship restored from a snapshot. The embedding is
    /// resized to this model's dimensionality and re-derived.
    pub fn restore(&mut self, mut rel: RelationshipEmbedding) {
        rel.embedding.resize(self.dim(), 0.0);
        rel.rederive();
        self.relationships.insert(rel.peer, rel);
    }

    /// All relationships in ascending peer order.
    pub fn iter(&self) -> impl Iterator<Item = &RelationshipEmbedding> {
        self.relationships.values()
    }

    /// Number of known peers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    /// Whether no peer is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.relationships.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> SocialModel {
        SocialModel::new(&SocialConfig::default(), 42)
    }

    #[test]
    fn tags_parse() {
        assert_eq!(InteractionKind::parse("cooperative"), InteractionKind::Cooperative);
        assert_eq!(InteractionKind::parse("share_food"), InteractionKind::Cooperative);
        assert_eq!(InteractionKind::parse("Conflict"), InteractionKind::Competitive);
        assert_eq!(InteractionKind::parse("observe"), InteractionKind::Neutral);
        assert_eq!(InteractionKind::parse("trade"), InteractionKind::Other);
    }

    #[test]
    fn first_interaction_creates_bounded_embedding() {
        let mut m = model();
        m.record_interaction(AgentId(7), InteractionKind::Neutral, 0.0, 3);
        let rel = m.relationship(AgentId(7)).expect("created");
        assert_eq!(rel.embedding.len(), 16);
        assert_eq!(rel.last_interaction, 3);
        assert!(rel.embedding.iter().all(|v| v.abs() <= EMBEDDING_BOUND));
        assert!((rel.trust - rel.embedding[0].tanh()).abs() < 1e-6);
    }

    #[test]
    fn cooperation_raises_trust_and_conflict_lowers_it() {
        let mut m = model();
        m.record_interaction(AgentId(1), InteractionKind::Neutral, 0.0, 0);
        m.record_interaction(AgentId(2), InteractionKind::Neutral, 0.0, 0);
        let t1 = m.relationship(AgentId(1)).expect("known").trust;
        let t2 = m.relationship(AgentId(2)).expect("known").trust;
        for tick in 1..20 {
            m.record_interaction(AgentId(1), InteractionKind::Cooperative, 1.0, tick);
            m.record_interaction(AgentId(2), InteractionKind::Competitive, -1.0, tick);
        }
        assert!(m.relationship(AgentId(1)).expect("known").trust > t1);
        assert!(m.relationship(AgentId(2)).expect("known").trust < t2);
        assert_eq!(m.closest_ally(), Some(AgentId(1)));
        assert_eq!(m.strongest_rival(), Some(AgentId(2)));
    }

    #[test]
    fn embeddings_stay_bounded_under_repetition() {
        let mut m = model();
        for tick in 0..5_000 {
            m.record_interaction(AgentId(3), InteractionKind::Cooperative, 1.0, tick);
        }
        let rel = m.relationship(AgentId(3)).expect("known");
        assert!(rel.embedding.iter().all(|v| v.abs() <= EMBEDDING_BOUND));
        assert!((rel.embedding[0] - EMBEDDING_BOUND).abs() < 1e-6);
    }

    #[test]
    fn ally_and_rival_empty_is_none() {
        let m = model();
        assert!(m.closest_ally().is_none());
        assert!(m.strongest_rival().is_none());
        assert!(m.find_similar_peers(0.7).is_empty());
    }

    #[test]
    fn similar_peers_include_both_members_once() {
        let mut m = model();
        let base = vec![1.0, 0.5, 0.0, 0.2];
        for (id, scale) in [(1, 1.0), (2, 1.1), (3, -1.0)] {
            m.restore(RelationshipEmbedding {
                peer: AgentId(id),
                embedding: base.iter().map(|v| v * scale).collect(),
                trust: 0.0,
                affinity: 0.0,
                last_interaction: 0,
            });
        }
        assert_eq!(m.find_similar_peers(0.7), vec![AgentId(1), AgentId(2)]);
        assert!((m.similarity(AgentId(1), AgentId(2)) - 1.0).abs() < 1e-5);
        assert!(m.find_similar_peers(1.1).is_empty());
    }

    #[test]
    fn decay_only_touches_quiet_relationships() {
        let mut m = model();
        m.restore(RelationshipEmbedding {
            peer: AgentId(1),
            embedding: vec![1.0; 16],
            trust: 0.0,
            affinity: 0.0,
            last_interaction: 0,
        });
        m.restore(RelationshipEmbedding {
            peer: AgentId(2),
            embedding: vec![1.0; 16],
            trust: 0.0,
            affinity: 0.0,
            last_interaction: 1_500,
        });
        m.decay_relationships(2_000);
        let quiet = m.relationship(AgentId(1)).expect("known");
        let recent = m.relationship(AgentId(2)).expect("known");
        assert!((quiet.embedding[0] - 0.999).abs() < 1e-6);
        assert_eq!(recent.embedding[0], 1.0);
        assert!((quiet.trust - 0.999_f32.tanh()).abs() < 1e-6);
    }

    #[test]
    fn same_seed_same_embeddings() {
        let mut a = model();
        let mut b = model();
        a.record_interaction(AgentId(9), InteractionKind::Cooperative, 0.7, 1);
        b.record_interaction(AgentId(9), InteractionKind::Cooperative, 0.7, 1);
        assert_eq!(a.relationship(AgentId(9)), b.relationship(AgentId(9)));
    }
}
