//! Embedded episodic memories for the vector brain.
//!
//! Each memory carries a fixed-length embedding
//! `[x/W, y/H, significance, 0, one-hot(category) at 4..8, 0…]` and an
//! attention weight recomputed against the current situation every decision.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{MemoryCategory, MemoryEntry};
use crate::config::NeuralConfig;
use crate::perception::Perception;
use crate::types::{Tick, Vec2, dot_prefix};
use crate::world::TerrainKind;

/// Significance bounds inside the buffer.
const MIN_SIGNIFICANCE: f32 = 0.01;
const MAX_SIGNIFICANCE: f32 = 1.0;

/// Sighting weight multipliers.
const FOOD_SIGHTING_WEIGHT: f32 = 1.5;
const PEER_SIGHTING_WEIGHT: f32 = 1.2;

/// Decay never shrinks significance by more than this factor per pass.
const MIN_DECAY_FACTOR: f32 = 0.1;

/// Flashback boost to a resurfacing memory's significance.
const FLASHBACK_BOOST: f32 = 0.5;

/// Offset of the category one-hot inside embeddings and context slots.
const ONE_HOT_OFFSET: usize = 4;

/// An episodic memory: a place, its embedding, and its current attention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodicMemory {
    /// The remembered place.
    pub entry: MemoryEntry,
    /// Fixed-length embedding.
    pub embedding: Vec<f32>,
    /// Softmax attention from the most recent query.
    pub attention: f32,
}

/// Bounded buffer of episodic memories, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodicBuffer {
    memories: Vec<EpisodicMemory>,
    capacity: usize,
    dim: usize,
    world: (f32, f32),
    decay_horizon: f32,
    recall_attention: f32,
    recall_significance: f32,
}

impl EpisodicBuffer {
    /// Create an empty buffer. `world` is `(width, height)` used to
    /// normalize positions.
    #[must_use]
    pub fn new(config: &NeuralConfig, world: (f32, f32)) -> Self {
        Self {
            memories: Vec::new(),
            capacity: config.buffer_capacity,
            dim: config.embedding_dim,
            world: (world.0.max(1.0), world.1.max(1.0)),
            decay_horizon: config.decay_horizon.max(1.0),
            recall_attention: config.recall_attention_threshold,
            recall_significance: config.recall_significance_threshold,
        }
    }

    /// Embedding of a place for this buffer's dimensionality.
    #[must_use]
    pub fn embed(&self, category: MemoryCategory, location: Vec2, significance: f32) -> Vec<f32> {
        let mut v = vec![0.0; self.dim];
        let header = [
            location.x / self.world.0,
            location.y / self.world.1,
            significance,
        ];
        for (slot, value) in v.iter_mut().zip(header) {
            *slot = value;
        }
        if let Some(slot) = v.get_mut(ONE_HOT_OFFSET + category.one_hot_index()) {
            *slot = 1.0;
        }
        v
    }

    /// Record a sighting. Re-sighting the same category at the same cell
    /// refreshes that memory (keeping the higher significance) and moves it
    /// to the most recent position instead of adding a duplicate.
    pub fn remember(
        &mut self,
        category: MemoryCategory,
        location: Vec2,
        tick: Tick,
        significance: f32,
    ) {
        let significance = if significance.is_nan() {
            MIN_SIGNIFICANCE
        } else {
            significance.clamp(MIN_SIGNIFICANCE, MAX_SIGNIFICANCE)
        };
        let cell = location.cell();
        let significance = match self
            .memories
            .iter()
            .position(|m| m.entry.category == category && m.entry.location.cell() == cell)
        {
            Some(i) => self.memories.remove(i).entry.significance.max(significance),
            None => significance,
        };
        let embedding = self.embed(category, location, significance);
        self.memories.push(EpisodicMemory {
            entry: MemoryEntry {
                category,
                location,
                timestamp: tick,
                significance,
            },
            embedding,
            attention: 0.0,
        });
        self.evict();
    }

    /// Record everything notable in a perception: forage tiles weighted by
    /// hunger and peers weighted by social need.
    pub fn observe(&mut self, perception: &Perception) {
        let food_sig = perception.needs.hunger * FOOD_SIGHTING_WEIGHT;
        let peer_sig = perception.needs.social * PEER_SIGHTING_WEIGHT;
        let foods: Vec<Vec2> = perception
            .tiles_where(TerrainKind::is_forage)
            .map(crate::types::Cell::to_vec2)
            .collect();
        for pos in foods {
            self.remember(MemoryCategory::Food, pos, perception.tick, food_sig);
        }
        for &(_, pos) in &perception.nearby_agents {
            self.remember(MemoryCategory::Npc, pos, perception.tick, peer_sig);
        }
    }

    /// Drop the least significant memories until within capacity. Among
    /// equals the oldest goes first.
    fn evict(&mut self) {
        while self.memories.len() > self.capacity {
            let weakest = self
                .memories
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    a.entry
                        .significance
                        .partial_cmp(&b.entry.significance)
                        .unwrap_or(Ordering::Equal)
                })
                .map(|(i, _)| i);
            match weakest {
                Some(i) => {
                    self.memories.remove(i);
                }
                None => break,
            }
        }
    }

    /// Fade significance by `max(0.1, 1 - age / horizon)`.
    pub fn decay(&mut self, now: Tick) {
        for m in &mut self.memories {
            #[allow(clippy::cast_precision_loss)]
            let factor = (1.0 - m.entry.age(now) as f32 / self.decay_horizon).max(MIN_DECAY_FACTOR);
            m.entry.significance = (m.entry.significance * factor).max(MIN_SIGNIFICANCE);
            if let Some(slot) = m.embedding.get_mut(2) {
                *slot = m.entry.significance;
            }
        }
    }

    /// Recompute attention: dot product with `query` over the shared prefix,
    /// floored at 0, softmax-normalized across the buffer.
    pub fn compute_attention(&mut self, query: &[f32]) {
        if self.memories.is_empty() {
            return;
        }
        let scores: Vec<f32> = self
            .memories
            .iter()
            .map(|m| dot_prefix(query, &m.embedding).max(0.0))
            .collect();
        let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
        let sum: f32 = exps.iter().sum();
        for (m, e) in self.memories.iter_mut().zip(exps) {
            m.attention = if sum > 0.0 && sum.is_finite() { e / sum } else { 0.0 };
        }
    }

    /// Resurface faded memories that drew strong attention. Returns how many
    /// resurfaced.
    pub fn flashbacks(&mut self) -> usize {
        let mut count = 0;
        for m in &mut self.memories {
            if m.attention > self.recall_attention && m.entry.significance < self.recall_significance
            {
                m.entry.significance = (m.entry.significance + FLASHBACK_BOOST).min(MAX_SIGNIFICANCE);
                if let Some(slot) = m.embedding.get_mut(2) {
                    *slot = m.entry.significance;
                }
                count += 1;
            }
        }
        count
    }

    /// Context input for a policy model: up to `slots` most recent memories,
    /// newest first, each encoded as
    /// `[x/W, y/H, significance, attention, one-hot(category) at 4..8, 0…]`,
    /// concatenated and zero-padded to `slots * dim`.
    #[must_use]
    pub fn context_vector(&self, slots: usize) -> Vec<f32> {
        let mut context = vec![0.0; slots * self.dim];
        for (chunk, m) in context.chunks_mut(self.dim.max(1)).zip(self.memories.iter().rev()) {
            let header = [
                m.entry.location.x / self.world.0,
                m.entry.location.y / self.world.1,
                m.entry.significance,
                m.attention,
            ];
            for (slot, value) in chunk.iter_mut().zip(header) {
                *slot = value;
            }
            if let Some(slot) = chunk.get_mut(ONE_HOT_OFFSET + m.entry.category.one_hot_index()) {
                *slot = 1.0;
            }
        }
        context
    }

    /// Location of the nearest memory of `category`.
    #[must_use]
    pub fn nearest(&self, category: MemoryCategory, position: Vec2) -> Option<Vec2> {
        self.memories
            .iter()
            .filter(|m| m.entry.category == category)
            .map(|m| m.entry.location)
            .min_by(|a, b| {
                a.distance(position)
                    .partial_cmp(&b.distance(position))
                    .unwrap_or(Ordering::Equal)
            })
    }

    /// Replace the buffer contents (used when restoring a snapshot).
    /// Oversized input is trimmed by significance.
    pub fn restore(&mut self, memories: Vec<EpisodicMemory>) {
        self.memories = memories;
        for m in &mut self.memories {
            m.entry.significance = if m.entry.significance.is_nan() {
                MIN_SIGNIFICANCE
            } else {
                m.entry.significance.clamp(MIN_SIGNIFICANCE, MAX_SIGNIFICANCE)
            };
        }
        self.evict();
    }

    /// Memories, oldest first.
    #[must_use]
    pub fn memories(&self) -> &[EpisodicMemory] {
        &self.memories
    }

    /// Number of memories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.memories.len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.memories.is_empty()
    }

    /// Embedding dimensionality.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }
}
