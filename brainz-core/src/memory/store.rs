//! Bounded spatial memory with significance eviction and linear fade.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{MemoryCategory, MemoryEntry};
use crate::config::MemoryConfig;
use crate::types::{Tick, Vec2};

/// Per-agent store of remembered places.
///
/// Capacity is enforced on insert: when the store overflows, every entry is
/// re-ranked by significance and the weakest are dropped. Decay only fades
/// significance; entries are never removed by age.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpatialMemory {
    entries: Vec<MemoryEntry>,
    capacity: usize,
    decay_rate: f32,
    floor: f32,
}

impl Default for SpatialMemory {
    fn default() -> Self {
        Self::new(&MemoryConfig::default())
    }
}

impl SpatialMemory {
    /// Create an empty store.
    #[must_use]
    pub fn new(config: &MemoryConfig) -> Self {
        Self {
            entries: Vec::new(),
            capacity: config.capacity,
            decay_rate: config.decay_rate,
            floor: config.significance_floor,
        }
    }

    /// Remember a place. Significance is clamped into [floor, 1].
    ///
    /// If the store exceeds capacity, all entries are stably sorted by
    /// descending significance and the tail is dropped.
    pub fn add_memory(
        &mut self,
        category: MemoryCategory,
        location: Vec2,
        tick: Tick,
        significance: f32,
    ) {
        let significance = if significance.is_nan() {
            self.floor
        } else {
            significance.clamp(self.floor, 1.0)
        };
        self.entries.push(MemoryEntry {
            category,
            location,
            timestamp: tick,
            significance,
        });

        if self.entries.len() > self.capacity {
            self.entries.sort_by(|a, b| {
                b.significance
                    .partial_cmp(&a.significance)
                    .unwrap_or(Ordering::Equal)
            });
            let dropped = self.entries.len() - self.capacity;
            self.entries.truncate(self.capacity);
            trace!(dropped, capacity = self.capacity, "spatial memory evicted");
        }
    }

    /// Up to `limit` memories of `category`, most significant first.
    #[must_use]
    pub fn recall(&self, category: MemoryCategory, limit: usize) -> Vec<MemoryEntry> {
        let mut hits: Vec<MemoryEntry> = self
            .entries
            .iter()
            .filter(|e| e.category == category)
            .copied()
            .collect();
        hits.sort_by(|a, b| {
            b.significance
                .partial_cmp(&a.significance)
                .unwrap_or(Ordering::Equal)
        });
        hits.truncate(limit);
        hits
    }

    /// Up to `limit` memories within `radius` of `position`, nearest first.
    #[must_use]
    pub fn recall_nearby(&self, position: Vec2, radius: f32, limit: usize) -> Vec<MemoryEntry> {
        let mut hits: Vec<(f32, MemoryEntry)> = self
            .entries
            .iter()
            .filter_map(|e| {
                let d = e.location.distance(position);
                (d <= radius).then_some((d, *e))
            })
            .collect();
        hits.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        hits.into_iter().take(limit).map(|(_, e)| e).collect()
    }

    /// The most significant of the top `limit` memories of `category` that
    /// lies strictly within `radius` of `position`.
    #[must_use]
    pub fn recall_within(
        &self,
        category: MemoryCategory,
        position: Vec2,
        radius: f32,
        limit: usize,
    ) -> Option<MemoryEntry> {
        self.recall(category, limit)
            .into_iter()
            .find(|e| e.location.distance(position) < radius)
    }

    /// Fade every entry: `significance *= 1 - rate * age`, floored.
    pub fn decay(&mut self, now: Tick) {
        for e in &mut self.entries {
            #[allow(clippy::cast_precision_loss)]
            let factor = 1.0 - self.decay_rate * e.age(now) as f32;
            e.significance = (e.significance * factor).max(self.floor);
        }
    }

    /// Categories of entries whose significance exceeds `threshold`,
    /// deduplicated in first-seen order.
    #[must_use]
    pub fn salient(&self, threshold: f32) -> Vec<MemoryCategory> {
        let mut out = Vec::new();
        for e in &self.entries {
            if e.significance > threshold && !out.contains(&e.category) {
                out.push(e.category);
            }
        }
        out
    }

    /// All entries, in storage order.
    #[must_use]
    pub fn entries(&self) -> &[MemoryEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
