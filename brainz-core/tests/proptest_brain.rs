//! Property-Based Tests for brainz Core
//!
//! Uses `proptest` to verify decision-core invariants under random inputs:
//! bounded drives, valid routes, bounded memory, normalized distributions,
//! bounded embeddings, and seed-determinism.

use proptest::prelude::*;

use brainz_core::action::{ACTION_COUNT, Outcome};
use brainz_core::brain::{BehaviorTreeBrain, Brain};
use brainz_core::config::{BrainzConfig, MemoryConfig, SocialConfig};
use brainz_core::emotion::EmotionalState;
use brainz_core::inference::normalize;
use brainz_core::memory::{MemoryCategory, SpatialMemory};
use brainz_core::needs::{NeedKind, Needs};
use brainz_core::pathfinding::find_path;
use brainz_core::perception::Perception;
use brainz_core::social::{InteractionKind, SocialModel};
use brainz_core::types::{AgentId, Cell, Vec2, cosine_similarity};
use brainz_core::world::{GridView, TerrainKind, TileGrid};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_needs() -> impl Strategy<Value = Needs> {
    (
        -1.0..2.0f32,
        -1.0..2.0f32,
        -1.0..2.0f32,
        -1.0..2.0f32,
        -1.0..2.0f32,
    )
        .prop_map(|(h, e, s, c, sa)| Needs::new(h, e, s, c, sa))
}

fn arb_category() -> impl Strategy<Value = MemoryCategory> {
    prop::sample::select(MemoryCategory::ALL.to_vec())
}

fn arb_kind() -> impl Strategy<Value = InteractionKind> {
    prop::sample::select(vec![
        InteractionKind::Cooperative,
        InteractionKind::Competitive,
        InteractionKind::Neutral,
        InteractionKind::Other,
    ])
}

fn in_unit(v: f32) -> bool {
    (0.0..=1.0).contains(&v)
}

// ---------------------------------------------------------------------------
// Property: drives stay in [0, 1] and the most urgent drive is consistent
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn needs_stay_bounded(
        needs in arb_needs(),
        dt in 0.0..1000.0f32,
        delta in -5.0..5.0f32,
    ) {
        let mut n = needs;
        n.update(dt);
        n.apply_delta(NeedKind::Social, delta);
        for kind in NeedKind::ALL {
            prop_assert!(in_unit(n.get(kind)));
        }
    }

    #[test]
    fn most_urgent_kind_matches_max(needs in arb_needs()) {
        let max = needs.most_urgent();
        match needs.most_urgent_kind() {
            Some(kind) => prop_assert!((needs.urgency(kind) - max).abs() < f32::EPSILON),
            None => prop_assert!(max <= 0.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Property: A* routes are contiguous and no longer than the Chebyshev bound
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn open_grid_routes_are_optimal_and_contiguous(
        sx in 0i32..30, sy in 0i32..20,
        gx in 0i32..30, gy in 0i32..20,
    ) {
        let grid = TileGrid::new(30, 20, TerrainKind::Grass);
        let path = find_path(&grid, Cell::new(sx, sy), Cell::new(gx, gy), 10_000);
        let bound = (sx - gx).abs().max((sy - gy).abs()) + 1;
        prop_assert_eq!(path.first(), Some(&Cell::new(sx, sy)));
        prop_assert_eq!(path.last(), Some(&Cell::new(gx, gy)));
        prop_assert_eq!(i32::try_from(path.len()).expect("small"), bound);
        for w in path.windows(2) {
            prop_assert!((w[0].x - w[1].x).abs() <= 1 && (w[0].y - w[1].y).abs() <= 1);
        }
    }

    #[test]
    fn routes_never_cross_water(
        walls in prop::collection::vec((0i32..20, 0i32..20), 0..60),
        gx in 0i32..20, gy in 0i32..20,
    ) {
        let mut grid = TileGrid::new(20, 20, TerrainKind::Grass);
        for (x, y) in walls {
            grid.set(x, y, TerrainKind::Water);
        }
        grid.set(0, 0, TerrainKind::Grass);
        let path = find_path(&grid, Cell::new(0, 0), Cell::new(gx, gy), 10_000);
        for c in &path {
            prop_assert!(grid.is_walkable(c.x, c.y));
        }
        if !grid.is_walkable(gx, gy) {
            prop_assert!(path.is_empty());
        }
    }
}

// ---------------------------------------------------------------------------
// Property: spatial memory is bounded and decay never raises significance
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn spatial_memory_bounded(
        adds in prop::collection::vec((arb_category(), 0.0..200.0f32, 0.0..150.0f32, -1.0..2.0f32), 0..250),
    ) {
        let cfg = MemoryConfig::default();
        let mut memory = SpatialMemory::new(&cfg);
        for (i, (cat, x, y, sig)) in adds.into_iter().enumerate() {
            memory.add_memory(cat, Vec2::new(x, y), i as u64, sig);
            prop_assert!(memory.len() <= cfg.capacity);
        }
        for e in memory.entries() {
            prop_assert!(e.significance >= cfg.significance_floor && e.significance <= 1.0);
        }
    }

    #[test]
    fn decay_is_monotone(
        sigs in prop::collection::vec(0.0..1.0f32, 1..50),
        now in 0u64..5000,
    ) {
        let mut memory = SpatialMemory::new(&MemoryConfig::default());
        for (i, sig) in sigs.iter().enumerate() {
            memory.add_memory(MemoryCategory::Food, Vec2::new(i as f32, 0.0), 0, *sig);
        }
        let before: Vec<f32> = memory.entries().iter().map(|e| e.significance).collect();
        memory.decay(now);
        for (old, e) in before.iter().zip(memory.entries()) {
            prop_assert!(e.significance <= *old + f32::EPSILON);
            prop_assert!(e.significance >= MemoryConfig::default().significance_floor);
        }
    }
}

// ---------------------------------------------------------------------------
// Property: distributions stay normalized through mood modulation
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn modulated_distribution_sums_to_one(
        raw in prop::array::uniform9(-1.0..5.0f32),
        v in -3.0..3.0f32, a in -3.0..3.0f32, d in -3.0..3.0f32,
    ) {
        let mut probs: [f32; ACTION_COUNT] = raw;
        normalize(&mut probs);
        let mood = EmotionalState::new(v, a, d);
        prop_assert!((-1.0..=1.0).contains(&mood.valence));
        mood.modulate(&mut probs);
        let sum: f32 = probs.iter().sum();
        prop_assert!((sum - 1.0).abs() < 1e-4);
        prop_assert!(probs.iter().all(|p| *p >= 0.0));
    }
}

// ---------------------------------------------------------------------------
// Property: relationship embeddings stay in bounds
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn relationship_embeddings_bounded(
        seed in any::<u64>(),
        events in prop::collection::vec((1u32..6, arb_kind(), -5.0..5.0f32), 1..200),
    ) {
        let mut model = SocialModel::new(&SocialConfig::default(), seed);
        for (tick, (peer, kind, valence)) in events.into_iter().enumerate() {
            model.record_interaction(AgentId(peer), kind, valence, tick as u64);
        }
        for rel in model.iter() {
            prop_assert!(rel.embedding.iter().all(|v| v.abs() <= 2.0));
            prop_assert!((-1.0..=1.0).contains(&rel.trust));
            prop_assert!((-1.0..=1.0).contains(&rel.affinity));
            let norm: f32 = rel.embedding.iter().map(|v| v * v).sum();
            if norm > 1e-6 {
                prop_assert!((cosine_similarity(&rel.embedding, &rel.embedding) - 1.0).abs() < 1e-4);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property: same seed, same inputs, same decisions
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn rule_brain_is_seed_deterministic(
        seed in any::<u64>(),
        steps in prop::collection::vec((arb_needs(), 0.0..40.0f32, 0.0..30.0f32), 1..20),
    ) {
        let mut grid = TileGrid::new(40, 30, TerrainKind::Grass);
        grid.set(20, 15, TerrainKind::BerryBush);
        grid.set(5, 5, TerrainKind::Cave);
        let cfg = BrainzConfig::default();
        let mut a = BehaviorTreeBrain::new(AgentId(1), seed, &cfg);
        let mut b = BehaviorTreeBrain::new(AgentId(1), seed, &cfg);
        for (tick, (needs, x, y)) in steps.into_iter().enumerate() {
            let p = Perception {
                position: Vec2::new(x, y),
                tick: tick as u64,
                needs,
                ..Perception::default()
            };
            prop_assert_eq!(a.decide(&p, &grid), b.decide(&p, &grid));
            a.on_outcome(&Outcome::event("observe"));
            b.on_outcome(&Outcome::event("observe"));
        }
    }
}
