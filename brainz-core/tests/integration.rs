//! Integration Tests: End-to-End Decision Flows
//!
//! Perceive → decide → outcome → learn chains for both brains, policy
//! model loading, and snapshot save/restore across brains and stores.

use brainz_core::action::{ActionKind, Outcome};
use brainz_core::brain::{AgentBrain, BehaviorTreeBrain, Brain, BrainKind, NeuralBrain};
use brainz_core::config::{BrainzConfig, PersistenceConfig};
use brainz_core::memory::MemoryCategory;
use brainz_core::needs::{NeedKind, Needs};
use brainz_core::perception::{Perception, Weather};
use brainz_core::persistence::SnapshotStore;
use brainz_core::types::{AgentId, Cell, Vec2};
use brainz_core::world::{GridView, TerrainKind, TileGrid};

fn visible(grid: &TileGrid, position: Vec2) -> Vec<(Cell, TerrainKind)> {
    let c = position.cell();
    let mut tiles = Vec::new();
    for y in c.y - 5..=c.y + 5 {
        for x in c.x - 5..=c.x + 5 {
            if grid.in_bounds(x, y) {
                tiles.push((Cell::new(x, y), grid.tile(x, y).terrain));
            }
        }
    }
    tiles
}

fn perceive(grid: &TileGrid, position: Vec2, needs: Needs, tick: u64) -> Perception {
    Perception {
        position,
        tick,
        nearby_tiles: visible(grid, position),
        needs,
        ..Perception::default()
    }
}

// ---------------------------------------------------------------------------
// Rule-based: hungry agent walks to food and eats
// ---------------------------------------------------------------------------

#[test]
fn hungry_agent_routes_to_food_then_eats() {
    let mut grid = TileGrid::new(20, 20, TerrainKind::Grass);
    grid.set(13, 10, TerrainKind::BerryBush);
    let hungry = Needs::new(0.9, 0.2, 0.2, 0.2, 0.2);
    let mut brain = BehaviorTreeBrain::new(AgentId(1), 3, &BrainzConfig::default());

    let first = brain.decide(&perceive(&grid, Vec2::new(10.0, 10.0), hungry, 1), &grid);
    assert_eq!(first.kind, ActionKind::Move);
    assert_eq!(first.target_position, Some(Vec2::new(13.0, 10.0)));
    assert_eq!(first.waypoints.first(), Some(&Cell::new(10, 10)));
    assert_eq!(first.waypoints.last(), Some(&Cell::new(13, 10)));
    assert_eq!(first.waypoints.len(), 4);

    let second = brain.decide(&perceive(&grid, Vec2::new(12.0, 10.0), hungry, 2), &grid);
    assert_eq!(second.kind, ActionKind::Eat);
    assert_eq!(second.target_position, Some(Vec2::new(13.0, 10.0)));

    brain.on_outcome(&Outcome::event("food").with_delta(NeedKind::Hunger, -0.3));
    assert!(!brain.memory().recall(MemoryCategory::Food, 3).is_empty());
}

// ---------------------------------------------------------------------------
// Rule-based: storm with a cave in view
// ---------------------------------------------------------------------------

#[test]
fn storm_sends_vulnerable_agent_to_cave() {
    let mut grid = TileGrid::new(30, 30, TerrainKind::Grass);
    grid.set(20, 12, TerrainKind::Cave);
    let mut brain = BehaviorTreeBrain::new(AgentId(1), 3, &BrainzConfig::default());
    let mut p = perceive(&grid, Vec2::new(12.0, 12.0), Needs::new(0.9, 0.2, 0.2, 0.2, 0.3), 5);
    p.weather = Weather::Storm;

    let action = brain.decide(&p, &grid);
    assert_eq!(action.kind, ActionKind::SeekShelter);
    assert_eq!(action.target_position, Some(Vec2::new(20.0, 12.0)));
    assert_eq!(action.waypoints.last(), Some(&Cell::new(20, 12)));
}

// ---------------------------------------------------------------------------
// Neural: long run stays bounded and learns relationships
// ---------------------------------------------------------------------------

#[test]
fn neural_brain_long_run_stays_bounded() {
    let mut grid = TileGrid::new(60, 40, TerrainKind::Grass);
    grid.set(30, 20, TerrainKind::BerryBush);
    grid.set(35, 22, TerrainKind::Cave);
    let mut brain = NeuralBrain::new(AgentId(4), 11, &BrainzConfig::default());

    for tick in 0..300_u64 {
        let mut p = perceive(&grid, Vec2::new(31.0, 21.0), Needs::new(0.8, 0.5, 0.8, 0.4, 0.6), tick);
        p.nearby_agents = vec![(AgentId(5), Vec2::new(32.0, 21.0))];
        let action = brain.decide(&p, &grid);
        let outcome = match action.kind {
            ActionKind::Eat | ActionKind::Forage => {
                Outcome::event("food").with_delta(NeedKind::Hunger, -0.3)
            }
            ActionKind::Socialize => Outcome::event("social:cooperative")
                .with_delta(NeedKind::Social, -0.1)
                .with_peer(AgentId(5)),
            _ => Outcome::event(action.kind.as_str()).with_delta(NeedKind::Hunger, 0.01),
        };
        brain.on_outcome(&outcome);
    }

    let state = brain.describe_state();
    let emotion = state.emotion.expect("neural brains report emotion");
    for v in [emotion.valence, emotion.arousal, emotion.dominance] {
        assert!((-1.0..=1.0).contains(&v));
    }
    let probs = state.action_probabilities.expect("probabilities");
    assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-4);
    assert!(state.memory_count <= 50);
    assert_eq!(state.replay_len, 100);
    assert_eq!(state.relationship_count, 1);
    let rel = brain.social().relationship(AgentId(5)).expect("peer learned");
    assert!(rel.embedding.iter().all(|v| v.abs() <= 2.0));
}

// ---------------------------------------------------------------------------
// Policy model: configured model drives the neural brain
// ---------------------------------------------------------------------------

#[test]
fn configured_model_is_used_and_broken_model_falls_back() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = BrainzConfig::default();
    let input_dim = 20 + cfg.neural.context_slots * cfg.neural.embedding_dim;

    let mut bias = vec![-5.0_f32; 12];
    bias[ActionKind::Rest.index()] = 10.0;
    bias[9..].copy_from_slice(&[0.2, 0.1, 0.0]);
    let model = serde_json::json!({
        "name": "rest-only",
        "input_dim": input_dim,
        "weights": vec![vec![0.0_f32; input_dim]; 12],
        "bias": bias,
    });
    let model_path = dir.path().join("policy.json");
    std::fs::write(&model_path, model.to_string()).expect("write model");

    let mut with_model = cfg.clone();
    with_model.neural.model_path = Some(model_path);
    let mut brain = NeuralBrain::new(AgentId(1), 1, &with_model);
    assert_eq!(brain.describe_state().policy.as_deref(), Some("rest-only"));

    let grid = TileGrid::new(20, 20, TerrainKind::Grass);
    let action = brain.decide(&perceive(&grid, Vec2::new(5.0, 5.0), Needs::default(), 1), &grid);
    assert_eq!(action.kind, ActionKind::Rest);
    let e = brain.emotion();
    assert!((e.valence - 0.2).abs() < 1e-5 && (e.arousal - 0.1).abs() < 1e-5);

    let mut broken = cfg;
    broken.neural.model_path = Some(dir.path().join("missing.json"));
    let fallback = NeuralBrain::new(AgentId(2), 1, &broken);
    assert_eq!(fallback.describe_state().policy.as_deref(), Some("heuristic"));
}

// ---------------------------------------------------------------------------
// Persistence: several brains saved and restored independently
// ---------------------------------------------------------------------------

#[test]
fn multi_agent_snapshot_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store =
        SnapshotStore::open(dir.path().join("world.db"), &PersistenceConfig::default()).expect("open");
    let cfg = BrainzConfig::default();
    let grid = TileGrid::new(40, 40, TerrainKind::Grass);

    let mut brains: Vec<NeuralBrain> = (1..=3)
        .map(|id| NeuralBrain::new(AgentId(id), u64::from(id), &cfg))
        .collect();
    for (i, brain) in brains.iter_mut().enumerate() {
        for tick in 0..20_u64 {
            #[allow(clippy::cast_precision_loss)]
            let x = 5.0 + i as f32 * 10.0;
            let mut p = perceive(&grid, Vec2::new(x, 10.0), Needs::new(0.6, 0.3, 0.8, 0.5, 0.5), tick);
            p.nearby_agents = vec![(AgentId(9), Vec2::new(x + 1.0, 10.0))];
            brain.decide(&p, &grid);
            brain.on_outcome(&Outcome::event("social:share").with_peer(AgentId(9)));
        }
        store.save(&brain.snapshot()).expect("save");
    }
    assert_eq!(store.count().expect("count"), 3);

    for original in &brains {
        let snapshot = store.load(original.owner()).expect("load").expect("present");
        let mut restored = NeuralBrain::new(original.owner(), 999, &cfg);
        restored.apply_snapshot(snapshot);
        assert_eq!(restored.emotion(), original.emotion());
        assert_eq!(restored.memory().len(), original.memory().len());
        assert_eq!(
            restored.social().relationship(AgentId(9)).map(|r| r.embedding.clone()),
            original.social().relationship(AgentId(9)).map(|r| r.embedding.clone()),
        );
    }
}

// ---------------------------------------------------------------------------
// Brain selection from configuration
// ---------------------------------------------------------------------------

#[test]
fn toml_config_shapes_both_brains() {
    let cfg = BrainzConfig::from_toml(
        "[memory]\ncapacity = 5\n\n[neural]\nbuffer_capacity = 4\n",
    )
    .expect("config");
    let grid = TileGrid::new(30, 30, TerrainKind::BerryBush);

    let mut rule = BehaviorTreeBrain::new(AgentId(1), 1, &cfg);
    assert_eq!(rule.memory().capacity(), 5);

    let mut neural = AgentBrain::from_config(BrainKind::Neural, AgentId(2), 1, &cfg);
    let p = perceive(&grid, Vec2::new(15.0, 15.0), Needs::new(0.9, 0.1, 0.1, 0.1, 0.1), 1);
    neural.decide(&p, &grid);
    rule.decide(&p, &grid);
    assert_eq!(neural.describe_state().memory_count, 4);
}
