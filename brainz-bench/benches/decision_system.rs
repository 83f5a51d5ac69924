//! brainz Benchmark Suite
//!
//! Per-tick decision budgets on a 200×150 grid:
//!   astar_diagonal_200x150 ........... bounded by 1000 expansions
//!   spatial_memory_add_and_decay ..... 100 entries
//!   rule_based_decide ................ one decision
//!   neural_decide .................... one decision
//!   sim_step_20_agents ............... one full tick

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use brainz_core::brain::{BehaviorTreeBrain, Brain, NeuralBrain};
use brainz_core::config::{BrainzConfig, MemoryConfig};
use brainz_core::memory::{MemoryCategory, SpatialMemory};
use brainz_core::needs::Needs;
use brainz_core::pathfinding::{DEFAULT_MAX_EXPANSIONS, find_path};
use brainz_core::perception::Perception;
use brainz_core::types::{AgentId, Cell, Vec2};
use brainz_core::world::{GridView, TerrainKind, TileGrid};
use brainz_core::BrainKind;
use brainz_sim::{SimConfig, Simulation};

/// Grass with scattered water, trees, bushes, and caves.
fn world() -> TileGrid {
    let mut grid = TileGrid::new(200, 150, TerrainKind::Grass);
    for y in 0..150 {
        for x in 0..200 {
            let terrain = match (x * 7 + y * 13) % 97 {
                0..=5 => TerrainKind::Water,
                6..=9 => TerrainKind::Tree,
                10 => TerrainKind::BerryBush,
                11 if x % 5 == 0 => TerrainKind::Cave,
                _ => continue,
            };
            grid.set(x, y, terrain);
        }
    }
    grid
}

fn perception(grid: &TileGrid, position: Vec2) -> Perception {
    let centre = position.cell();
    let mut nearby_tiles = Vec::new();
    for y in centre.y - 5..=centre.y + 5 {
        for x in centre.x - 5..=centre.x + 5 {
            nearby_tiles.push((Cell::new(x, y), grid.tile(x, y).terrain));
        }
    }
    Perception {
        position,
        tick: 500,
        nearby_tiles,
        nearby_agents: vec![(AgentId(2), position + Vec2::new(3.0, 1.0))],
        needs: Needs::new(0.8, 0.4, 0.5, 0.6, 0.9),
        ..Perception::default()
    }
}

fn bench_pathfinding(c: &mut Criterion) {
    let grid = world();
    c.bench_function("astar_diagonal_200x150", |b| {
        b.iter(|| {
            let path = find_path(
                black_box(&grid),
                Cell::new(2, 2),
                Cell::new(60, 45),
                DEFAULT_MAX_EXPANSIONS,
            );
            black_box(path);
        });
    });
}

fn bench_memory(c: &mut Criterion) {
    c.bench_function("spatial_memory_add_and_decay", |b| {
        b.iter(|| {
            let mut memory = SpatialMemory::new(&MemoryConfig::default());
            for i in 0..100_u16 {
                let x = f32::from(i);
                memory.add_memory(MemoryCategory::Food, Vec2::new(x, x * 0.5), u64::from(i), 0.5);
            }
            memory.decay(black_box(500));
            black_box(memory.len());
        });
    });
}

fn bench_brains(c: &mut Criterion) {
    let grid = world();
    let cfg = BrainzConfig::default();
    let p = perception(&grid, Vec2::new(100.0, 75.0));

    let mut rule = BehaviorTreeBrain::new(AgentId(1), 1, &cfg);
    c.bench_function("rule_based_decide", |b| {
        b.iter(|| black_box(rule.decide(black_box(&p), &grid)));
    });

    let mut neural = NeuralBrain::new(AgentId(1), 1, &cfg);
    c.bench_function("neural_decide", |b| {
        b.iter(|| black_box(neural.decide(black_box(&p), &grid)));
    });
}

fn bench_step(c: &mut Criterion) {
    let mut sim = Simulation::new(world(), SimConfig::default(), 9);
    for i in 0..20_u8 {
        let kind = if i % 2 == 0 { BrainKind::RuleBased } else { BrainKind::Neural };
        let offset = f32::from(i) * 4.0;
        sim.spawn(kind, Vec2::new(20.0 + offset, 30.0 + offset * 0.5));
    }
    c.bench_function("sim_step_20_agents", |b| {
        b.iter(|| black_box(sim.tick(0.1)));
    });
}

criterion_group!(benches, bench_pathfinding, bench_memory, bench_brains, bench_step);
criterion_main!(benches);
