//! Property tests for the host loop.

use brainz_core::brain::BrainKind;
use brainz_core::types::Vec2;
use brainz_core::world::{TerrainKind, TileGrid};
use brainz_sim::{SimConfig, Simulation};
use proptest::prelude::*;

fn grid(bushes: &[(i32, i32)]) -> TileGrid {
    let mut grid = TileGrid::new(32, 24, TerrainKind::Grass);
    for &(x, y) in bushes {
        grid.set(x, y, TerrainKind::BerryBush);
    }
    grid.set(0, 0, TerrainKind::Cave);
    grid
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn agents_stay_on_grid_with_bounded_needs(
        seed in any::<u64>(),
        starts in prop::collection::vec((0.0f32..31.0, 0.0f32..23.0, any::<bool>()), 1..5),
        bushes in prop::collection::vec((0i32..32, 0i32..24), 0..6),
    ) {
        let mut sim = Simulation::new(grid(&bushes), SimConfig::default(), seed);
        for (x, y, neural) in starts {
            let kind = if neural { BrainKind::Neural } else { BrainKind::RuleBased };
            sim.spawn(kind, Vec2::new(x, y));
        }
        for _ in 0..40 {
            sim.tick(0.1);
        }
        for agent in sim.agents() {
            prop_assert!((0.0..=31.0).contains(&agent.position.x));
            prop_assert!((0.0..=23.0).contains(&agent.position.y));
            let n = agent.needs;
            for v in [n.hunger, n.energy, n.social, n.curiosity, n.safety] {
                prop_assert!((0.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn every_agent_decides_once_per_tick(count in 1usize..6, ticks in 1usize..10) {
        let mut sim = Simulation::new(grid(&[]), SimConfig::default(), 7);
        for i in 0..count {
            #[allow(clippy::cast_precision_loss)]
            let x = i as f32 * 3.0;
            sim.spawn(BrainKind::RuleBased, Vec2::new(x, 5.0));
        }
        for _ in 0..ticks {
            let records = sim.tick(0.1);
            prop_assert_eq!(records.len(), count);
            prop_assert!(records.windows(2).all(|w| w[0].agent < w[1].agent));
        }
    }
}
