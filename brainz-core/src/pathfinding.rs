//! A* search over the tile grid and bounded nearest-tile search.
//!
//! The search is 8-connected with cardinal steps costing 1 and diagonal
//! steps costing √2. The heuristic is Manhattan distance, which overestimates
//! diagonal travel, so returned paths are feasible but not always shortest.
//! Diagonal moves are allowed even when both adjacent cardinals are blocked.
//!
//! Every call owns its node arena; nothing survives between calls.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};

use ordered_float::OrderedFloat;
use tracing::trace;

use crate::types::Cell;
use crate::world::{GridView, Tile};

/// Default expansion budget.
pub const DEFAULT_MAX_EXPANSIONS: usize = 1000;

const DIAGONAL_COST: f32 = std::f32::consts::SQRT_2;

/// Neighbour offsets: the four cardinals (N, E, S, W) then the diagonals.
const NEIGHBOURS: [(i32, i32, f32); 8] = [
    (0, -1, 1.0),
    (1, 0, 1.0),
    (0, 1, 1.0),
    (-1, 0, 1.0),
    (1, -1, DIAGONAL_COST),
    (1, 1, DIAGONAL_COST),
    (-1, 1, DIAGONAL_COST),
    (-1, -1, DIAGONAL_COST),
];

// ---------------------------------------------------------------------------
// Frontier
// ---------------------------------------------------------------------------

struct Node {
    cell: Cell,
    g: f32,
    parent: Option<usize>,
}

/// Frontier entry. Ordered by f, then by discovery sequence so that equal-f
/// entries come out first-in first-out.
#[derive(PartialEq, Eq)]
struct Frontier {
    f: OrderedFloat<f32>,
    seq: u64,
    node: usize,
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f.cmp(&other.f).then_with(|| self.seq.cmp(&other.seq))
    }
}

#[allow(clippy::cast_precision_loss)]
fn manhattan(a: Cell, b: Cell) -> f32 {
    ((a.x - b.x).abs() + (a.y - b.y).abs()) as f32
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Find a walkable route from `start` to `goal`.
///
/// Returns the cells from `start` to `goal` inclusive, or an empty vector
/// when the goal is unwalkable, unreachable, or the search pops more than
/// `max_expansions` frontier entries.
#[must_use]
pub fn find_path(grid: &dyn GridView, start: Cell, goal: Cell, max_expansions: usize) -> Vec<Cell> {
    if !grid.is_walkable(goal.x, goal.y) {
        return Vec::new();
    }

    let mut nodes: Vec<Node> = Vec::new();
    let mut best: HashMap<Cell, usize> = HashMap::new();
    let mut closed: HashSet<Cell> = HashSet::new();
    let mut open: BinaryHeap<Reverse<Frontier>> = BinaryHeap::new();
    let mut seq: u64 = 0;

    nodes.push(Node {
        cell: start,
        g: 0.0,
        parent: None,
    });
    best.insert(start, 0);
    open.push(Reverse(Frontier {
        f: OrderedFloat(manhattan(start, goal)),
        seq,
        node: 0,
    }));

    let mut expansions = 0;
    while expansions < max_expansions {
        let Some(Reverse(entry)) = open.pop() else {
            break;
        };
        expansions += 1;

        let cell = nodes[entry.node].cell;
        if closed.contains(&cell) {
            continue;
        }
        if cell == goal {
            let path = reconstruct(&nodes, entry.node);
            trace!(%start, %goal, expansions, len = path.len(), "path found");
            return path;
        }
        closed.insert(cell);

        let g = nodes[entry.node].g;
        for (dx, dy, cost) in NEIGHBOURS {
            let next = Cell::new(cell.x + dx, cell.y + dy);
            if !grid.is_walkable(next.x, next.y) || closed.contains(&next) {
                continue;
            }
            let tentative = g + cost;
            if best.get(&next).is_some_and(|&i| tentative >= nodes[i].g) {
                continue;
            }
            let idx = nodes.len();
            nodes.push(Node {
                cell: next,
                g: tentative,
                parent: Some(entry.node),
            });
            best.insert(next, idx);
            seq += 1;
            open.push(Reverse(Frontier {
                f: OrderedFloat(tentative + manhattan(next, goal)),
                seq,
                node: idx,
            }));
        }
    }

    trace!(%start, %goal, expansions, "no path");
    Vec::new()
}

fn reconstruct(nodes: &[Node], mut idx: usize) -> Vec<Cell> {
    let mut path = vec![nodes[idx].cell];
    while let Some(parent) = nodes[idx].parent {
        path.push(nodes[parent].cell);
        idx = parent;
    }
    path.reverse();
    path
}

/// Summed step cost of a path (1 per cardinal step, √2 per diagonal).
#[must_use]
pub fn path_length(path: &[Cell]) -> f32 {
    path.windows(2)
        .map(|w| {
            if w[0].x != w[1].x && w[0].y != w[1].y {
                DIAGONAL_COST
            } else {
                1.0
            }
        })
        .sum()
}

// ---------------------------------------------------------------------------
// Spatial search
// ---------------------------------------------------------------------------

/// Nearest in-bounds tile around `origin` matching `predicate`, scanning the
/// square of half-width `⌊max_dist⌋` and accepting only tiles strictly closer
/// than `max_dist`. Ties keep the first tile in row-major scan order.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn nearest_tile(
    grid: &dyn GridView,
    origin: Cell,
    max_dist: f32,
    predicate: impl Fn(&Tile) -> bool,
) -> Option<Cell> {
    if !(max_dist > 0.0) {
        return None;
    }
    let radius = max_dist.floor() as i32;
    let limit = max_dist * max_dist;
    let mut found: Option<(Cell, f32)> = None;

    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let (x, y) = (origin.x + dx, origin.y + dy);
            if !grid.in_bounds(x, y) {
                continue;
            }
            let dist_sq = (dx * dx + dy * dy) as f32;
            if dist_sq >= limit || found.is_some_and(|(_, d)| dist_sq >= d) {
                continue;
            }
            if predicate(&grid.tile(x, y)) {
                found = Some((Cell::new(x, y), dist_sq));
            }
        }
    }
    found.map(|(c, _)| c)
}
