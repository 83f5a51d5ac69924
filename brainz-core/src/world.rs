//! Read-only view of the tile grid that brains plan against.
//!
//! The core never owns the world; it queries it through [`GridView`].
//! [`TileGrid`] is a dense in-memory implementation used by the simulation
//! layer, tests, and benches.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Terrain of a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    /// Impassable water.
    Water,
    /// Beach sand.
    Sand,
    /// Open grass.
    Grass,
    /// Bare dirt.
    Dirt,
    /// Rock.
    Stone,
    /// Tree trunk; impassable, offers cover.
    Tree,
    /// Edible berries.
    BerryBush,
    /// Natural shelter.
    Cave,
    /// Built shelter.
    Shelter,
}

impl TerrainKind {
    /// Whether agents can stand on this terrain.
    #[must_use]
    pub fn is_walkable(self) -> bool {
        !matches!(self, Self::Water | Self::Tree)
    }

    /// Terrain agents associate with food.
    #[must_use]
    pub fn is_forage(self) -> bool {
        matches!(self, Self::BerryBush | Self::Tree)
    }

    /// Terrain that yields food when eaten from.
    #[must_use]
    pub fn is_food_tile(self) -> bool {
        matches!(self, Self::BerryBush)
    }

    /// Terrain that protects from weather and threats.
    #[must_use]
    pub fn is_shelter(self) -> bool {
        matches!(self, Self::Cave | Self::Shelter)
    }

    /// Stable lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::Sand => "sand",
            Self::Grass => "grass",
            Self::Dirt => "dirt",
            Self::Stone => "stone",
            Self::Tree => "tree",
            Self::BerryBush => "berry_bush",
            Self::Cave => "cave",
            Self::Shelter => "shelter",
        }
    }
}

impl fmt::Display for TerrainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single grid tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Terrain kind.
    pub terrain: TerrainKind,
    /// Whether agents can stand here.
    pub walkable: bool,
    /// Remaining food units (berry bushes only).
    pub food: u32,
}

impl Tile {
    /// Units of food a fresh berry bush carries.
    pub const BUSH_FOOD: u32 = 5;

    /// Returned for any coordinate outside the grid.
    pub const OUT_OF_BOUNDS: Self = Self {
        terrain: TerrainKind::Water,
        walkable: false,
        food: 0,
    };

    /// A fresh tile of the given terrain.
    #[must_use]
    pub fn new(terrain: TerrainKind) -> Self {
        Self {
            terrain,
            walkable: terrain.is_walkable(),
            food: if terrain.is_food_tile() { Self::BUSH_FOOD } else { 0 },
        }
    }

    /// Whether food can be taken from this tile.
    #[must_use]
    pub fn has_food(&self) -> bool {
        self.food > 0
    }
}

/// Read-only grid query surface used by brains and the pathfinder.
pub trait GridView {
    /// Grid width in tiles.
    fn width(&self) -> i32;

    /// Grid height in tiles.
    fn height(&self) -> i32;

    /// Tile at `(x, y)`, or [`Tile::OUT_OF_BOUNDS`] outside the grid.
    fn tile(&self, x: i32, y: i32) -> Tile;

    /// Whether `(x, y)` lies inside the grid.
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width() && y < self.height()
    }

    /// Whether an agent can stand on `(x, y)`. False outside the grid.
    fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.tile(x, y).walkable
    }
}

/// Dense row-major tile grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// A `width × height` grid filled with one terrain. Negative dimensions
    /// produce an empty grid.
    #[must_use]
    pub fn new(width: i32, height: i32, fill: TerrainKind) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let len = usize::try_from(width).unwrap_or(0) * usize::try_from(height).unwrap_or(0);
        Self {
            width,
            height,
            tiles: vec![Tile::new(fill); len],
        }
    }

    /// Build a grid from ASCII rows.
    ///
    /// `~` water, `s` sand, `.` grass, `d` dirt, `#` stone, `T` tree,
    /// `b` berry bush, `C` cave, `H` shelter. Unknown characters are grass.
    /// Short rows are padded with grass.
    #[must_use]
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = i32::try_from(rows.len()).unwrap_or(i32::MAX);
        let width = rows
            .iter()
            .map(|r| i32::try_from(r.chars().count()).unwrap_or(i32::MAX))
            .max()
            .unwrap_or(0);
        let mut grid = Self::new(width, height, TerrainKind::Grass);
        for (y, row) in (0..height).zip(rows) {
            for (x, ch) in (0..width).zip(row.chars()) {
                let terrain = match ch {
                    '~' => TerrainKind::Water,
                    's' => TerrainKind::Sand,
                    'd' => TerrainKind::Dirt,
                    '#' => TerrainKind::Stone,
                    'T' => TerrainKind::Tree,
                    'b' => TerrainKind::BerryBush,
                    'C' => TerrainKind::Cave,
                    'H' => TerrainKind::Shelter,
                    _ => TerrainKind::Grass,
                };
                grid.set(x, y, terrain);
            }
        }
        grid
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            usize::try_from(y * self.width + x).ok()
        } else {
            None
        }
    }

    /// Replace the terrain at `(x, y)`. Ignored outside the grid.
    pub fn set(&mut self, x: i32, y: i32, terrain: TerrainKind) {
        if let Some(i) = self.index(x, y) {
            self.tiles[i] = Tile::new(terrain);
        }
    }

    /// Mutable access to a tile inside the grid.
    pub fn tile_mut(&mut self, x: i32, y: i32) -> Option<&mut Tile> {
        self.index(x, y).map(|i| &mut self.tiles[i])
    }
}

impl GridView for TileGrid {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn tile(&self, x: i32, y: i32) -> Tile {
        self.index(x, y).map_or(Tile::OUT_OF_BOUNDS, |i| self.tiles[i])
    }
}
