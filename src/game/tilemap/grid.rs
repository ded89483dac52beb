/// Tile occupancy and the read-only queries the simulation runs against it.
///
/// World space is y-down with the origin at the top-left of tile (0, 0).
/// A world position maps to a tile by floor division with `tile_size`.

use bevy::prelude::*;
use rand::Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Default edge length of a tile in world units (pixels).
pub const DEFAULT_TILE_SIZE: i32 = 16;

/// Offsets of the 3×3 neighbourhood scanned for colliders, centre included.
const NEIGHBOR_OFFSETS: [(i32, i32); 9] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0), (0, 0), (1, 0),
    (-1, 1), (0, 1), (1, 1),
];

// ============================================================================
// Coordinates
// ============================================================================

/// Integer grid coordinate of a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance, the A* heuristic on a 4-connected grid.
    pub fn manhattan(self, other: TileCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The four orthogonal neighbours: up, down, left, right.
    pub fn neighbors4(self) -> [TileCoord; 4] {
        [
            TileCoord::new(self.x, self.y - 1),
            TileCoord::new(self.x, self.y + 1),
            TileCoord::new(self.x - 1, self.y),
            TileCoord::new(self.x + 1, self.y),
        ]
    }
}

impl From<(i32, i32)> for TileCoord {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

// ============================================================================
// Tiles
// ============================================================================

/// Tile type names understood by the level format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Grass,
    Stone,
    Decor,
    LargeDecor,
    Spawners,
    #[serde(other)]
    Other,
}

impl TileKind {
    /// Kinds that take part in physics collision.
    pub const PHYSICS: [TileKind; 2] = [TileKind::Grass, TileKind::Stone];

    pub fn is_solid(self) -> bool {
        Self::PHYSICS.contains(&self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    pub variant: u32,
}

impl Tile {
    pub const fn new(kind: TileKind, variant: u32) -> Self {
        Self { kind, variant }
    }

    pub fn is_solid(&self) -> bool {
        self.kind.is_solid()
    }
}

/// Decoration placed at an arbitrary world position. Ignored by physics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OffgridTile {
    pub kind: TileKind,
    pub variant: u32,
    pub pos: Vec2,
}

/// A tile pulled out of the grid by [`TileGrid::extract`], with its world position.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractedTile {
    pub kind: TileKind,
    pub variant: u32,
    pub pos: Vec2,
}

// ============================================================================
// Grid
// ============================================================================

/// Sparse tile grid for the loaded level.
///
/// `width`/`height` bound the walkable area used by the pathfinder; tiles may
/// exist outside it (editor maps often have decoration at negative
/// coordinates) but such tiles are never walkable.
#[derive(Resource, Clone, Debug, Serialize, Deserialize)]
pub struct TileGrid {
    pub tile_size: i32,
    pub width: i32,
    pub height: i32,
    tiles: FxHashMap<TileCoord, Tile>,
    pub offgrid: Vec<OffgridTile>,
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_SIZE)
    }
}

impl TileGrid {
    pub fn new(tile_size: i32) -> Self {
        Self {
            tile_size: tile_size.max(1),
            width: 0,
            height: 0,
            tiles: FxHashMap::default(),
            offgrid: Vec::new(),
        }
    }

    /// Empty grid with explicit bounds.
    pub fn with_bounds(tile_size: i32, width: i32, height: i32) -> Self {
        let mut grid = Self::new(tile_size);
        grid.width = width.max(0);
        grid.height = height.max(0);
        grid
    }

    pub fn insert(&mut self, coord: TileCoord, tile: Tile) -> Option<Tile> {
        self.tiles.insert(coord, tile)
    }

    pub fn remove(&mut self, coord: TileCoord) -> Option<Tile> {
        self.tiles.remove(&coord)
    }

    /// Fill every tile of an inclusive rectangle with `tile`.
    pub fn fill(&mut self, from: TileCoord, to: TileCoord, tile: Tile) {
        for y in from.y.min(to.y)..=from.y.max(to.y) {
            for x in from.x.min(to.x)..=from.x.max(to.x) {
                self.tiles.insert(TileCoord::new(x, y), tile);
            }
        }
    }

    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    pub fn tiles(&self) -> impl Iterator<Item = (TileCoord, &Tile)> {
        self.tiles.iter().map(|(coord, tile)| (*coord, tile))
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Grow `width`/`height` to cover every grid tile with non-negative coordinates.
    pub fn recompute_bounds(&mut self) {
        let (mut width, mut height) = (0, 0);
        for coord in self.tiles.keys() {
            if coord.x >= 0 && coord.y >= 0 {
                width = width.max(coord.x.saturating_add(1));
                height = height.max(coord.y.saturating_add(1));
            }
        }
        self.width = width;
        self.height = height;
    }

    // ------------------------------------------------------------------------
    // Coordinate conversion
    // ------------------------------------------------------------------------

    pub fn world_to_tile(&self, world_pos: Vec2) -> TileCoord {
        let size = self.tile_size.max(1) as f32;
        TileCoord::new(
            (world_pos.x / size).floor() as i32,
            (world_pos.y / size).floor() as i32,
        )
    }

    /// Top-left corner of a tile in world space.
    pub fn tile_to_world(&self, coord: TileCoord) -> Vec2 {
        let size = self.tile_size as f32;
        Vec2::new(coord.x as f32 * size, coord.y as f32 * size)
    }

    pub fn tile_rect(&self, coord: TileCoord) -> Rect {
        let min = self.tile_to_world(coord);
        let size = self.tile_size as f32;
        Rect::from_corners(min, min + Vec2::splat(size))
    }

    pub fn in_bounds(&self, coord: TileCoord) -> bool {
        coord.x >= 0 && coord.y >= 0 && coord.x < self.width && coord.y < self.height
    }

    /// Dense row-major index of an in-bounds tile.
    pub fn index(&self, coord: TileCoord) -> Option<usize> {
        self.in_bounds(coord)
            .then(|| coord.y as usize * self.width as usize + coord.x as usize)
    }

    /// Number of in-bounds cells, the size of any dense per-tile buffer.
    pub fn cell_count(&self) -> usize {
        self.width.max(0) as usize * self.height.max(0) as usize
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn is_solid_tile(&self, coord: TileCoord) -> bool {
        self.tiles.get(&coord).is_some_and(Tile::is_solid)
    }

    /// Whether the tile containing `world_pos` is a physics tile.
    pub fn is_solid(&self, world_pos: Vec2) -> bool {
        self.is_solid_tile(self.world_to_tile(world_pos))
    }

    /// In bounds and not solid. Empty cells are walkable.
    pub fn is_walkable(&self, coord: TileCoord) -> bool {
        self.in_bounds(coord) && !self.is_solid_tile(coord)
    }

    /// Tiles present in the 3×3 neighbourhood of the tile containing `world_pos`.
    pub fn tiles_around(&self, world_pos: Vec2) -> impl Iterator<Item = (TileCoord, &Tile)> {
        let center = self.world_to_tile(world_pos);
        NEIGHBOR_OFFSETS.iter().filter_map(move |&(dx, dy)| {
            let coord = TileCoord::new(center.x.saturating_add(dx), center.y.saturating_add(dy));
            self.tiles.get(&coord).map(|tile| (coord, tile))
        })
    }

    /// One tile-sized rectangle per solid tile around `world_pos`.
    pub fn physics_rects_around(&self, world_pos: Vec2) -> SmallVec<[Rect; 9]> {
        self.tiles_around(world_pos)
            .filter(|(_, tile)| tile.is_solid())
            .map(|(coord, _)| self.tile_rect(coord))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Level setup helpers
    // ------------------------------------------------------------------------

    /// Collect grid and off-grid tiles matching any `(kind, variant)` pair.
    ///
    /// Matches are removed from the grid unless `keep` is set. Grid tiles are
    /// reported at their top-left world position.
    pub fn extract(&mut self, pairs: &[(TileKind, u32)], keep: bool) -> Vec<ExtractedTile> {
        let matches = |kind: TileKind, variant: u32| pairs.contains(&(kind, variant));
        let mut found: Vec<ExtractedTile> = self
            .offgrid
            .iter()
            .filter(|deco| matches(deco.kind, deco.variant))
            .map(|deco| ExtractedTile { kind: deco.kind, variant: deco.variant, pos: deco.pos })
            .collect();
        if !keep {
            self.offgrid.retain(|deco| !matches(deco.kind, deco.variant));
        }

        let mut grid_hits: Vec<TileCoord> = self
            .tiles
            .iter()
            .filter(|(_, tile)| matches(tile.kind, tile.variant))
            .map(|(coord, _)| *coord)
            .collect();
        // Hash map order is arbitrary; spawn order should not be.
        grid_hits.sort();
        for coord in grid_hits {
            let tile = if keep { self.tiles.get(&coord).copied() } else { self.tiles.remove(&coord) };
            if let Some(tile) = tile {
                found.push(ExtractedTile {
                    kind: tile.kind,
                    variant: tile.variant,
                    pos: self.tile_to_world(coord),
                });
            }
        }

        found
    }

    /// Pick a random in-bounds tile that is not solid, trying at most `attempts` times.
    pub fn random_open_tile<R: Rng + ?Sized>(&self, rng: &mut R, attempts: usize) -> Option<TileCoord> {
        if self.width <= 0 || self.height <= 0 {
            return None;
        }
        (0..attempts)
            .map(|_| TileCoord::new(rng.random_range(0..self.width), rng.random_range(0..self.height)))
            .find(|coord| !self.is_solid_tile(*coord))
    }
}
