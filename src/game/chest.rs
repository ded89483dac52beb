/// The chest pickup placed once per level load.

use bevy::prelude::*;
use rand::Rng;

use crate::game::simulation::rects_overlap;
use crate::game::tilemap::TileGrid;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Chest {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Chest {
    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.pos, self.pos + self.size)
    }

    pub fn touches(&self, other: Rect) -> bool {
        rects_overlap(self.rect(), other)
    }

    /// Put a chest on the top-left of a random non-solid tile.
    ///
    /// Returns `None` if no open tile turned up within `attempts` draws.
    pub fn place<R: Rng + ?Sized>(grid: &TileGrid, size: Vec2, rng: &mut R, attempts: usize) -> Option<Self> {
        let tile = grid.random_open_tile(rng, attempts)?;
        Some(Self { pos: grid.tile_to_world(tile), size })
    }
}
