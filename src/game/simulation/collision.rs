/// Axis-separated tile collision.
///
/// Movement is applied one axis at a time. After each axis the entity
/// rectangle is tested against the solid tiles around it and clamped back
/// to the touching edge of any tile it overlaps. Resolving the axes
/// independently lets an actor slide along walls, at the price of allowing
/// a diagonal squeeze between two tiles that only touch at a corner.

use bevy::prelude::*;

use crate::game::tilemap::TileGrid;
use super::components::Kinematics;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// Strict overlap: rectangles that only share an edge do not collide.
#[inline]
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.min.x < b.max.x && a.max.x > b.min.x && a.min.y < b.max.y && a.max.y > b.min.y
}

/// Move `kin` by `movement + velocity`, resolving collisions against solid
/// tiles in `grid`.
///
/// Collision flags describe this call only. Facing follows the sign of the
/// horizontal *input*, not the total displacement, and is kept when that
/// input is zero.
pub fn move_and_collide(kin: &mut Kinematics, grid: &TileGrid, movement: Vec2) {
    kin.collisions.clear();
    let frame_movement = movement + kin.velocity;

    move_axis(kin, grid, frame_movement.x, Axis::X);
    move_axis(kin, grid, frame_movement.y, Axis::Y);

    if movement.x > 0.0 {
        kin.flip = false;
    } else if movement.x < 0.0 {
        kin.flip = true;
    }
    kin.last_movement = movement;
}

/// Apply one axis of displacement in sub-steps no longer than a tile so a
/// fast actor cannot skip over a wall. Stops at the first clamp.
///
/// A single move never travels farther than the grid span plus a three tile
/// margin, which also bounds the number of sub-steps.
fn move_axis(kin: &mut Kinematics, grid: &TileGrid, delta: f32, axis: Axis) {
    if delta == 0.0 || !delta.is_finite() {
        return;
    }

    let max_step = grid.tile_size.max(1) as f32;
    let reach = (grid.width.max(grid.height).max(0) as f32 + 3.0) * max_step;
    let delta = delta.clamp(-reach, reach);
    let steps = (delta.abs() / max_step).ceil().max(1.0) as u32;
    let step = delta / steps as f32;

    for _ in 0..steps {
        match axis {
            Axis::X => kin.pos.x += step,
            Axis::Y => kin.pos.y += step,
        }
        if clamp_axis(kin, grid, step, axis) {
            break;
        }
    }
}

/// Push the entity out of every overlapping tile along `axis`. Returns
/// whether anything was clamped.
fn clamp_axis(kin: &mut Kinematics, grid: &TileGrid, step: f32, axis: Axis) -> bool {
    let mut clamped = false;

    for tile in grid.physics_rects_around(kin.pos) {
        if !rects_overlap(kin.rect(), tile) {
            continue;
        }
        match axis {
            Axis::X if step > 0.0 => {
                kin.pos.x = tile.min.x - kin.size.x;
                kin.collisions.right = true;
            }
            Axis::X => {
                kin.pos.x = tile.max.x;
                kin.collisions.left = true;
            }
            Axis::Y if step > 0.0 => {
                kin.pos.y = tile.min.y - kin.size.y;
                kin.collisions.down = true;
            }
            Axis::Y => {
                kin.pos.y = tile.max.y;
                kin.collisions.up = true;
            }
        }
        clamped = true;
    }

    clamped
}
