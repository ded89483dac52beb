use bevy::prelude::*;
use fixedbitset::FixedBitSet;
use rustc_hash::FxHashMap;
use std::collections::BinaryHeap;

use crate::game::tilemap::{TileCoord, TileGrid};
use super::types::{OpenEntry, PathNode, DEFAULT_MAX_EXPANSIONS};

fn reconstruct_path(nodes: &[PathNode], mut current: usize) -> Vec<TileCoord> {
    let mut path = vec![nodes[current].tile];
    while let Some(parent) = nodes[current].parent {
        current = parent;
        path.push(nodes[current].tile);
    }
    path.reverse();
    path
}

/// Shortest 4-connected path from `start` to `goal`, both ends included.
///
/// Returns `None` when the goal cannot be reached. Only `is_walkable` is
/// consulted for neighbours, so the path ignores entity size.
pub fn find_path(start: TileCoord, goal: TileCoord, grid: &TileGrid) -> Option<Vec<TileCoord>> {
    find_path_bounded(start, goal, grid, DEFAULT_MAX_EXPANSIONS)
}

/// [`find_path`] with an explicit budget of node expansions.
pub fn find_path_bounded(
    start: TileCoord,
    goal: TileCoord,
    grid: &TileGrid,
    max_expansions: usize,
) -> Option<Vec<TileCoord>> {
    // The start tile itself may be solid (entities can overlap a wall tile by
    // their top-left corner) but it must index into the closed set.
    grid.index(start)?;
    if start == goal {
        return Some(vec![start]);
    }
    if !grid.is_walkable(goal) {
        return None;
    }

    let mut nodes = vec![PathNode { tile: start, parent: None, g: 0, h: start.manhattan(goal) }];
    let mut open = BinaryHeap::new();
    open.push(OpenEntry { f: nodes[0].f(), node: 0 });

    let mut best_g: FxHashMap<TileCoord, u32> = FxHashMap::default();
    best_g.insert(start, 0);
    // Grown on demand; most searches touch a small corner of the grid.
    let mut closed = FixedBitSet::new();
    let mut expansions = 0usize;

    while let Some(OpenEntry { node: current, .. }) = open.pop() {
        let PathNode { tile, g, .. } = nodes[current];
        let Some(slot) = grid.index(tile) else { continue };

        // Stale duplicates: the tile was already expanded, or a cheaper entry
        // for it was queued after this one.
        if closed.contains(slot) || best_g.get(&tile).is_some_and(|&best| g > best) {
            continue;
        }

        if tile == goal {
            if expansions > 1000 {
                debug!("[PATHFINDING] A* used {} expansions for {:?} -> {:?}", expansions, start, goal);
            }
            return Some(reconstruct_path(&nodes, current));
        }

        if expansions >= max_expansions {
            warn!(
                "[PATHFINDING] A* gave up after {} expansions. Start: {:?}, Goal: {:?}, Grid: {}x{}",
                max_expansions, start, goal, grid.width, grid.height
            );
            return None;
        }
        expansions += 1;
        if slot >= closed.len() {
            closed.grow(slot + 1);
        }
        closed.insert(slot);

        for neighbor in tile.neighbors4() {
            if !grid.is_walkable(neighbor) {
                continue;
            }
            if grid.index(neighbor).is_some_and(|idx| closed.contains(idx)) {
                continue;
            }

            let tentative_g = g + 1;
            if best_g.get(&neighbor).is_some_and(|&best| tentative_g >= best) {
                continue;
            }
            best_g.insert(neighbor, tentative_g);

            let node = PathNode {
                tile: neighbor,
                parent: Some(current),
                g: tentative_g,
                h: neighbor.manhattan(goal),
            };
            nodes.push(node);
            open.push(OpenEntry { f: node.f(), node: nodes.len() - 1 });
        }
    }

    None
}
