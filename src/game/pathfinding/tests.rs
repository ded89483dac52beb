/// Tests for tile A*.
///
/// Randomised grids are checked against a plain BFS, which is the ground
/// truth for shortest paths under uniform step cost.

use super::*;
use crate::game::tilemap::{Tile, TileCoord, TileGrid, TileKind};
use std::collections::VecDeque;

fn open_grid(width: i32, height: i32) -> TileGrid {
    TileGrid::with_bounds(16, width, height)
}

fn wall(grid: &mut TileGrid, x: i32, y: i32) {
    grid.insert(TileCoord::new(x, y), Tile::new(TileKind::Stone, 0));
}

fn bfs_len(start: TileCoord, goal: TileCoord, grid: &TileGrid) -> Option<usize> {
    let mut dist = vec![usize::MAX; grid.cell_count()];
    let mut queue = VecDeque::new();
    dist[grid.index(start)?] = 1;
    queue.push_back(start);
    while let Some(tile) = queue.pop_front() {
        let d = dist[grid.index(tile)?];
        if tile == goal {
            return Some(d);
        }
        for n in tile.neighbors4() {
            if !grid.is_walkable(n) {
                continue;
            }
            let idx = grid.index(n)?;
            if dist[idx] == usize::MAX {
                dist[idx] = d + 1;
                queue.push_back(n);
            }
        }
    }
    None
}

fn assert_valid_path(path: &[TileCoord], start: TileCoord, goal: TileCoord, grid: &TileGrid) {
    assert_eq!(path.first(), Some(&start), "path must begin at start");
    assert_eq!(path.last(), Some(&goal), "path must end at goal");
    for pair in path.windows(2) {
        assert_eq!(pair[0].manhattan(pair[1]), 1, "non-adjacent step {:?} -> {:?}", pair[0], pair[1]);
    }
    for tile in &path[1..] {
        assert!(grid.is_walkable(*tile), "path crosses unwalkable tile {:?}", tile);
    }
}

#[test]
fn test_straight_path_on_open_grid() {
    let grid = open_grid(10, 10);
    let start = TileCoord::new(1, 1);
    let goal = TileCoord::new(6, 4);

    let path = find_path(start, goal, &grid).expect("open grid is connected");

    assert_valid_path(&path, start, goal, &grid);
    assert_eq!(path.len(), 9, "manhattan distance 8 means 9 tiles");
}

#[test]
fn test_path_on_largest_grid() {
    use crate::game::tilemap::MAX_LEVEL_SIDE;

    let grid = open_grid(MAX_LEVEL_SIDE, MAX_LEVEL_SIDE);
    let start = TileCoord::new(MAX_LEVEL_SIDE - 4, MAX_LEVEL_SIDE - 4);
    let goal = TileCoord::new(MAX_LEVEL_SIDE - 1, MAX_LEVEL_SIDE - 2);

    let path = find_path(start, goal, &grid).expect("open grid is connected");

    assert_valid_path(&path, start, goal, &grid);
    assert_eq!(path.len(), 6);
}

#[test]
fn test_start_equals_goal() {
    let grid = open_grid(4, 4);
    let tile = TileCoord::new(2, 2);
    assert_eq!(find_path(tile, tile, &grid), Some(vec![tile]));
}

#[test]
fn test_path_routes_through_gap_in_wall() {
    let mut grid = open_grid(9, 7);
    for y in 0..7 {
        if y != 5 {
            wall(&mut grid, 4, y);
        }
    }
    let start = TileCoord::new(1, 1);
    let goal = TileCoord::new(7, 1);

    let path = find_path(start, goal, &grid).expect("gap at (4,5) connects both halves");

    assert_valid_path(&path, start, goal, &grid);
    assert!(path.contains(&TileCoord::new(4, 5)));
    // 6 across plus 4 down and 4 back up
    assert_eq!(path.len(), 15);
}

#[test]
fn test_enclosed_goal_has_no_path() {
    let mut grid = open_grid(10, 10);
    let goal = TileCoord::new(5, 5);
    for n in goal.neighbors4() {
        wall(&mut grid, n.x, n.y);
    }

    assert_eq!(find_path(TileCoord::new(0, 0), goal, &grid), None);
}

#[test]
fn test_solid_goal_has_no_path() {
    let mut grid = open_grid(6, 6);
    wall(&mut grid, 3, 3);
    assert_eq!(find_path(TileCoord::new(0, 0), TileCoord::new(3, 3), &grid), None);
}

#[test]
fn test_out_of_bounds_endpoints_have_no_path() {
    let grid = open_grid(6, 6);
    assert_eq!(find_path(TileCoord::new(-1, 0), TileCoord::new(3, 3), &grid), None);
    assert_eq!(find_path(TileCoord::new(0, 0), TileCoord::new(6, 3), &grid), None);
}

#[test]
fn test_solid_start_tile_can_still_leave() {
    let mut grid = open_grid(6, 6);
    wall(&mut grid, 0, 0);
    let path = find_path(TileCoord::new(0, 0), TileCoord::new(2, 0), &grid).expect("neighbours are open");
    assert_eq!(path, vec![TileCoord::new(0, 0), TileCoord::new(1, 0), TileCoord::new(2, 0)]);
}

#[test]
fn test_expansion_budget_gives_up() {
    let grid = open_grid(40, 40);
    let start = TileCoord::new(0, 0);
    let goal = TileCoord::new(39, 39);

    assert_eq!(find_path_bounded(start, goal, &grid, 10), None, "10 expansions cannot cross 78 tiles");
    assert!(find_path_bounded(start, goal, &grid, DEFAULT_MAX_EXPANSIONS).is_some());
}

#[test]
fn test_unreachable_region_exhausts_open_set() {
    let mut grid = open_grid(12, 12);
    for y in 0..12 {
        wall(&mut grid, 6, y);
    }
    assert_eq!(find_path(TileCoord::new(1, 1), TileCoord::new(10, 10), &grid), None);
}

#[test]
fn test_random_grids_match_bfs_length() {
    let mut rng = fastrand::Rng::with_seed(0xC4FE);
    let mut checked = 0;

    for round in 0..200 {
        let width = rng.i32(4..20);
        let height = rng.i32(4..20);
        let mut grid = open_grid(width, height);
        for y in 0..height {
            for x in 0..width {
                if rng.u8(0..100) < 28 {
                    wall(&mut grid, x, y);
                }
            }
        }
        let start = TileCoord::new(rng.i32(0..width), rng.i32(0..height));
        let goal = TileCoord::new(rng.i32(0..width), rng.i32(0..height));
        grid.remove(start);
        grid.remove(goal);

        let expected = bfs_len(start, goal, &grid);
        let found = find_path(start, goal, &grid);

        match (expected, found) {
            (Some(len), Some(path)) => {
                assert_valid_path(&path, start, goal, &grid);
                assert_eq!(path.len(), len, "round {}: A* path longer than BFS", round);
                checked += 1;
            }
            (None, None) => {}
            (expected, found) => panic!(
                "round {}: reachability disagrees, bfs {:?} astar {:?}",
                round,
                expected,
                found.map(|p| p.len())
            ),
        }
    }

    println!("Compared {} reachable pairs against BFS", checked);
    assert!(checked > 50, "too few reachable pairs to be meaningful");
}
