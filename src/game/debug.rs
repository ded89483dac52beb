/// Gizmo drawing for the simulation.
///
/// World space is y-down; everything is mirrored onto Bevy's y-up plane
/// here. Actors and the chest are always drawn; solid tiles and enemy
/// plans are toggled from the keyboard.

use bevy::prelude::*;

use crate::game::chest::Chest;
use crate::game::config::{runtime_config, GameConfig, GameConfigHandle};
use crate::game::simulation::{Behavior, Kinematics};
use crate::game::tilemap::TileGrid;
use crate::game::GameState;

#[derive(Resource, Default, Debug)]
pub struct DebugConfig {
    pub show_tiles: bool,
    pub show_paths: bool,
}

pub struct DebugDrawPlugin;

impl Plugin for DebugDrawPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugConfig>()
           .add_systems(Update, (
               toggle_debug,
               draw_tiles,
               draw_actors,
               draw_enemy_paths,
           ).run_if(in_state(GameState::InGame).or(in_state(GameState::GameOver))));
    }
}

/// World position to render position.
#[inline]
pub fn to_render(world: Vec2) -> Vec2 {
    Vec2::new(world.x, -world.y)
}

fn rect_center_size(rect: Rect) -> (Vec2, Vec2) {
    (to_render(rect.center()), rect.size())
}

// ============================================================================
// Debug Toggle
// ============================================================================

pub fn toggle_debug(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut debug_config: ResMut<DebugConfig>,
    config_handle: Option<Res<GameConfigHandle>>,
    game_configs: Res<Assets<GameConfig>>,
) {
    let fallback = GameConfig::default();
    let config = runtime_config(config_handle.as_deref(), &game_configs).unwrap_or(&fallback);

    if keyboard.just_pressed(config.key_debug_tiles) {
        debug_config.show_tiles = !debug_config.show_tiles;
        info!("Tile debug: {}", debug_config.show_tiles);
    }
    if keyboard.just_pressed(config.key_debug_paths) {
        debug_config.show_paths = !debug_config.show_paths;
        info!("Path debug: {}", debug_config.show_paths);
    }
}

// ============================================================================
// Drawing
// ============================================================================

pub fn draw_tiles(debug_config: Res<DebugConfig>, grid: Res<TileGrid>, mut gizmos: Gizmos) {
    if !debug_config.show_tiles {
        return;
    }

    for (coord, tile) in grid.tiles() {
        let color = if tile.is_solid() {
            Color::srgb(0.6, 0.6, 0.6)
        } else {
            Color::srgb(0.25, 0.25, 0.3)
        };
        let (center, size) = rect_center_size(grid.tile_rect(coord));
        gizmos.rect_2d(center, size, color);
    }

    // Pathfinding bounds
    let bounds = Rect::new(
        0.0,
        0.0,
        (grid.width * grid.tile_size) as f32,
        (grid.height * grid.tile_size) as f32,
    );
    let (center, size) = rect_center_size(bounds);
    gizmos.rect_2d(center, size, Color::srgb(0.2, 0.4, 1.0));
}

pub fn draw_actors(
    actors: Query<(&Kinematics, &Behavior)>,
    chests: Query<&Chest>,
    mut gizmos: Gizmos,
) {
    for (kin, behavior) in &actors {
        let color = match behavior {
            Behavior::Player(player) if player.is_dead() => Color::srgb(0.4, 0.4, 0.4),
            Behavior::Player(player) if player.invincible_time > 0 => Color::srgb(1.0, 1.0, 1.0),
            Behavior::Player(_) => Color::srgb(0.2, 1.0, 0.2),
            Behavior::Enemy(_) => Color::srgb(1.0, 0.2, 0.2),
        };
        let (center, size) = rect_center_size(kin.rect());
        gizmos.rect_2d(center, size, color);

        // Facing marker
        let eye = to_render(kin.center() + Vec2::new(kin.facing_sign() * kin.size.x * 0.5, -kin.size.y * 0.25));
        gizmos.circle_2d(eye, 1.0, color);
    }

    for chest in &chests {
        let (center, size) = rect_center_size(chest.rect());
        gizmos.rect_2d(center, size, Color::srgb(1.0, 0.85, 0.1));
    }
}

pub fn draw_enemy_paths(
    debug_config: Res<DebugConfig>,
    grid: Res<TileGrid>,
    actors: Query<(&Kinematics, &Behavior)>,
    mut gizmos: Gizmos,
) {
    if !debug_config.show_paths {
        return;
    }

    let half_tile = Vec2::splat(grid.tile_size as f32 * 0.5);
    for (kin, behavior) in &actors {
        let Behavior::Enemy(enemy) = behavior else { continue };
        if enemy.path.is_empty() {
            continue;
        }

        let points = std::iter::once(kin.center())
            .chain(enemy.path.iter().map(|&tile| grid.tile_to_world(tile) + half_tile))
            .map(to_render);
        gizmos.linestrip_2d(points, Color::srgb(0.0, 1.0, 1.0));

        if let Some(target) = enemy.target_tile {
            gizmos.circle_2d(to_render(grid.tile_to_world(target) + half_tile), 3.0, Color::srgb(1.0, 0.0, 1.0));
        }
    }
}
