/// Core simulation systems.
///
/// This module contains systems for:
/// - Tick management
/// - Enemy pursuit and melee
/// - Player movement
/// - Periodic status logging

use bevy::prelude::*;
use cavern_macros::profile;

use crate::game::enemy::{PlayerView, PursuitContext};
use crate::game::tilemap::TileGrid;

use super::components::*;
use super::events::*;
use super::resources::*;

// ============================================================================
// Tick Management
// ============================================================================

/// Increment the global simulation tick counter.
///
/// Runs first in `FixedUpdate` so every other system sees the current tick.
pub fn increment_sim_tick(mut tick: ResMut<SimTick>) {
    tick.increment();
}

fn flush_events(writer: &mut MessageWriter<GameEvent>, events: Vec<GameEvent>) {
    for event in events {
        writer.write(event);
    }
}

// ============================================================================
// Actors
// ============================================================================

/// Run every enemy's pursuit controller, then apply their melee hits to the
/// player and remove defeated enemies.
#[profile]
pub fn update_enemies(
    mut commands: Commands,
    #[allow(unused_variables)] tick: Res<SimTick>,
    config: Res<SimConfig>,
    grid: Res<TileGrid>,
    mut rng: ResMut<SimRng>,
    mut score: ResMut<Score>,
    mut actors: Query<(Entity, &mut Kinematics, &mut Behavior)>,
    mut game_events: MessageWriter<GameEvent>,
) {
    // Enemies see the player as it was at the start of the tick.
    let Some((player_entity, player_view)) = actors.iter().find_map(|(entity, kin, behavior)| {
        behavior
            .as_player()
            .map(|player| (entity, PlayerView::new(kin, player, &config.player, &grid)))
    }) else {
        return;
    };

    let mut events = Vec::new();
    let mut hits = Vec::new();
    let mut defeated = 0u32;

    {
        let mut ctx = PursuitContext {
            grid: &grid,
            player: player_view,
            config: &config.pursuit,
            rng: &mut rng.0,
            events: &mut events,
        };

        for (entity, mut kin, mut behavior) in &mut actors {
            let Some(enemy) = behavior.as_enemy_mut() else { continue };
            let update = enemy.update(&mut kin, Vec2::ZERO, &mut ctx);
            if let Some(hit) = update.hit {
                hits.push(hit);
            }
            if update.defeated {
                commands.entity(entity).despawn();
                defeated += 1;
            }
        }
    }

    if defeated > 0 {
        score.0 += defeated * config.session.enemy_score;
        debug!("[PURSUIT] {} enemies defeated, score {}", defeated, score.0);
    }

    if !hits.is_empty() {
        if let Ok((_, _, mut behavior)) = actors.get_mut(player_entity) {
            if let Some(player) = behavior.as_player_mut().filter(|player| !player.is_dead()) {
                for hit in hits {
                    if player.receive_hit(hit, &config.player, &mut events) {
                        debug!("[PURSUIT] Player hit for {}, health {}", hit.damage, player.health);
                    }
                }
            }
        }
    }

    flush_events(&mut game_events, events);
}

/// Move the player from the current input. A dead player no longer moves.
#[profile]
pub fn update_player(
    #[allow(unused_variables)] tick: Res<SimTick>,
    config: Res<SimConfig>,
    grid: Res<TileGrid>,
    mut input: ResMut<PlayerInput>,
    mut actors: Query<(&mut Kinematics, &mut Behavior)>,
    mut game_events: MessageWriter<GameEvent>,
) {
    let mut events = Vec::new();

    for (mut kin, mut behavior) in &mut actors {
        let Some(player) = behavior.as_player_mut() else { continue };
        if player.is_dead() {
            continue;
        }
        player.update(&mut kin, &grid, &input, &config.player, &mut events);
    }

    // A dash press applies to exactly one tick.
    input.dash_requested = false;
    flush_events(&mut game_events, events);
}

// ============================================================================
// Status
// ============================================================================

/// Periodic status line; compiled out without `perf_stats`.
pub fn log_sim_status(
    #[allow(unused_variables)] tick: Res<SimTick>,
    #[allow(unused_variables)] score: Res<Score>,
    #[allow(unused_variables)] actors: Query<&Behavior>,
) {
    use crate::profile_log;

    profile_log!(tick, "[SIM STATUS] Tick: {} | Enemies: {} | Score: {}",
          tick.0, actors.iter().filter(|b| !b.is_player()).count(), score.0);
}
