use bevy::prelude::*;
use rand::Rng;
use std::collections::VecDeque;

use crate::game::pathfinding::{find_path_bounded, DEFAULT_MAX_EXPANSIONS};
use crate::game::player::{PlayerBehavior, PlayerConfig};
use crate::game::simulation::{move_and_collide, rects_overlap, Action, GameEvent, Kinematics};
use crate::game::tilemap::{TileCoord, TileGrid};

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PursuitConfig {
    /// Per-axis speed for both chasing and path following, pixels per tick.
    pub enemy_speed: f32,
    pub detection_radius: f32,
    pub attack_range: f32,
    pub attack_damage: i32,
    pub attack_cooldown_frames: i32,
    /// Bound of the uniform noise added while pressed against a wall.
    pub noise_factor: f32,
    /// Knockback dealt on a hit; x is multiplied by the enemy's facing.
    pub knockback: Vec2,
    pub max_path_expansions: usize,
}

impl Default for PursuitConfig {
    fn default() -> Self {
        Self {
            enemy_speed: 0.7,
            detection_radius: 100.0,
            attack_range: 20.0,
            attack_damage: 10,
            attack_cooldown_frames: 30,
            noise_factor: 0.3,
            knockback: Vec2::new(5.0, -3.0),
            max_path_expansions: DEFAULT_MAX_EXPANSIONS,
        }
    }
}

// ============================================================================
// Per-tick context
// ============================================================================

/// Snapshot of the player taken before enemies move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    pub pos: Vec2,
    pub rect: Rect,
    pub tile: TileCoord,
    /// Any part of a dash, which hides the player from direct chase.
    pub dashing: bool,
    /// The fast opening frames of a dash, which defeat enemies on contact.
    pub dash_strike: bool,
}

impl PlayerView {
    pub fn new(kin: &Kinematics, player: &PlayerBehavior, config: &PlayerConfig, grid: &TileGrid) -> Self {
        Self {
            pos: kin.pos,
            rect: kin.rect(),
            tile: grid.world_to_tile(kin.pos),
            dashing: player.is_dashing(),
            dash_strike: player.dash_strike_active(config),
        }
    }
}

/// Everything an enemy may read or write besides its own state.
pub struct PursuitContext<'a, R: Rng + ?Sized> {
    pub grid: &'a TileGrid,
    pub player: PlayerView,
    pub config: &'a PursuitConfig,
    pub rng: &'a mut R,
    pub events: &'a mut Vec<GameEvent>,
}

/// Melee hit to be applied to the player by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeleeHit {
    pub damage: i32,
    pub knockback: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyUpdate {
    /// Movement vector handed to the resolver this tick.
    pub movement: Vec2,
    pub hit: Option<MeleeHit>,
    /// The enemy should be removed from play.
    pub defeated: bool,
}

impl EnemyUpdate {
    fn defeated() -> Self {
        Self { movement: Vec2::ZERO, hit: None, defeated: true }
    }
}

// ============================================================================
// Behaviour
// ============================================================================

/// Pursuit state owned by one enemy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnemyBehavior {
    /// Remaining planned tiles, head first.
    pub path: VecDeque<TileCoord>,
    /// Player tile the current plan was computed for.
    pub target_tile: Option<TileCoord>,
    pub attack_cooldown: i32,
    pub defeated: bool,
}

impl EnemyBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one tick: choose a movement vector, move, then attack.
    ///
    /// A planned path overrides direct chase; noise is added on top of
    /// whichever was chosen while the previous move hit a wall.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        kin: &mut Kinematics,
        movement_bias: Vec2,
        ctx: &mut PursuitContext<'_, R>,
    ) -> EnemyUpdate {
        if self.defeated {
            return EnemyUpdate::defeated();
        }

        let player = ctx.player;
        if player.dash_strike && rects_overlap(kin.rect(), player.rect) {
            self.defeated = true;
            ctx.events.push(GameEvent::Hit);
            return EnemyUpdate::defeated();
        }

        let config = ctx.config;
        let to_player = player.pos - kin.pos;
        let distance = to_player.length();

        let mut movement = if player.dashing {
            movement_bias
        } else {
            if let Some(sign) = horizontal_chase(to_player, distance, config) {
                kin.flip = sign < 0.0;
            }
            chase_vector(to_player, distance, movement_bias, config)
        };
        if let Some(step) = self.follow_path(kin, ctx.grid, player.tile, config) {
            movement = step;
        }
        if kin.collisions.any() {
            let noise = config.noise_factor.abs();
            movement += Vec2::new(
                ctx.rng.random_range(-noise..=noise),
                ctx.rng.random_range(-noise..=noise),
            );
        }

        move_and_collide(kin, ctx.grid, movement);

        let mut hit = None;
        if distance < config.attack_range && self.attack_cooldown <= 0 {
            hit = Some(MeleeHit {
                damage: config.attack_damage,
                knockback: Vec2::new(kin.facing_sign() * config.knockback.x, config.knockback.y),
            });
            ctx.events.push(GameEvent::Attack);
            self.attack_cooldown = config.attack_cooldown_frames;
        }
        if self.attack_cooldown > 0 {
            self.attack_cooldown -= 1;
        }

        kin.set_action(if movement != Vec2::ZERO { Action::Run } else { Action::Idle });

        EnemyUpdate { movement, hit, defeated: false }
    }

    /// Whether the stored plan must be thrown away.
    fn needs_replan(&self, grid: &TileGrid, current: TileCoord, player_tile: TileCoord) -> bool {
        self.path.is_empty()
            || self.target_tile != Some(player_tile)
            || self.path.iter().any(|tile| *tile != current && !grid.is_walkable(*tile))
    }

    /// Movement toward the next planned tile, replanning first if needed.
    fn follow_path(
        &mut self,
        kin: &Kinematics,
        grid: &TileGrid,
        player_tile: TileCoord,
        config: &PursuitConfig,
    ) -> Option<Vec2> {
        let current = grid.world_to_tile(kin.pos);

        if self.needs_replan(grid, current, player_tile) {
            self.path = find_path_bounded(current, player_tile, grid, config.max_path_expansions)
                .map(VecDeque::from)
                .unwrap_or_default();
            // Recorded even without a path; the empty plan retries next tick.
            self.target_tile = Some(player_tile);
        }

        while self.path.front() == Some(&current) {
            self.path.pop_front();
        }

        let next = *self.path.front()?;
        let step = Vec2::new((next.x - current.x).signum() as f32, (next.y - current.y).signum() as f32);
        Some(step * config.enemy_speed)
    }
}

/// Sign-based chase: each axis farther than `attack_range` from the player
/// moves at full speed toward it, other axes keep the bias.
fn chase_vector(to_player: Vec2, distance: f32, bias: Vec2, config: &PursuitConfig) -> Vec2 {
    let mut movement = bias;
    if distance >= config.detection_radius {
        return movement;
    }
    if let Some(sign) = horizontal_chase(to_player, distance, config) {
        movement.x = sign * config.enemy_speed;
    }
    if to_player.y.abs() > config.attack_range {
        movement.y = to_player.y.signum() * config.enemy_speed;
    }
    movement
}

/// Sign of the horizontal chase, if the x axis chases at all. Facing turns
/// toward the player whenever it does, even when a path step replaces the
/// chase movement.
fn horizontal_chase(to_player: Vec2, distance: f32, config: &PursuitConfig) -> Option<f32> {
    (distance < config.detection_radius && to_player.x.abs() > config.attack_range)
        .then(|| to_player.x.signum())
}
