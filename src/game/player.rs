/// Player behaviour: input-driven movement, dash, knockback and health.
///
/// The dash counter is signed: +N dashes right, -N dashes left, and each
/// tick moves it one step toward zero. While its magnitude is above
/// `dash_strike_threshold` the player is thrown horizontally at
/// `dash_speed` and defeats enemies on contact.

use bevy::prelude::*;

use crate::game::enemy::MeleeHit;
use crate::game::simulation::{move_and_collide, Action, GameEvent, Kinematics, PlayerInput};
use crate::game::tilemap::TileGrid;


#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    /// Multiplier applied to the raw input axes.
    pub speed_scale: f32,
    pub max_health: i32,
    pub invincibility_frames: i32,
    /// Knockback shrinks by this much per axis each tick.
    pub knockback_decay: f32,
    pub dash_frames: i32,
    pub dash_strike_threshold: i32,
    pub dash_speed: f32,
    /// Velocity multiplier on the last strike frame.
    pub dash_end_scale: f32,
    /// Velocity shrinks by this much per axis each tick.
    pub velocity_decay: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed_scale: 0.75,
            max_health: 100,
            invincibility_frames: 30,
            knockback_decay: 0.5,
            dash_frames: 60,
            dash_strike_threshold: 50,
            dash_speed: 8.0,
            dash_end_scale: 0.1,
            velocity_decay: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerBehavior {
    pub health: i32,
    pub dashing: i32,
    pub invincible_time: i32,
    pub knockback: Vec2,
}

impl Default for PlayerBehavior {
    fn default() -> Self {
        Self::new(&PlayerConfig::default())
    }
}

/// Move `value` toward zero by `step` without crossing it.
fn approach_zero(value: f32, step: f32) -> f32 {
    if value > 0.0 {
        (value - step).max(0.0)
    } else {
        (value + step).min(0.0)
    }
}

impl PlayerBehavior {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            health: config.max_health,
            dashing: 0,
            invincible_time: 0,
            knockback: Vec2::ZERO,
        }
    }

    pub fn is_dashing(&self) -> bool {
        self.dashing != 0
    }

    /// In the fast opening frames of a dash.
    pub fn dash_strike_active(&self, config: &PlayerConfig) -> bool {
        self.dashing.abs() > config.dash_strike_threshold
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Start a dash in the facing direction. Ignored mid-dash.
    pub fn dash(&mut self, facing_left: bool, config: &PlayerConfig, events: &mut Vec<GameEvent>) -> bool {
        if self.is_dashing() {
            return false;
        }
        self.dashing = if facing_left { -config.dash_frames } else { config.dash_frames };
        events.push(GameEvent::Dash);
        true
    }

    /// Take a melee hit unless still invincible from the previous one.
    pub fn receive_hit(&mut self, hit: MeleeHit, config: &PlayerConfig, events: &mut Vec<GameEvent>) -> bool {
        if self.invincible_time > 0 {
            return false;
        }
        self.health -= hit.damage;
        self.invincible_time = config.invincibility_frames;
        self.knockback = hit.knockback;
        events.push(GameEvent::PlayerHurt);
        true
    }

    /// Advance one tick and return the movement vector that was applied.
    pub fn update(
        &mut self,
        kin: &mut Kinematics,
        grid: &TileGrid,
        input: &PlayerInput,
        config: &PlayerConfig,
        events: &mut Vec<GameEvent>,
    ) -> Vec2 {
        if input.dash_requested {
            self.dash(kin.flip, config, events);
        }
        if self.invincible_time > 0 {
            self.invincible_time -= 1;
        }

        let mut movement = input.axis * config.speed_scale;
        if self.knockback != Vec2::ZERO {
            movement = Vec2::new(self.knockback.x, movement.y + self.knockback.y);
            self.knockback = Vec2::new(
                approach_zero(self.knockback.x, config.knockback_decay),
                approach_zero(self.knockback.y, config.knockback_decay),
            );
        }

        move_and_collide(kin, grid, movement);
        kin.set_action(if movement.x != 0.0 { Action::Run } else { Action::Idle });

        self.dashing -= self.dashing.signum();
        if self.dashing.abs() > config.dash_strike_threshold {
            kin.velocity.x = self.dashing.signum() as f32 * config.dash_speed;
            if self.dashing.abs() == config.dash_strike_threshold + 1 {
                kin.velocity.x *= config.dash_end_scale;
            }
        }

        kin.velocity = Vec2::new(
            approach_zero(kin.velocity.x, config.velocity_decay),
            approach_zero(kin.velocity.y, config.velocity_decay),
        );

        movement
    }
}
