/// Component definitions for the simulation layer.
///
/// Every moving actor carries a [`Kinematics`] (shared physics state read by
/// the collision resolver and the renderer) and a [`Behavior`] that decides
/// how it moves each tick.

use bevy::prelude::*;

use crate::game::enemy::EnemyBehavior;
use crate::game::player::PlayerBehavior;

// ============================================================================
// Kinematic State
// ============================================================================

/// Sides on which the last resolver call clamped the entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionFlags {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl CollisionFlags {
    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Animation tag picked by behaviours, consumed by rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Action {
    #[default]
    Idle,
    Run,
}

/// Position, size and motion of an actor. `pos` is the top-left corner of
/// its axis-aligned rectangle in y-down world space.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Kinematics {
    pub pos: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
    pub last_movement: Vec2,
    pub collisions: CollisionFlags,
    /// Facing left.
    pub flip: bool,
    pub action: Action,
}

impl Kinematics {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            size,
            velocity: Vec2::ZERO,
            last_movement: Vec2::ZERO,
            collisions: CollisionFlags::default(),
            flip: false,
            action: Action::Idle,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.pos, self.pos + self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// -1 when facing left, 1 otherwise.
    pub fn facing_sign(&self) -> f32 {
        if self.flip { -1.0 } else { 1.0 }
    }

    pub fn set_action(&mut self, action: Action) {
        self.action = action;
    }
}

// ============================================================================
// Behaviour
// ============================================================================

/// What drives an actor each tick.
#[derive(Component, Debug, Clone)]
pub enum Behavior {
    Player(PlayerBehavior),
    Enemy(EnemyBehavior),
}

impl Behavior {
    pub fn as_player(&self) -> Option<&PlayerBehavior> {
        match self {
            Behavior::Player(player) => Some(player),
            Behavior::Enemy(_) => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut PlayerBehavior> {
        match self {
            Behavior::Player(player) => Some(player),
            Behavior::Enemy(_) => None,
        }
    }

    pub fn as_enemy_mut(&mut self) -> Option<&mut EnemyBehavior> {
        match self {
            Behavior::Enemy(enemy) => Some(enemy),
            Behavior::Player(_) => None,
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self, Behavior::Player(_))
    }
}
