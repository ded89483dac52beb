/// Resource definitions for the simulation.
///
/// This module contains the typed simulation configuration, the tick
/// counter, the seeded random source and the per-tick player input.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::game::enemy::PursuitConfig;
use crate::game::level::SessionConfig;
use crate::game::player::PlayerConfig;

// ============================================================================
// Simulation Configuration
// ============================================================================

/// Runtime simulation parameters.
///
/// Built once from [`InitialConfig`](crate::game::config::InitialConfig) in
/// `PostStartup`; systems read it instead of the raw config file.
#[derive(Resource, Debug, Clone)]
pub struct SimConfig {
    pub tick_rate: f64,
    /// Collision box of every actor, in pixels.
    pub entity_size: Vec2,
    pub player: PlayerConfig,
    pub pursuit: PursuitConfig,
    pub session: SessionConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            entity_size: Vec2::new(8.0, 15.0),
            player: PlayerConfig::default(),
            pursuit: PursuitConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

// ============================================================================
// Tick & Randomness
// ============================================================================

/// Number of `FixedUpdate` ticks run while in game.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimTick(pub u64);

impl SimTick {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// Random source for anti-stick noise and chest placement.
#[derive(Resource)]
pub struct SimRng(pub StdRng);

impl SimRng {
    pub const DEFAULT_SEED: u64 = 0x0CA7_E5ED;

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(StdRng::from_os_rng())
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self::seeded(Self::DEFAULT_SEED)
    }
}

/// Points for defeated enemies and collected chests.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score(pub u32);

// ============================================================================
// Input
// ============================================================================

/// Directional input for the current tick.
///
/// `axis` holds two independent signed axes in -1..=1 before the player's
/// speed scale is applied. `dash_requested` is consumed by the player system.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    pub axis: Vec2,
    pub dash_requested: bool,
}
