/// Simulation layer - deterministic game logic.
///
/// This module is organized into:
/// - **components**: Actor state (`Kinematics`, `Behavior`)
/// - **resources**: Simulation resources (config, tick, rng, input, score)
/// - **events**: Gameplay notifications for audio and effects
/// - **collision**: Axis-separated tile collision
/// - **systems**: Per-tick actor updates
/// - **systems_config**: Building `SimConfig` from the config files

use bevy::prelude::*;
use crate::game::GameState;
use crate::game::tilemap::TileGrid;

// Module declarations
pub mod components;
pub mod resources;
pub mod events;
pub mod collision;
pub mod systems;
pub mod systems_config;


// Re-export commonly used items
pub use components::*;
pub use resources::*;
pub use events::*;
pub use collision::{move_and_collide, rects_overlap};
pub use systems_config::{init_sim_config_from_initial, sim_config_from_initial};

// System sets for organizing execution order
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum SimSet {
    Input,   // Tick bookkeeping before anything moves
    Pursuit, // Enemy planning, movement and melee
    Player,  // Player movement and dash
    Session, // Chest, countdown, level clear, death
}

/// Main simulation plugin
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Overwritten from InitialConfig in PostStartup
        app.insert_resource(Time::<Fixed>::from_hz(60.0));

        app.init_resource::<SimConfig>();
        app.init_resource::<SimTick>();
        app.init_resource::<SimRng>();
        app.init_resource::<Score>();
        app.init_resource::<PlayerInput>();
        app.init_resource::<TileGrid>();

        app.add_message::<GameEvent>();

        app.configure_sets(FixedUpdate, (
            SimSet::Input,
            SimSet::Pursuit,
            SimSet::Player,
            SimSet::Session,
        ).chain().run_if(in_state(GameState::InGame)));

        // InitialConfig is inserted during Startup
        app.add_systems(PostStartup, systems_config::init_sim_config_from_initial);

        app.add_systems(FixedUpdate, (
            (systems::increment_sim_tick, systems::log_sim_status).chain().in_set(SimSet::Input),
            systems::update_enemies.in_set(SimSet::Pursuit),
            systems::update_player.in_set(SimSet::Player),
        ));
    }
}
