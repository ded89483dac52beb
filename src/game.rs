use bevy::prelude::*;

pub mod tilemap;
pub mod pathfinding;
pub mod simulation;
pub mod enemy;
pub mod player;
pub mod chest;
pub mod level;
pub mod config;
pub mod control;
pub mod debug;
pub mod camera;

use camera::FollowCameraPlugin;
use config::GameConfigPlugin;
use control::ControlPlugin;
use debug::DebugDrawPlugin;
use level::LevelPlugin;
use simulation::SimulationPlugin;

/// Top-level flow. `Boot` waits for configuration, `Loading` builds a level
/// and hands over to `InGame` within the same frame.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    #[default]
    Boot,
    Loading,
    InGame,
    GameOver,
}

/// Marker for everything a level load spawns; all of it is despawned on
/// the next load.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct GameEntity;

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_plugins((
                GameConfigPlugin,
                SimulationPlugin,
                LevelPlugin,
                ControlPlugin,
                DebugDrawPlugin,
                FollowCameraPlugin,
            ))
            .add_systems(OnEnter(GameState::GameOver), announce_game_over);
    }
}

fn announce_game_over(score: Res<simulation::Score>, session: Res<level::LevelSession>) {
    info!("Game over on level {} with score {}", session.level, score.0);
}
