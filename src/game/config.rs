use bevy::prelude::*;
use bevy_common_assets::ron::RonAssetPlugin;
use serde::{Deserialize, Serialize};

use crate::game::simulation::systems_config::update_sim_from_runtime_config;

pub const INITIAL_CONFIG_PATH: &str = "assets/initial_config.ron";

/// Static configuration loaded once at startup. These values define gameplay
/// tuning (speeds, ranges, frame counts) and are copied into
/// [`SimConfig`](crate::game::simulation::SimConfig) before the first level loads.
#[derive(Resource, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct InitialConfig {
    // Simulation
    pub tick_rate: f64,
    /// Fixed seed for reproducible runs; `None` seeds from the OS.
    pub rng_seed: Option<u64>,
    pub entity_size: (f32, f32),

    // Player
    pub player_speed_scale: f32,
    pub player_max_health: i32,
    pub player_invincibility_frames: i32,
    pub player_knockback_decay: f32,
    pub dash_frames: i32,
    pub dash_strike_threshold: i32,
    pub dash_speed: f32,
    pub dash_end_scale: f32,
    pub velocity_decay: f32,

    // Enemies
    pub enemy_speed: f32,
    pub enemy_detection_radius: f32,
    pub enemy_attack_range: f32,
    pub enemy_attack_damage: i32,
    pub enemy_attack_cooldown_frames: i32,
    pub enemy_noise_factor: f32,
    pub enemy_knockback: (f32, f32),
    pub max_path_expansions: usize,

    // Session
    pub level_dir: String,
    pub time_limit_seconds: i32,
    pub quit_delay_frames: i32,
    pub level_transition_frames: i32,
    pub death_reload_frames: i32,
    pub chest_score: u32,
    pub enemy_score: u32,
    pub chest_size: (f32, f32),
    pub chest_placement_attempts: usize,
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            rng_seed: None,
            entity_size: (8.0, 15.0),
            player_speed_scale: 0.75,
            player_max_health: 100,
            player_invincibility_frames: 30,
            player_knockback_decay: 0.5,
            dash_frames: 60,
            dash_strike_threshold: 50,
            dash_speed: 8.0,
            dash_end_scale: 0.1,
            velocity_decay: 0.1,
            enemy_speed: 0.7,
            enemy_detection_radius: 100.0,
            enemy_attack_range: 20.0,
            enemy_attack_damage: 10,
            enemy_attack_cooldown_frames: 30,
            enemy_noise_factor: 0.3,
            enemy_knockback: (5.0, -3.0),
            max_path_expansions: 65_536,
            level_dir: "assets/levels".to_string(),
            time_limit_seconds: 60,
            quit_delay_frames: 60,
            level_transition_frames: 30,
            death_reload_frames: 40,
            chest_score: 10,
            enemy_score: 1,
            chest_size: (16.0, 13.0),
            chest_placement_attempts: 1000,
        }
    }
}

/// Runtime configuration that can be hot-reloaded during gameplay.
/// These are settings that don't affect the simulation (controls, camera, debug).
#[derive(Deserialize, Serialize, Asset, TypePath, Clone, Debug)]
pub struct GameConfig {
    // Controls (hot-reloadable)
    pub key_up: KeyCode,
    pub key_down: KeyCode,
    pub key_left: KeyCode,
    pub key_right: KeyCode,
    pub key_dash: KeyCode,
    pub key_restart: KeyCode,
    pub key_debug_tiles: KeyCode,
    pub key_debug_paths: KeyCode,

    // Camera (hot-reloadable)
    /// The camera closes 1/N of the gap to the player each frame.
    pub camera_smoothing: f32,
    pub camera_zoom: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            key_up: KeyCode::KeyW,
            key_down: KeyCode::KeyS,
            key_left: KeyCode::KeyA,
            key_right: KeyCode::KeyD,
            key_dash: KeyCode::KeyX,
            key_restart: KeyCode::Enter,
            key_debug_tiles: KeyCode::F1,
            key_debug_paths: KeyCode::F2,
            camera_smoothing: 30.0,
            camera_zoom: 0.25,
        }
    }
}

#[derive(Resource)]
pub struct GameConfigHandle(pub Handle<GameConfig>);

pub struct GameConfigPlugin;

impl Plugin for GameConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RonAssetPlugin::<GameConfig>::new(&["game_config.ron"]))
           .add_systems(Startup, (load_initial_config, setup_runtime_config).chain())
           .add_systems(Update, update_sim_from_runtime_config);
    }
}

/// Parse an [`InitialConfig`] from RON text.
pub fn parse_initial_config(contents: &str) -> Result<InitialConfig, ron::error::SpannedError> {
    ron::from_str::<InitialConfig>(contents)
}

/// Load static initial configuration synchronously at startup.
/// This must complete before the simulation config is built in `PostStartup`.
fn load_initial_config(mut commands: Commands) {
    let config = match std::fs::read_to_string(INITIAL_CONFIG_PATH) {
        Ok(contents) => match parse_initial_config(&contents) {
            Ok(config) => {
                info!("Loaded initial config from {}", INITIAL_CONFIG_PATH);
                config
            }
            Err(e) => {
                error!("Failed to parse initial config: {}", e);
                error!("Using default InitialConfig");
                InitialConfig::default()
            }
        },
        Err(e) => {
            error!("Failed to read {}: {}", INITIAL_CONFIG_PATH, e);
            error!("Using default InitialConfig");
            InitialConfig::default()
        }
    };
    commands.insert_resource(config);
}

/// Load runtime configuration asynchronously (can be hot-reloaded).
fn setup_runtime_config(mut commands: Commands, asset_server: Res<AssetServer>) {
    let handle = asset_server.load("game_config.ron");
    commands.insert_resource(GameConfigHandle(handle));
}

/// Current runtime config, or `None` while the asset is still loading.
pub fn runtime_config<'a>(handle: Option<&GameConfigHandle>, configs: &'a Assets<GameConfig>) -> Option<&'a GameConfig> {
    handle.and_then(|handle| configs.get(&handle.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let config = parse_initial_config("(enemy_speed: 1.5, rng_seed: Some(7), level_dir: \"maps\")")
            .expect("partial config parses");

        assert_eq!(config.enemy_speed, 1.5);
        assert_eq!(config.rng_seed, Some(7));
        assert_eq!(config.level_dir, "maps");
        assert_eq!(config.enemy_attack_range, InitialConfig::default().enemy_attack_range);
    }

    #[test]
    fn test_shipped_initial_config_parses() {
        let contents = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/initial_config.ron"))
            .expect("initial_config.ron is shipped with the crate");
        let config = parse_initial_config(&contents).expect("shipped config parses");
        assert_eq!(config.tick_rate, 60.0);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        assert!(parse_initial_config("(enemy_speed: \"fast\")").is_err());
    }
}
