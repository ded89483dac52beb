/// Configuration initialization systems
///
/// Systems that handle loading and updating simulation configuration from:
/// - InitialConfig (loaded at startup from initial_config.ron)
/// - GameConfig (hot-reloadable runtime settings from game_config.ron)

use bevy::prelude::*;
use crate::game::config::{GameConfig, GameConfigHandle, InitialConfig};
use crate::game::enemy::PursuitConfig;
use crate::game::level::SessionConfig;
use crate::game::player::PlayerConfig;

use crate::game::simulation::resources::*;

/// Convert the file-level config into the typed simulation config.
pub fn sim_config_from_initial(config: &InitialConfig) -> SimConfig {
    let tick_rate = if config.tick_rate > 0.0 {
        config.tick_rate
    } else {
        warn!("Ignoring non-positive tick_rate {}, using 60", config.tick_rate);
        60.0
    };

    SimConfig {
        tick_rate,
        entity_size: Vec2::new(config.entity_size.0, config.entity_size.1),
        player: PlayerConfig {
            speed_scale: config.player_speed_scale,
            max_health: config.player_max_health,
            invincibility_frames: config.player_invincibility_frames,
            knockback_decay: config.player_knockback_decay,
            dash_frames: config.dash_frames,
            dash_strike_threshold: config.dash_strike_threshold,
            dash_speed: config.dash_speed,
            dash_end_scale: config.dash_end_scale,
            velocity_decay: config.velocity_decay,
        },
        pursuit: PursuitConfig {
            enemy_speed: config.enemy_speed,
            detection_radius: config.enemy_detection_radius,
            attack_range: config.enemy_attack_range,
            attack_damage: config.enemy_attack_damage,
            attack_cooldown_frames: config.enemy_attack_cooldown_frames,
            noise_factor: config.enemy_noise_factor,
            knockback: Vec2::new(config.enemy_knockback.0, config.enemy_knockback.1),
            max_path_expansions: config.max_path_expansions,
        },
        session: SessionConfig {
            level_dir: config.level_dir.clone(),
            // Countdown runs in ticks, not wall-clock time.
            time_limit_frames: config.time_limit_seconds.saturating_mul(tick_rate.round() as i32),
            quit_delay_frames: config.quit_delay_frames,
            level_transition_frames: config.level_transition_frames,
            death_reload_frames: config.death_reload_frames,
            chest_score: config.chest_score,
            enemy_score: config.enemy_score,
            chest_size: Vec2::new(config.chest_size.0, config.chest_size.1),
            chest_placement_attempts: config.chest_placement_attempts,
        },
    }
}

/// Initialize SimConfig from InitialConfig at startup
pub fn init_sim_config_from_initial(
    mut fixed_time: ResMut<Time<Fixed>>,
    mut sim_config: ResMut<SimConfig>,
    mut sim_rng: ResMut<SimRng>,
    initial_config: Option<Res<InitialConfig>>,
) {
    info!("Initializing SimConfig from InitialConfig");

    let config = match &initial_config {
        Some(cfg) => cfg.as_ref(),
        None => {
            warn!("InitialConfig not found, using defaults");
            &InitialConfig::default()
        }
    };

    *sim_config = sim_config_from_initial(config);
    fixed_time.set_timestep_seconds(1.0 / sim_config.tick_rate);

    *sim_rng = match config.rng_seed {
        Some(seed) => {
            info!("Simulation RNG seeded with {}", seed);
            SimRng::seeded(seed)
        }
        None => SimRng::from_entropy(),
    };

    info!(
        "SimConfig initialized: {} Hz, enemy speed {}, detection radius {}, time limit {} ticks",
        sim_config.tick_rate,
        sim_config.pursuit.enemy_speed,
        sim_config.pursuit.detection_radius,
        sim_config.session.time_limit_frames
    );
}

/// Handle hot-reloadable runtime configuration
pub fn update_sim_from_runtime_config(
    config_handle: Option<Res<GameConfigHandle>>,
    game_configs: Res<Assets<GameConfig>>,
    mut events: MessageReader<AssetEvent<GameConfig>>,
) {
    let Some(config_handle) = config_handle else { return };
    for event in events.read() {
        if event.is_modified(config_handle.0.id()) || event.is_loaded_with_dependencies(config_handle.0.id()) {
            if let Some(config) = game_configs.get(&config_handle.0) {
                // Systems read GameConfig directly; nothing to copy.
                info!(
                    "Runtime config loaded/updated (dash key {:?}, camera smoothing {})",
                    config.key_dash, config.camera_smoothing
                );
            }
        }
    }
}
