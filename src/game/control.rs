/// Keyboard handling: movement, dash and restart.
///
/// Input is sampled every rendered frame into [`PlayerInput`]; the fixed
/// simulation consumes it on its next tick.

use bevy::prelude::*;

use crate::game::config::{runtime_config, GameConfig, GameConfigHandle};
use crate::game::level::LevelSession;
use crate::game::simulation::{PlayerInput, Score, SimConfig};
use crate::game::GameState;

pub struct ControlPlugin;

impl Plugin for ControlPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (
            read_player_input.run_if(in_state(GameState::InGame)),
            restart_on_key.run_if(in_state(GameState::GameOver)),
        ));
    }
}

/// Two independent axes in -1..=1. Down is +y.
pub fn axis_from_keys(keys: &ButtonInput<KeyCode>, config: &GameConfig) -> Vec2 {
    let axis = |negative: KeyCode, positive: KeyCode| {
        (keys.pressed(positive) as i32 - keys.pressed(negative) as i32) as f32
    };
    Vec2::new(
        axis(config.key_left, config.key_right),
        axis(config.key_up, config.key_down),
    )
}

pub fn read_player_input(
    keys: Res<ButtonInput<KeyCode>>,
    config_handle: Option<Res<GameConfigHandle>>,
    game_configs: Res<Assets<GameConfig>>,
    mut input: ResMut<PlayerInput>,
) {
    let fallback = GameConfig::default();
    let config = runtime_config(config_handle.as_deref(), &game_configs).unwrap_or(&fallback);

    input.axis = axis_from_keys(&keys, config);
    // Latched until the simulation consumes it.
    if keys.just_pressed(config.key_dash) {
        input.dash_requested = true;
    }
}

pub fn restart_on_key(
    keys: Res<ButtonInput<KeyCode>>,
    config_handle: Option<Res<GameConfigHandle>>,
    game_configs: Res<Assets<GameConfig>>,
    sim_config: Res<SimConfig>,
    mut session: ResMut<LevelSession>,
    mut score: ResMut<Score>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let fallback = GameConfig::default();
    let config = runtime_config(config_handle.as_deref(), &game_configs).unwrap_or(&fallback);
    if !keys.just_pressed(config.key_restart) {
        return;
    }

    info!("[SESSION] Restarting at level {}", session.level);
    session.restart(&sim_config.session);
    score.0 = 0;
    next_state.set(GameState::Loading);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_keys_cancel() {
        let config = GameConfig::default();
        let mut keys = ButtonInput::<KeyCode>::default();

        assert_eq!(axis_from_keys(&keys, &config), Vec2::ZERO);

        keys.press(KeyCode::KeyD);
        keys.press(KeyCode::KeyW);
        assert_eq!(axis_from_keys(&keys, &config), Vec2::new(1.0, -1.0), "up is negative y");

        keys.press(KeyCode::KeyA);
        assert_eq!(axis_from_keys(&keys, &config).x, 0.0);
    }

    #[test]
    fn test_rebound_keys_are_used() {
        let config = GameConfig { key_down: KeyCode::ArrowDown, ..GameConfig::default() };
        let mut keys = ButtonInput::<KeyCode>::default();

        keys.press(KeyCode::KeyS);
        assert_eq!(axis_from_keys(&keys, &config).y, 0.0);
        keys.press(KeyCode::ArrowDown);
        assert_eq!(axis_from_keys(&keys, &config).y, 1.0);
    }
}
