use bevy::prelude::*;

use crate::game::config::{runtime_config, GameConfig, GameConfigHandle};
use crate::game::debug::to_render;
use crate::game::simulation::{Behavior, Kinematics};

pub struct FollowCameraPlugin;

impl Plugin for FollowCameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
           .add_systems(Update, follow_player);
    }
}

#[derive(Component)]
pub struct FollowCamera;

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scale: GameConfig::default().camera_zoom,
            ..OrthographicProjection::default_2d()
        }),
        FollowCamera,
    ));
}

/// Move a fraction of the remaining distance toward `target`.
pub fn smooth_toward(current: Vec2, target: Vec2, smoothing: f32) -> Vec2 {
    current + (target - current) / smoothing.max(1.0)
}

fn follow_player(
    mut cameras: Query<(&mut Transform, &mut Projection), With<FollowCamera>>,
    actors: Query<(&Kinematics, &Behavior)>,
    config_handle: Option<Res<GameConfigHandle>>,
    game_configs: Res<Assets<GameConfig>>,
) {
    let Ok((mut transform, mut projection)) = cameras.single_mut() else { return };
    let Some(kin) = actors.iter().find(|(_, behavior)| behavior.is_player()).map(|(kin, _)| kin) else { return };

    let fallback = GameConfig::default();
    let config = runtime_config(config_handle.as_deref(), &game_configs).unwrap_or(&fallback);

    let current = transform.translation.truncate();
    let next = smooth_toward(current, to_render(kin.center()), config.camera_smoothing);
    transform.translation.x = next.x;
    transform.translation.y = next.y;

    if let Projection::Orthographic(ortho) = projection.as_mut() {
        if ortho.scale != config.camera_zoom {
            ortho.scale = config.camera_zoom;
        }
    }
}
