/// Session flow: loading levels, the chest, the countdown, level clear and
/// death reload.
///
/// All counters run in simulation ticks. Level loads happen in
/// `OnEnter(GameState::Loading)`, the only time the tile grid changes.

use bevy::prelude::*;
use std::path::{Path, PathBuf};

use crate::game::chest::Chest;
use crate::game::enemy::EnemyBehavior;
use crate::game::player::{PlayerBehavior, PlayerConfig};
use crate::game::simulation::{
    init_sim_config_from_initial, Behavior, GameEvent, Kinematics, Score, SimConfig, SimRng, SimSet,
};
use crate::game::tilemap::{load_any, LevelError, LevelLayout};
use crate::game::{GameEntity, GameState};

#[cfg(test)]
mod tests;

/// Player start used when a level has no player spawner.
pub const DEFAULT_PLAYER_SPAWN: Vec2 = Vec2::new(100.0, 100.0);

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub level_dir: String,
    pub time_limit_frames: i32,
    /// Ticks between the countdown hitting zero and game over.
    pub quit_delay_frames: i32,
    pub level_transition_frames: i32,
    pub death_reload_frames: i32,
    pub chest_score: u32,
    pub enemy_score: u32,
    pub chest_size: Vec2,
    pub chest_placement_attempts: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            level_dir: "assets/levels".to_string(),
            time_limit_frames: 60 * 60,
            quit_delay_frames: 60,
            level_transition_frames: 30,
            death_reload_frames: 40,
            chest_score: 10,
            enemy_score: 1,
            chest_size: Vec2::new(16.0, 13.0),
            chest_placement_attempts: 1000,
        }
    }
}

/// Outcome of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Running,
    /// The timer reached zero on this tick.
    TimeUp,
    /// Waiting out the quit delay.
    Expiring,
    GameOver,
}

/// Progress through the level list plus the session-wide counters.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct LevelSession {
    pub levels: Vec<PathBuf>,
    pub level: usize,
    pub time_left: i32,
    pub timer_finished: bool,
    pub quit_delay: i32,
    /// Ticks spent with no enemies left.
    pub transition: i32,
    /// Ticks since the player died, 0 while alive.
    pub dead: i32,
    /// Health carried into the next level load; `None` means full health.
    pub player_health: Option<i32>,
}

impl LevelSession {
    pub fn new(levels: Vec<PathBuf>, config: &SessionConfig) -> Self {
        Self {
            levels,
            time_left: config.time_limit_frames,
            ..default()
        }
    }

    pub fn current_level_path(&self) -> Option<&Path> {
        self.levels.get(self.level).map(PathBuf::as_path)
    }

    /// Move to the next level, staying on the last one once reached.
    pub fn advance_level(&mut self) {
        self.level = (self.level + 1).min(self.levels.len().saturating_sub(1));
    }

    /// Reset the per-level counters after a load.
    pub fn on_level_loaded(&mut self) {
        self.transition = 0;
        self.dead = 0;
        self.player_health = None;
    }

    /// Fresh timer and full health; the current level is kept.
    pub fn restart(&mut self, config: &SessionConfig) {
        self.time_left = config.time_limit_frames;
        self.timer_finished = false;
        self.quit_delay = 0;
        self.transition = 0;
        self.dead = 0;
        self.player_health = None;
    }

    pub fn tick_countdown(&mut self, config: &SessionConfig) -> Countdown {
        if !self.timer_finished {
            self.time_left = (self.time_left - 1).max(0);
            if self.time_left > 0 {
                return Countdown::Running;
            }
            self.timer_finished = true;
            self.quit_delay = config.quit_delay_frames;
            return Countdown::TimeUp;
        }
        if self.quit_delay > 0 {
            self.quit_delay -= 1;
            return Countdown::Expiring;
        }
        Countdown::GameOver
    }

    /// Returns true once the level has been clear for long enough to move on.
    pub fn tick_level_clear(&mut self, enemies_left: usize, config: &SessionConfig) -> bool {
        if enemies_left > 0 {
            return false;
        }
        self.transition += 1;
        self.transition > config.level_transition_frames
    }

    /// Returns true once the player has been dead long enough to reload.
    pub fn tick_death(&mut self, player_dead: bool, config: &SessionConfig) -> bool {
        if self.dead > 0 {
            self.dead += 1;
        } else if player_dead {
            self.dead = 1;
        }
        self.dead > config.death_reload_frames
    }
}

/// Level files in `dir` whose stem is a level number, ordered by that number.
pub fn discover_levels(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, LevelError> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir).map_err(|source| LevelError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let mut levels: Vec<(u32, PathBuf)> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| matches!(path.extension().and_then(|e| e.to_str()), Some("json") | Some("bin")))
        .filter_map(|path| {
            let number = path.file_stem()?.to_str()?.parse().ok()?;
            Some((number, path))
        })
        .collect();
    levels.sort();
    levels.dedup_by_key(|(number, _)| *number);

    Ok(levels.into_iter().map(|(_, path)| path).collect())
}

// ============================================================================
// Plugin
// ============================================================================

pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LevelSession>();

        app.add_systems(PostStartup, (
            init_level_session.after(init_sim_config_from_initial),
            finish_boot.after(init_level_session),
        ));

        app.add_systems(OnEnter(GameState::Loading), load_current_level);

        // GameOver from the countdown runs last so it wins over a reload.
        app.add_systems(FixedUpdate, (
            collect_chest,
            check_level_clear,
            check_player_death,
            tick_countdown,
        ).chain().in_set(SimSet::Session));
    }
}

// ============================================================================
// Loading
// ============================================================================

pub fn init_level_session(config: Res<SimConfig>, mut session: ResMut<LevelSession>) {
    let levels = match discover_levels(&config.session.level_dir) {
        Ok(levels) => levels,
        Err(e) => {
            error!("[LEVEL] Cannot list levels: {}", e);
            Vec::new()
        }
    };
    if levels.is_empty() {
        warn!("[LEVEL] No level files found in {}", config.session.level_dir);
    } else {
        info!("[LEVEL] Found {} level files in {}", levels.len(), config.session.level_dir);
    }
    *session = LevelSession::new(levels, &config.session);
}

/// Leave the boot state once configuration is in place.
pub fn finish_boot(state: Res<State<GameState>>, mut next_state: ResMut<NextState<GameState>>) {
    if *state.get() == GameState::Boot {
        next_state.set(GameState::Loading);
    }
}

pub fn spawn_player(commands: &mut Commands, pos: Vec2, size: Vec2, behavior: PlayerBehavior) -> Entity {
    commands
        .spawn((
            GameEntity,
            Name::new("Player"),
            Kinematics::new(pos, size),
            Behavior::Player(behavior),
        ))
        .id()
}

pub fn spawn_enemy(commands: &mut Commands, pos: Vec2, size: Vec2) -> Entity {
    commands
        .spawn((
            GameEntity,
            Name::new("Enemy"),
            Kinematics::new(pos, size),
            Behavior::Enemy(EnemyBehavior::new()),
        ))
        .id()
}

fn fresh_player(config: &PlayerConfig, carried_health: Option<i32>) -> PlayerBehavior {
    let mut player = PlayerBehavior::new(config);
    if let Some(health) = carried_health {
        player.health = health;
    }
    player
}

/// Load the session's current level, replacing every gameplay entity.
pub fn load_current_level(
    mut commands: Commands,
    config: Res<SimConfig>,
    mut session: ResMut<LevelSession>,
    mut rng: ResMut<SimRng>,
    existing: Query<Entity, With<GameEntity>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    for entity in &existing {
        commands.entity(entity).despawn();
    }

    let Some(path) = session.current_level_path().map(Path::to_path_buf) else {
        error!("[LEVEL] No level file for index {} ({} known)", session.level, session.levels.len());
        next_state.set(GameState::GameOver);
        return;
    };

    let mut grid = match load_any(&path) {
        Ok(grid) => grid,
        Err(e) => {
            error!("[LEVEL] Failed to load {}: {}", path.display(), e);
            next_state.set(GameState::GameOver);
            return;
        }
    };

    let layout = LevelLayout::extract_from(&mut grid);
    let size = config.entity_size;

    let player_pos = layout.player_spawn.unwrap_or_else(|| {
        warn!("[LEVEL] {} has no player spawner, using {:?}", path.display(), DEFAULT_PLAYER_SPAWN);
        DEFAULT_PLAYER_SPAWN
    });
    spawn_player(&mut commands, player_pos, size, fresh_player(&config.player, session.player_health));

    for &pos in &layout.enemy_spawns {
        spawn_enemy(&mut commands, pos, size);
    }

    let session_config = &config.session;
    match Chest::place(&grid, session_config.chest_size, &mut rng.0, session_config.chest_placement_attempts) {
        Some(chest) => {
            commands.spawn((GameEntity, Name::new("Chest"), chest));
        }
        None => warn!("[LEVEL] No open tile for the chest after {} attempts", session_config.chest_placement_attempts),
    }

    info!(
        "[LEVEL] Loaded level {} from {}: {} tiles, {}x{} grid, {} enemies",
        session.level,
        path.display(),
        grid.tile_count(),
        grid.width,
        grid.height,
        layout.enemy_spawns.len()
    );

    session.on_level_loaded();
    commands.insert_resource(grid);
    next_state.set(GameState::InGame);
}

// ============================================================================
// Per-tick session rules
// ============================================================================

pub fn collect_chest(
    mut commands: Commands,
    config: Res<SimConfig>,
    chests: Query<(Entity, &Chest)>,
    actors: Query<(&Kinematics, &Behavior)>,
    mut score: ResMut<Score>,
    mut game_events: MessageWriter<GameEvent>,
) {
    let Some(player_rect) = actors.iter().find(|(_, behavior)| behavior.is_player()).map(|(kin, _)| kin.rect()) else {
        return;
    };

    for (entity, chest) in &chests {
        if chest.touches(player_rect) {
            commands.entity(entity).despawn();
            score.0 += config.session.chest_score;
            game_events.write(GameEvent::ChestCollected);
            info!("[SESSION] Chest collected, score {}", score.0);
        }
    }
}

pub fn check_level_clear(
    config: Res<SimConfig>,
    mut session: ResMut<LevelSession>,
    actors: Query<&Behavior>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let enemies_left = actors.iter().filter(|behavior| !behavior.is_player()).count();
    if !session.tick_level_clear(enemies_left, &config.session) {
        return;
    }

    let from = session.level;
    session.advance_level();
    session.player_health = actors.iter().find_map(Behavior::as_player).map(|player| player.health);
    info!("[SESSION] Level {} cleared, loading level {}", from, session.level);
    next_state.set(GameState::Loading);
}

pub fn check_player_death(
    config: Res<SimConfig>,
    mut session: ResMut<LevelSession>,
    actors: Query<&Behavior>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let player_dead = actors.iter().filter_map(Behavior::as_player).any(PlayerBehavior::is_dead);
    let was_alive = session.dead == 0;
    let reload = session.tick_death(player_dead, &config.session);

    if was_alive && session.dead > 0 {
        info!("[SESSION] Player died");
    }
    if reload {
        session.player_health = None;
        info!("[SESSION] Reloading level {} after death", session.level);
        next_state.set(GameState::Loading);
    }
}

pub fn tick_countdown(
    config: Res<SimConfig>,
    mut session: ResMut<LevelSession>,
    mut next_state: ResMut<NextState<GameState>>,
    mut game_events: MessageWriter<GameEvent>,
) {
    match session.tick_countdown(&config.session) {
        Countdown::Running | Countdown::Expiring => {}
        Countdown::TimeUp => {
            info!("[SESSION] Time is up");
            game_events.write(GameEvent::TimeUp);
        }
        Countdown::GameOver => {
            info!("[SESSION] Game over");
            next_state.set(GameState::GameOver);
        }
    }
}
