use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use cavern::game::chest::Chest;
use cavern::game::config::InitialConfig;
use cavern::game::level::{LevelPlugin, LevelSession};
use cavern::game::simulation::{Behavior, GameEvent, Kinematics, SimulationPlugin, SimSet};
use cavern::game::tilemap::{
    level_to_json, save_level, Tile, TileCoord, TileGrid, TileKind, ENEMY_SPAWNER, PLAYER_SPAWNER,
};
use cavern::game::GameState;
use std::path::PathBuf;

#[derive(Resource, Default)]
struct Recorded(Vec<GameEvent>);

fn record_events(mut reader: MessageReader<GameEvent>, mut recorded: ResMut<Recorded>) {
    recorded.0.extend(reader.read().copied());
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cavern_flow_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

/// Open room with a stone border, the player at (2,2) and enemies at `enemies`.
fn room(enemies: &[TileCoord]) -> TileGrid {
    let mut grid = TileGrid::with_bounds(16, 24, 12);
    let stone = Tile::new(TileKind::Stone, 0);
    grid.fill(TileCoord::new(0, 0), TileCoord::new(23, 0), stone);
    grid.fill(TileCoord::new(0, 11), TileCoord::new(23, 11), stone);
    grid.fill(TileCoord::new(0, 0), TileCoord::new(0, 11), stone);
    grid.fill(TileCoord::new(23, 0), TileCoord::new(23, 11), stone);

    grid.insert(TileCoord::new(2, 2), Tile::new(TileKind::Spawners, PLAYER_SPAWNER));
    for &coord in enemies {
        grid.insert(coord, Tile::new(TileKind::Spawners, ENEMY_SPAWNER));
    }
    grid
}

/// Enemy sealed in a stone pocket so it can neither reach nor be reached.
fn room_with_boxed_enemy() -> TileGrid {
    let mut grid = room(&[TileCoord::new(20, 8)]);
    let stone = Tile::new(TileKind::Stone, 0);
    grid.fill(TileCoord::new(19, 7), TileCoord::new(21, 7), stone);
    grid.fill(TileCoord::new(19, 9), TileCoord::new(21, 9), stone);
    grid.insert(TileCoord::new(19, 8), stone);
    grid.insert(TileCoord::new(21, 8), stone);
    grid
}

fn write_json(dir: &PathBuf, name: &str, grid: &TileGrid) {
    let text = level_to_json(grid).expect("level serializes");
    std::fs::write(dir.join(name), text).expect("write level");
}

fn build_app(level_dir: &PathBuf, config: InitialConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.init_state::<GameState>();
    app.insert_resource(InitialConfig {
        rng_seed: Some(11),
        level_dir: level_dir.to_string_lossy().to_string(),
        ..config
    });
    app.add_plugins(SimulationPlugin);
    app.add_plugins(LevelPlugin);
    app.init_resource::<Recorded>();
    app.add_systems(FixedUpdate, record_events.after(SimSet::Session));

    // Boot -> Loading. Ticks are driven by hand from here on.
    app.update();
    app.world_mut().resource_mut::<Time<Fixed>>().set_timestep_seconds(3600.0);
    // Loading -> InGame
    app.update();
    app
}

fn state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

fn tick(app: &mut App, count: usize) {
    for _ in 0..count {
        app.world_mut().run_schedule(FixedUpdate);
    }
}

fn counts(app: &mut App) -> (usize, usize) {
    let mut query = app.world_mut().query::<&Behavior>();
    let behaviors: Vec<bool> = query.iter(app.world()).map(Behavior::is_player).collect();
    let players = behaviors.iter().filter(|&&p| p).count();
    (players, behaviors.len() - players)
}

fn player_health(app: &mut App) -> Option<i32> {
    let mut query = app.world_mut().query::<&Behavior>();
    query.iter(app.world()).find_map(Behavior::as_player).map(|p| p.health)
}

fn set_player_health(app: &mut App, health: i32) {
    let mut query = app.world_mut().query::<&mut Behavior>();
    for mut behavior in query.iter_mut(app.world_mut()) {
        if let Some(player) = behavior.as_player_mut() {
            player.health = health;
        }
    }
}

#[test]
fn test_boot_loads_first_level() {
    let dir = scratch_dir("boot");
    let level = room(&[TileCoord::new(10, 5), TileCoord::new(15, 8)]);
    write_json(&dir, "0.json", &level);

    let mut app = build_app(&dir, InitialConfig::default());

    assert_eq!(state(&app), GameState::InGame);
    assert_eq!(counts(&mut app), (1, 2));

    let grid = app.world().resource::<TileGrid>().clone();
    assert!(
        grid.tiles().all(|(_, tile)| tile.kind != TileKind::Spawners),
        "spawner tiles are removed from the live grid"
    );

    let mut players = app.world_mut().query::<(&Kinematics, &Behavior)>();
    let player_pos = players
        .iter(app.world())
        .find(|(_, b)| b.is_player())
        .map(|(kin, _)| kin.pos);
    assert_eq!(player_pos, Some(Vec2::new(32.0, 32.0)));

    let mut chests = app.world_mut().query::<&Chest>();
    let chest = *chests.single(app.world()).expect("one chest per level");
    println!("Chest placed at {:?}", chest.pos);
    assert!(!grid.is_solid_tile(grid.world_to_tile(chest.pos)), "chest sits on an open tile");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_binary_level_is_loaded() {
    let dir = scratch_dir("binary");
    save_level(dir.join("0.bin"), &room(&[TileCoord::new(12, 6)])).expect("save binary level");

    let mut app = build_app(&dir, InitialConfig::default());

    assert_eq!(state(&app), GameState::InGame);
    assert_eq!(counts(&mut app), (1, 1));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_missing_levels_end_the_game() {
    let dir = scratch_dir("empty");

    let app = build_app(&dir, InitialConfig::default());

    assert_eq!(state(&app), GameState::GameOver);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_cleared_level_advances_and_keeps_health() {
    let dir = scratch_dir("clear");
    write_json(&dir, "0.json", &room(&[]));
    write_json(&dir, "1.json", &room_with_boxed_enemy());

    let mut app = build_app(&dir, InitialConfig::default());
    assert_eq!(counts(&mut app), (1, 0));
    set_player_health(&mut app, 55);

    tick(&mut app, 30);
    app.update();
    assert_eq!(state(&app), GameState::InGame, "still waiting out the transition");

    tick(&mut app, 1);
    app.update();
    app.update();

    assert_eq!(state(&app), GameState::InGame);
    assert_eq!(app.world().resource::<LevelSession>().level, 1);
    assert_eq!(counts(&mut app), (1, 1), "level 1 spawned its enemy");
    assert_eq!(player_health(&mut app), Some(55), "health carries into the next level");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_death_reloads_with_full_health() {
    let dir = scratch_dir("death");
    write_json(&dir, "0.json", &room_with_boxed_enemy());

    let mut app = build_app(&dir, InitialConfig::default());
    set_player_health(&mut app, 0);

    tick(&mut app, 40);
    app.update();
    assert_eq!(state(&app), GameState::InGame);
    assert!(app.world().resource::<LevelSession>().dead > 0);

    tick(&mut app, 1);
    app.update();
    app.update();

    assert_eq!(state(&app), GameState::InGame);
    assert_eq!(app.world().resource::<LevelSession>().level, 0);
    assert_eq!(player_health(&mut app), Some(InitialConfig::default().player_max_health));
    assert_eq!(app.world().resource::<LevelSession>().dead, 0);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_countdown_ends_the_game() {
    let dir = scratch_dir("countdown");
    write_json(&dir, "0.json", &room_with_boxed_enemy());

    let config = InitialConfig { time_limit_seconds: 1, quit_delay_frames: 5, ..default() };
    let mut app = build_app(&dir, config);
    assert_eq!(app.world().resource::<LevelSession>().time_left, 60);

    tick(&mut app, 59);
    assert!(!app.world().resource::<Recorded>().0.contains(&GameEvent::TimeUp));

    tick(&mut app, 1);
    assert!(app.world().resource::<Recorded>().0.contains(&GameEvent::TimeUp));

    tick(&mut app, 5);
    app.update();
    assert_eq!(state(&app), GameState::InGame, "quit delay still running");

    tick(&mut app, 1);
    app.update();
    assert_eq!(state(&app), GameState::GameOver);
    let _ = std::fs::remove_dir_all(&dir);
}
