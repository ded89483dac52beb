use super::*;

fn config() -> SessionConfig {
    SessionConfig {
        time_limit_frames: 5,
        quit_delay_frames: 3,
        level_transition_frames: 30,
        death_reload_frames: 40,
        ..default()
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cavern_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

#[test]
fn test_countdown_then_quit_delay() {
    let config = config();
    let mut session = LevelSession::new(Vec::new(), &config);

    let steps: Vec<Countdown> = (0..10).map(|_| session.tick_countdown(&config)).collect();
    println!("Countdown steps: {:?}", steps);

    assert_eq!(&steps[..4], &[Countdown::Running; 4]);
    assert_eq!(steps[4], Countdown::TimeUp, "timer hits zero on the fifth tick");
    assert_eq!(&steps[5..8], &[Countdown::Expiring; 3]);
    assert_eq!(steps[8], Countdown::GameOver);
    assert_eq!(session.time_left, 0, "time_left never goes negative");
    assert!(session.timer_finished);
}

#[test]
fn test_zero_time_limit_expires_immediately() {
    let config = SessionConfig { time_limit_frames: 0, ..config() };
    let mut session = LevelSession::new(Vec::new(), &config);
    assert_eq!(session.tick_countdown(&config), Countdown::TimeUp);
}

#[test]
fn test_level_clear_waits_for_transition() {
    let config = config();
    let mut session = LevelSession::new(Vec::new(), &config);

    for _ in 0..10 {
        assert!(!session.tick_level_clear(2, &config), "enemies left, no transition");
    }
    assert_eq!(session.transition, 0);

    let ticks = (1..=100).find(|_| session.tick_level_clear(0, &config));
    assert_eq!(ticks, Some(31), "transition fires once the counter passes 30");
}

#[test]
fn test_death_reload_after_delay() {
    let config = config();
    let mut session = LevelSession::new(Vec::new(), &config);

    assert!(!session.tick_death(false, &config));
    assert_eq!(session.dead, 0);

    // Once dead the counter keeps running regardless of the flag.
    let mut ticks = 0;
    let mut dead = true;
    while !session.tick_death(dead, &config) {
        ticks += 1;
        dead = false;
        assert!(ticks < 100, "reload never fired");
    }
    println!("Reload after {} ticks", ticks + 1);
    assert_eq!(ticks + 1, 41);
}

#[test]
fn test_advance_level_clamps_to_last() {
    let config = config();
    let levels = vec![PathBuf::from("0.json"), PathBuf::from("1.json")];
    let mut session = LevelSession::new(levels, &config);

    session.advance_level();
    assert_eq!(session.level, 1);
    session.advance_level();
    assert_eq!(session.level, 1, "the last level repeats");
    assert_eq!(session.current_level_path(), Some(Path::new("1.json")));

    let mut empty = LevelSession::new(Vec::new(), &config);
    empty.advance_level();
    assert_eq!(empty.level, 0);
    assert_eq!(empty.current_level_path(), None);
}

#[test]
fn test_restart_resets_counters_but_keeps_level() {
    let config = config();
    let mut session = LevelSession::new(vec![PathBuf::from("0.json"), PathBuf::from("1.json")], &config);
    session.advance_level();
    for _ in 0..20 {
        session.tick_countdown(&config);
    }
    session.dead = 12;
    session.player_health = Some(30);

    session.restart(&config);

    assert_eq!(session.level, 1);
    assert_eq!(session.time_left, config.time_limit_frames);
    assert!(!session.timer_finished);
    assert_eq!(session.quit_delay, 0);
    assert_eq!(session.dead, 0);
    assert_eq!(session.player_health, None);
}

#[test]
fn test_discover_levels_sorts_numerically() {
    let dir = scratch_dir("discover");
    for name in ["10.json", "2.json", "0.bin", "notes.txt", "intro.json", "1.json"] {
        std::fs::write(dir.join(name), "{}").expect("write level stub");
    }

    let levels = discover_levels(&dir).expect("directory is readable");
    let names: Vec<String> = levels
        .iter()
        .map(|p| p.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string())
        .collect();
    println!("Discovered: {:?}", names);

    assert_eq!(names, vec!["0.bin", "1.json", "2.json", "10.json"]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_discover_missing_dir_is_error() {
    let dir = std::env::temp_dir().join(format!("cavern_missing_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    assert!(matches!(discover_levels(&dir), Err(LevelError::Io { .. })));
}

#[test]
fn test_fresh_player_carries_health() {
    let config = PlayerConfig::default();
    assert_eq!(fresh_player(&config, None).health, config.max_health);
    let carried = fresh_player(&config, Some(40));
    assert_eq!(carried.health, 40);
    assert_eq!(carried.invincible_time, 0, "only health carries over");
}
