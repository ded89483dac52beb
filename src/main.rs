use bevy::prelude::*;

use bevy::window::WindowResolution;

use cavern::game::GamePlugin;

use bevy::log::LogPlugin;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use std::fs;
use std::path::Path;

const LOG_DIR: &str = "logs";
const LOG_PREFIX: &str = "cavern_";
const KEEP_LOGS: usize = 25;

/// Install stdout and file logging. Returns the log file path, or `None`
/// when the log directory is unusable and only stdout is logged.
fn setup_logging() -> Option<String> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            EnvFilter::new("wgpu=error,bevy_render=info,bevy_ecs=info,cavern=info")
        });

    let log_dir = Path::new(LOG_DIR);
    if let Err(e) = fs::create_dir_all(log_dir) {
        eprintln!("Cannot create {}: {}, logging to stdout only", LOG_DIR, e);
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stdout).with_target(false))
            .init();
        return None;
    }

    cleanup_old_logs(log_dir, KEEP_LOGS);

    let now = chrono::Local::now();
    let log_filename = format!("{}{}.log", LOG_PREFIX, now.format("%Y%m%d_%H%M%S"));
    let log_path = log_dir.join(&log_filename).to_string_lossy().to_string();

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    // One file per run
    let file_appender = RollingFileAppender::new(Rotation::NEVER, log_dir, &log_filename);
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Some(log_path)
}

fn cleanup_old_logs(log_dir: &Path, keep_count: usize) {
    let Ok(entries) = fs::read_dir(log_dir) else { return };

    let mut log_files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_str()
                .map(|s| s.starts_with(LOG_PREFIX) && s.ends_with(".log"))
                .unwrap_or(false)
        })
        .collect();

    // Oldest first
    log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

    let excess = log_files.len().saturating_sub(keep_count);
    for file in log_files.iter().take(excess) {
        let _ = fs::remove_file(file.path());
    }
}

fn main() {
    let log_file = setup_logging().unwrap_or_else(|| "(stdout only)".to_string());

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║  Cavern - Logging to file                                ║");
    println!("╠══════════════════════════════════════════════════════════╣");
    println!("║  Log file: {:<45} ║", log_file);
    println!("╚══════════════════════════════════════════════════════════╝");

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Cavern".into(),
                resolution: WindowResolution::new(1280, 720),
                resizable: true,
                ..default()
            }),
            ..default()
        })
        .set(ImagePlugin::default_nearest())
        .build().disable::<LogPlugin>()) // Logging is installed above
        .add_plugins(GamePlugin)
        .run();
}
