use bevy::prelude::*;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use thiserror::Error;

use super::grid::{OffgridTile, Tile, TileCoord, TileGrid, TileKind};

pub const LEVEL_VERSION: u32 = 1;

/// Largest accepted level width or height, in tiles.
pub const MAX_LEVEL_SIDE: i32 = 1024;

/// Spawner variant that marks the player start.
pub const PLAYER_SPAWNER: u32 = 0;
/// Spawner variant that marks an enemy.
pub const ENEMY_SPAWNER: u32 = 1;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to access level file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed level json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bad tile key {0:?}, expected \"x;y\"")]
    BadTileKey(String),
    #[error("binary level codec: {0}")]
    Binary(#[from] bincode::Error),
    #[error("unsupported level version {found}, expected {}", LEVEL_VERSION)]
    UnsupportedVersion { found: u32 },
    #[error("tile size must be positive, got {0}")]
    BadTileSize(i32),
    #[error("level is {width}x{height} tiles, at most {}x{} is supported", MAX_LEVEL_SIDE, MAX_LEVEL_SIDE)]
    TooLarge { width: i32, height: i32 },
}

/// Reject grids the simulation cannot run on.
fn validate(grid: TileGrid) -> Result<TileGrid, LevelError> {
    if grid.tile_size <= 0 {
        return Err(LevelError::BadTileSize(grid.tile_size));
    }
    if grid.width > MAX_LEVEL_SIDE || grid.height > MAX_LEVEL_SIDE {
        return Err(LevelError::TooLarge { width: grid.width, height: grid.height });
    }
    Ok(grid)
}

// ============================================================================
// Editor JSON format
// ============================================================================

/// On-disk shape written by the level editor.
#[derive(Serialize, Deserialize)]
struct LevelFile {
    tilemap: BTreeMap<String, TileRecord>,
    tile_size: i32,
    #[serde(default)]
    offgrid: Vec<OffgridRecord>,
    #[serde(default)]
    width: Option<i32>,
    #[serde(default)]
    height: Option<i32>,
}

#[derive(Serialize, Deserialize)]
struct TileRecord {
    #[serde(rename = "type")]
    kind: TileKind,
    variant: u32,
    pos: [i32; 2],
}

#[derive(Serialize, Deserialize)]
struct OffgridRecord {
    #[serde(rename = "type")]
    kind: TileKind,
    variant: u32,
    pos: [f32; 2],
}

fn parse_tile_key(key: &str) -> Result<TileCoord, LevelError> {
    let bad = || LevelError::BadTileKey(key.to_string());
    let (x, y) = key.split_once(';').ok_or_else(bad)?;
    let x = x.trim().parse().map_err(|_| bad())?;
    let y = y.trim().parse().map_err(|_| bad())?;
    Ok(TileCoord::new(x, y))
}

/// Build a grid from the editor's JSON text.
///
/// Grid bounds come from the optional `width`/`height` fields, falling back to
/// the extent of the non-negative tiles.
pub fn parse_level_json(text: &str) -> Result<TileGrid, LevelError> {
    let file: LevelFile = serde_json::from_str(text)?;
    if file.tile_size <= 0 {
        return Err(LevelError::BadTileSize(file.tile_size));
    }
    let mut grid = TileGrid::new(file.tile_size);

    for (key, record) in &file.tilemap {
        let coord = parse_tile_key(key)?;
        if coord != TileCoord::new(record.pos[0], record.pos[1]) {
            warn!("[LEVEL] Tile key {:?} disagrees with pos {:?}, using key", key, record.pos);
        }
        grid.insert(coord, Tile::new(record.kind, record.variant));
    }

    grid.offgrid = file
        .offgrid
        .iter()
        .map(|deco| OffgridTile {
            kind: deco.kind,
            variant: deco.variant,
            pos: Vec2::new(deco.pos[0], deco.pos[1]),
        })
        .collect();

    grid.recompute_bounds();
    if let Some(width) = file.width {
        grid.width = width.max(0);
    }
    if let Some(height) = file.height {
        grid.height = height.max(0);
    }

    validate(grid)
}

/// Serialize a grid back to the editor's JSON format.
pub fn level_to_json(grid: &TileGrid) -> Result<String, LevelError> {
    let tilemap = grid
        .tiles()
        .map(|(coord, tile)| {
            (
                format!("{};{}", coord.x, coord.y),
                TileRecord { kind: tile.kind, variant: tile.variant, pos: [coord.x, coord.y] },
            )
        })
        .collect();
    let offgrid = grid
        .offgrid
        .iter()
        .map(|deco| OffgridRecord { kind: deco.kind, variant: deco.variant, pos: [deco.pos.x, deco.pos.y] })
        .collect();

    let file = LevelFile {
        tilemap,
        tile_size: grid.tile_size,
        offgrid,
        width: Some(grid.width),
        height: Some(grid.height),
    };
    Ok(serde_json::to_string(&file)?)
}

pub fn load_level_json(path: impl AsRef<Path>) -> Result<TileGrid, LevelError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_level_json(&text)
}

// ============================================================================
// Compressed binary format
// ============================================================================

#[derive(Serialize, Deserialize)]
struct LevelBlob {
    version: u32,
    grid: TileGrid,
}

pub fn save_level(path: impl AsRef<Path>, grid: &TileGrid) -> Result<(), LevelError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| LevelError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let writer = BufWriter::new(file);
    let mut encoder = ZlibEncoder::new(writer, Compression::default());
    bincode::serialize_into(&mut encoder, &LevelBlob { version: LEVEL_VERSION, grid: grid.clone() })?;
    encoder.finish().map_err(|source| LevelError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(())
}

pub fn load_level(path: impl AsRef<Path>) -> Result<TileGrid, LevelError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LevelError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let reader = BufReader::new(file);
    let mut decoder = ZlibDecoder::new(reader);
    let blob: LevelBlob = bincode::deserialize_from(&mut decoder)?;
    if blob.version != LEVEL_VERSION {
        return Err(LevelError::UnsupportedVersion { found: blob.version });
    }
    validate(blob.grid)
}

/// Load either format, picking the binary codec for `.bin` files.
pub fn load_any(path: impl AsRef<Path>) -> Result<TileGrid, LevelError> {
    let path = path.as_ref();
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("bin") => load_level(path),
        _ => load_level_json(path),
    }
}

// ============================================================================
// Spawners
// ============================================================================

/// Spawn points pulled out of a freshly loaded grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelLayout {
    pub player_spawn: Option<Vec2>,
    pub enemy_spawns: Vec<Vec2>,
}

impl LevelLayout {
    /// Remove spawner tiles from `grid` and record where actors start.
    ///
    /// With several player spawners the last one wins.
    pub fn extract_from(grid: &mut TileGrid) -> Self {
        let mut layout = LevelLayout::default();
        let spawners = grid.extract(
            &[(TileKind::Spawners, PLAYER_SPAWNER), (TileKind::Spawners, ENEMY_SPAWNER)],
            false,
        );
        for spawner in spawners {
            if spawner.variant == PLAYER_SPAWNER {
                layout.player_spawn = Some(spawner.pos);
            } else {
                layout.enemy_spawns.push(spawner.pos);
            }
        }
        layout
    }
}
