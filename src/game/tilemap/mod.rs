mod grid;
mod loader;


pub use grid::{
    ExtractedTile, OffgridTile, Tile, TileCoord, TileGrid, TileKind, DEFAULT_TILE_SIZE,
};
pub use loader::{
    level_to_json, load_any, load_level, load_level_json, parse_level_json, save_level,
    LevelError, LevelLayout, ENEMY_SPAWNER, LEVEL_VERSION, MAX_LEVEL_SIDE, PLAYER_SPAWNER,
};
