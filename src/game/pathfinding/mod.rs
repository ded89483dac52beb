/// Tile-level A* used by pursuing enemies.
///
/// Searches are synchronous and self-contained: every call owns its node
/// arena, open heap and closed set, and nothing survives the call.

mod types;
mod astar;

#[cfg(test)]
mod tests;

// ============================================================================
// PUBLIC API
// ============================================================================

pub use types::{PathNode, DEFAULT_MAX_EXPANSIONS};
pub use astar::{find_path, find_path_bounded};
