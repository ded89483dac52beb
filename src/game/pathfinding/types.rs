use std::cmp::Ordering;

use crate::game::tilemap::TileCoord;

/// Node expansions allowed per search before giving up.
///
/// Large enough to flood a 256×256 level once.
pub const DEFAULT_MAX_EXPANSIONS: usize = 65_536;

/// One search node. Nodes live in an arena owned by a single search call and
/// refer to their parent by arena index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathNode {
    pub tile: TileCoord,
    pub parent: Option<usize>,
    pub g: u32,
    pub h: u32,
}

impl PathNode {
    #[inline]
    pub fn f(&self) -> u32 {
        self.g + self.h
    }
}

/// Open-set entry. `BinaryHeap` is a max-heap, so ordering is reversed to pop
/// the lowest `f` first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct OpenEntry {
    pub f: u32,
    pub node: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.cmp(&self.f)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
