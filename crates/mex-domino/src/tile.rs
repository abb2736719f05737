use mex_core::Pip;
use serde::{Deserialize, Serialize};

/// Stable, opaque identifier assigned to a tile at deal/shuffle time.
///
/// Distinct from the tile's pip pair so a client can reference "the same
/// tile" across snapshots (e.g. to animate a play) without the identifier
/// itself revealing which pips it carries.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub u16);

/// An unordered pair of pip counts `(low, high)` with `low <= high <= max_pip`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Tile {
    id: TileId,
    low: Pip,
    high: Pip,
}

impl Tile {
    pub fn new(id: TileId, a: Pip, b: Pip) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self { id, low, high }
    }

    pub fn id(&self) -> TileId {
        self.id
    }
    pub fn low(&self) -> Pip {
        self.low
    }
    pub fn high(&self) -> Pip {
        self.high
    }
    /// Sum of the two pip counts.
    pub fn value(&self) -> u32 {
        self.low as u32 + self.high as u32
    }
    /// True if both halves carry the same pip count.
    pub fn is_double(&self) -> bool {
        self.low == self.high
    }
    /// True if either half carries `pip`.
    pub fn touches(&self, pip: Pip) -> bool {
        self.low == pip || self.high == pip
    }
    /// The pip count on the opposite half from `pip`, if this tile touches it.
    pub fn other_end(&self, pip: Pip) -> Option<Pip> {
        if self.low == pip {
            Some(self.high)
        } else if self.high == pip {
            Some(self.low)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}|{}]", self.low, self.high)
    }
}

/// The full `(max+1)(max+2)/2` tile set for a given maximum pip value,
/// with stable ids assigned in a fixed generation order (before shuffling).
#[derive(Debug, Clone)]
pub struct TileSet {
    tiles: Vec<Tile>,
}

impl TileSet {
    /// Builds the complete, unshuffled tile set for pip values `0..=max_pip`.
    pub fn full(max_pip: Pip) -> Self {
        let mut tiles = Vec::with_capacity(Self::count(max_pip));
        let mut next_id = 0u16;
        for high in 0..=max_pip {
            for low in 0..=high {
                tiles.push(Tile::new(TileId(next_id), low, high));
                next_id += 1;
            }
        }
        Self { tiles }
    }
    /// `(max_pip + 1)(max_pip + 2) / 2` — the size of a double-`max_pip` set.
    pub fn count(max_pip: Pip) -> usize {
        (max_pip as usize + 1) * (max_pip as usize + 2) / 2
    }
    pub fn into_tiles(self) -> Vec<Tile> {
        self.tiles
    }
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_set_has_expected_size() {
        let set = TileSet::full(12);
        assert_eq!(set.tiles().len(), 91);
        assert_eq!(TileSet::count(12), 91);
    }
    #[test]
    fn full_set_has_unique_pip_pairs() {
        let set = TileSet::full(6);
        let mut seen = std::collections::HashSet::new();
        for t in set.tiles() {
            assert!(seen.insert((t.low(), t.high())));
        }
        assert_eq!(seen.len(), TileSet::count(6));
    }
    #[test]
    fn doubles_detected() {
        let t = Tile::new(TileId(0), 5, 5);
        assert!(t.is_double());
        assert_eq!(t.value(), 10);
    }
    #[test]
    fn touches_and_other_end() {
        let t = Tile::new(TileId(0), 3, 9);
        assert!(t.touches(3));
        assert!(t.touches(9));
        assert!(!t.touches(4));
        assert_eq!(t.other_end(3), Some(9));
        assert_eq!(t.other_end(9), Some(3));
        assert_eq!(t.other_end(4), None);
    }
    #[test]
    fn orientation_normalizes_low_high() {
        let t = Tile::new(TileId(0), 9, 3);
        assert_eq!(t.low(), 3);
        assert_eq!(t.high(), 9);
    }
}
