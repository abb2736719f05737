use crate::tile::{Tile, TileId};
use serde::{Deserialize, Serialize};

/// A multiset of tiles held by one player.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hand {
    tiles: Vec<Tile>,
}

impl Hand {
    pub fn new(tiles: Vec<Tile>) -> Self {
        Self { tiles }
    }
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }
    pub fn len(&self) -> usize {
        self.tiles.len()
    }
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
    pub fn contains(&self, id: TileId) -> bool {
        self.tiles.iter().any(|t| t.id() == id)
    }
    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.id() == id)
    }
    /// Removes and returns the tile with the given id, if held.
    pub fn remove(&mut self, id: TileId) -> Option<Tile> {
        let pos = self.tiles.iter().position(|t| t.id() == id)?;
        Some(self.tiles.remove(pos))
    }
    pub fn push(&mut self, tile: Tile) {
        self.tiles.push(tile);
    }
    /// Sum of pip values across every tile in hand.
    pub fn pip_total(&self) -> u32 {
        self.tiles.iter().map(Tile::value).sum()
    }
    /// True iff any tile in hand touches `pip`.
    pub fn has_match(&self, pip: u8) -> bool {
        self.tiles.iter().any(|t| t.touches(pip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(id: u16, a: u8, b: u8) -> Tile {
        Tile::new(TileId(id), a, b)
    }

    #[test]
    fn remove_takes_the_right_tile() {
        let mut hand = Hand::new(vec![tile(0, 1, 2), tile(1, 3, 4)]);
        let removed = hand.remove(TileId(1)).unwrap();
        assert_eq!(removed.low(), 3);
        assert_eq!(hand.len(), 1);
        assert!(!hand.contains(TileId(1)));
    }
    #[test]
    fn pip_total_sums_values() {
        let hand = Hand::new(vec![tile(0, 1, 2), tile(1, 3, 4)]);
        assert_eq!(hand.pip_total(), 3 + 7);
    }
    #[test]
    fn has_match_checks_every_tile() {
        let hand = Hand::new(vec![tile(0, 1, 2), tile(1, 3, 4)]);
        assert!(hand.has_match(4));
        assert!(!hand.has_match(9));
    }
}
