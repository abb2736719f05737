use crate::tile::Tile;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// The ordered remainder of tiles left after dealing hands. Order is fixed
/// at shuffle time; draws pop from one end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Boneyard {
    tiles: Vec<Tile>,
}

impl Boneyard {
    pub fn new(tiles: Vec<Tile>) -> Self {
        Self { tiles }
    }
    /// Shuffles `tiles` with the given RNG and wraps them as a boneyard.
    pub fn shuffled<R: rand::Rng>(mut tiles: Vec<Tile>, rng: &mut R) -> Self {
        tiles.shuffle(rng);
        Self::new(tiles)
    }
    pub fn len(&self) -> usize {
        self.tiles.len()
    }
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
    /// Draws one tile from the boneyard, if any remain.
    pub fn draw(&mut self) -> Option<Tile> {
        self.tiles.pop()
    }
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }
}
