use crate::tile::Tile;
use mex_core::{Pip, Position};
use serde::{Deserialize, Serialize};

/// Which train this is: a player's personal train, or the shared Mexican train.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum TrainKind {
    Personal(Position),
    Mexican,
}

/// A tile as placed on a train, with the orientation it was joined in.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlacedTile {
    pub tile: Tile,
    /// The pip that matched the train's head at the moment of placement.
    pub head: Pip,
    /// The pip now exposed at the free end.
    pub tail: Pip,
}

/// An ordered sequence of placed tiles extending from the game's engine pip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Train {
    kind: TrainKind,
    tiles: Vec<PlacedTile>,
    open: bool,
    unsatisfied_double: bool,
}

impl Train {
    /// Creates a new, empty train. Personal trains start closed; the Mexican
    /// train is always open.
    pub fn new(kind: TrainKind) -> Self {
        let open = matches!(kind, TrainKind::Mexican);
        Self {
            kind,
            tiles: Vec::new(),
            open,
            unsatisfied_double: false,
        }
    }

    pub fn kind(&self) -> TrainKind {
        self.kind
    }
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
    pub fn tiles(&self) -> &[PlacedTile] {
        &self.tiles
    }
    pub fn is_open(&self) -> bool {
        self.open
    }
    pub fn has_unsatisfied_double(&self) -> bool {
        self.unsatisfied_double
    }
    /// Owner of a personal train; `None` for the Mexican train.
    pub fn owner(&self) -> Option<Position> {
        match self.kind {
            TrainKind::Personal(p) => Some(p),
            TrainKind::Mexican => None,
        }
    }
    /// The free-end pip: the engine pip on an empty train, else the last
    /// placed tile's exposed tail.
    pub fn head_value(&self, engine_pip: Pip) -> Pip {
        self.tiles.last().map(|p| p.tail).unwrap_or(engine_pip)
    }
    /// True iff `tile` may legally be placed on this train right now.
    pub fn can_accept(&self, tile: &Tile, engine_pip: Pip) -> bool {
        tile.touches(self.head_value(engine_pip))
    }
    /// Places `tile`, orienting it so the matching pip joins the current
    /// head and the other pip becomes the new exposed tail. Returns the new
    /// tail value. Panics if the tile does not actually match — callers must
    /// check [`Train::can_accept`] first.
    pub fn place(&mut self, tile: Tile, engine_pip: Pip) -> Pip {
        let head = self.head_value(engine_pip);
        let tail = tile
            .other_end(head)
            .expect("place called with a tile that does not match the train head");
        self.tiles.push(PlacedTile { tile, head, tail });
        self.unsatisfied_double = tile.is_double();
        tail
    }
    /// Marks the train open, permitting any player to place on it.
    pub fn open(&mut self) {
        self.open = true;
    }
    /// Clears the pending-double obligation without altering the train's
    /// contents (the obligation has just been satisfied by a later play).
    pub fn satisfy_double(&mut self) {
        self.unsatisfied_double = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileId;

    fn tile(a: Pip, b: Pip) -> Tile {
        Tile::new(TileId(0), a, b)
    }

    #[test]
    fn empty_personal_train_is_closed_mexican_is_open() {
        assert!(!Train::new(TrainKind::Personal(0)).is_open());
        assert!(Train::new(TrainKind::Mexican).is_open());
    }
    #[test]
    fn empty_train_accepts_engine_touching_tile() {
        let train = Train::new(TrainKind::Personal(0));
        assert!(train.can_accept(&tile(6, 9), 6));
        assert!(!train.can_accept(&tile(3, 9), 6));
    }
    #[test]
    fn place_orients_and_exposes_tail() {
        let mut train = Train::new(TrainKind::Personal(0));
        let tail = train.place(tile(6, 9), 6);
        assert_eq!(tail, 9);
        assert_eq!(train.head_value(6), 9);
        assert!(!train.has_unsatisfied_double());
    }
    #[test]
    fn placing_a_double_sets_unsatisfied_flag() {
        let mut train = Train::new(TrainKind::Personal(0));
        train.place(tile(6, 6), 6);
        assert!(train.has_unsatisfied_double());
        train.place(tile(6, 2), 6);
        assert!(!train.has_unsatisfied_double());
    }
    #[test]
    fn satisfy_double_clears_flag() {
        let mut train = Train::new(TrainKind::Personal(0));
        train.place(tile(6, 6), 6);
        train.satisfy_double();
        assert!(!train.has_unsatisfied_double());
    }
}
