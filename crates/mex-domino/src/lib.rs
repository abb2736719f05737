//! Domino value types for Mexican Train: a tile, a hand, a boneyard, and a
//! train (an ordered sequence of placed tiles extending from the engine).
//!
//! ## Core types
//!
//! - [`Tile`] — an unordered pip pair with a stable opaque [`TileId`]
//! - [`TileSet`] — the full double-`max_pip` set, generated before shuffling
//! - [`Hand`] — the multiset of tiles a player holds
//! - [`Boneyard`] — the shuffled draw pile
//! - [`Train`] — a personal or Mexican train with head/tail and double state
mod boneyard;
mod hand;
mod tile;
mod train;

pub use boneyard::*;
pub use hand::*;
pub use tile::*;
pub use train::*;
