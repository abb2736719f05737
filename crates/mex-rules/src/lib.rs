//! Mexican Train rules engine: a single round's state machine.
//!
//! [`Game::deal`] shuffles and deals one round; [`Game::legal_moves`],
//! [`Game::make_move`], and [`Game::draw`] drive it turn by turn until
//! [`Game::result`] reports a winner.
mod error;
mod game;

pub use error::RulesError;
pub use game::{DrawOutcome, Game, GameResult, LegalMove, MoveOutcome};
