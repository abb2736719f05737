//! Match controller: aggregates a sequence of [`mex_rules::Game`] rounds into
//! one multi-game match, accumulating cross-game scores, per-game statistics,
//! and lifecycle state (`waiting -> in_progress -> completed`).
mod match_controller;
mod record;
mod seat;

pub use match_controller::{CompletionRecord, Match, MatchConfig, MatchError, MatchMarker, MatchStatus};
pub use record::{derive_achievements, Achievement, GameRecord};
pub use seat::{Role, Seat, SeatedPlayer};
