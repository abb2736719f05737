//! Session manager: the multiplexer that holds every live match in memory,
//! routes inbound client messages into the rules engine and match
//! controller, personalizes and broadcasts state snapshots, schedules AI
//! turns, and runs the pre-start countdown before a match auto-starts.
//!
//! ## Layering
//!
//! - [`connection`] — per-match connection registry (who can see/do what)
//! - [`message`] — the wire protocol's inbound/outbound shapes
//! - [`protocol`] — envelope decoding
//! - [`views`] — personalized state-snapshot builders
//! - [`match_session`] — one live match: rules/match state + connections
//! - [`manager`] — [`SessionManager`], owning every [`MatchSession`] and the
//!   AI-move driver and countdown scheduler that act on them
//! - [`lobby`] / [`admin`] — read-only directory and operator views
mod admin;
mod connection;
mod error;
mod lobby;
mod manager;
mod match_session;
mod message;
mod protocol;
mod views;

pub use admin::{MatchDetail, SeatDetail};
pub use connection::{Connection, ConnectionRole, ConnectionTable};
pub use error::SessionError;
pub use lobby::{MatchListing, UserPresence};
pub use manager::SessionManager;
pub use match_session::{AiTurnOutcome, MatchSession};
pub use message::{ClientMessage, Envelope, ServerMessage};
pub use protocol::decode;
pub use views::{build_game_state_view, build_legal_move_views, build_match_state_view};
