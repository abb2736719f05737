use crate::match_session::MatchSession;
use mex_core::Position;
use mex_match::MatchStatus;
use serde::Serialize;

/// Per-match detail for the administrative interface: seats,
/// connections, current turn, and boneyard size. Read-only — mutations go
/// through [`crate::SessionManager::admin_force_terminate`] and
/// [`crate::SessionManager::admin_force_advance`].
#[derive(Debug, Clone, Serialize)]
pub struct MatchDetail {
    pub key: String,
    pub name: String,
    pub status: &'static str,
    pub seats: Vec<SeatDetail>,
    pub connection_count: usize,
    pub spectator_count: usize,
    pub current_turn: Option<Position>,
    pub boneyard_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatDetail {
    pub position: Position,
    pub display_name: String,
    pub is_ai: bool,
    pub connected: bool,
}

fn status_label(status: &MatchStatus) -> &'static str {
    match status {
        MatchStatus::Waiting => "waiting",
        MatchStatus::InProgress => "in_progress",
        MatchStatus::Completed => "completed",
    }
}

pub(crate) fn build_detail(key: &str, session: &MatchSession) -> MatchDetail {
    let mtch = &session.mtch;
    let seats = mtch
        .seats
        .iter()
        .enumerate()
        .map(|(position, seat)| SeatDetail {
            position,
            display_name: seat.display_name.clone(),
            is_ai: seat.role.is_ai(),
            connected: session.seat_connected(position),
        })
        .collect();
    let (current_turn, boneyard_size): (Option<Position>, Option<usize>) = match mtch.current_game() {
        Some(game) => (Some(game.turn()), Some(game.boneyard_len())),
        None => (None, None),
    };
    MatchDetail {
        key: key.to_string(),
        name: mtch.name.clone(),
        status: status_label(&mtch.status),
        seats,
        connection_count: session.connection_count(),
        spectator_count: session.spectator_count(),
        current_turn,
        boneyard_size,
    }
}
