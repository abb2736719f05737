use crate::match_session::MatchSession;
use mex_core::ID;
use mex_match::{MatchMarker, MatchStatus, Role};
use serde::Serialize;

/// One row of the match list (`list_matches`). Derived entirely
/// from the session manager's live state — there is no separate lobby store.
#[derive(Debug, Clone, Serialize)]
pub struct MatchListing {
    pub key: String,
    pub id: ID<MatchMarker>,
    pub name: String,
    pub host: String,
    pub seated: usize,
    pub max_players: usize,
    pub status: &'static str,
    pub current_game_number: usize,
    pub games_to_play: usize,
}

/// One connected human, as shown in the presence list.
///
/// Identity in this core is a per-match [`mex_match::Seat`] id, not a
/// cross-match account, so `active_match_count` is always 1 — an
/// out-of-scope account-store collaborator would be needed to fold a human
/// across concurrent matches into one presence row.
#[derive(Debug, Clone, Serialize)]
pub struct UserPresence {
    pub seat_id: ID<mex_match::Seat>,
    pub display_name: String,
    pub status: &'static str,
    pub active_match_count: usize,
}

fn status_label(status: &MatchStatus) -> &'static str {
    match status {
        MatchStatus::Waiting => "waiting",
        MatchStatus::InProgress => "in_progress",
        MatchStatus::Completed => "completed",
    }
}

pub(crate) fn build_listing(key: &str, session: &MatchSession) -> MatchListing {
    let mtch = &session.mtch;
    let current_game_number = match mtch.status {
        MatchStatus::Waiting => 0,
        MatchStatus::InProgress => mtch.games_played() + 1,
        MatchStatus::Completed => mtch.games_played(),
    };
    let host_name = mtch
        .seats
        .iter()
        .find(|s| s.id == mtch.host)
        .map(|s| s.display_name.clone())
        .unwrap_or_default();
    MatchListing {
        key: key.to_string(),
        id: mtch.id,
        name: mtch.name.clone(),
        host: host_name,
        seated: mtch.seats.len(),
        max_players: mtch.config.max_players,
        status: status_label(&mtch.status),
        current_game_number,
        games_to_play: mtch.config.games_to_play,
    }
}

pub(crate) fn collect_presence(session: &MatchSession, out: &mut Vec<UserPresence>) {
    let mtch = &session.mtch;
    let status = if mtch.status == MatchStatus::InProgress { "in-game" } else { "in-lobby" };
    for (position, seat) in mtch.seats.iter().enumerate() {
        if seat.role != Role::Human {
            continue;
        }
        if !session.seat_connected(position) {
            continue;
        }
        out.push(UserPresence {
            seat_id: seat.id,
            display_name: seat.display_name.clone(),
            status,
            active_match_count: 1,
        });
    }
}
