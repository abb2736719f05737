use mex_core::ID;
use serde::{Deserialize, Serialize};

/// Marker type for [`ID<Seat>`] — a stable slot in a match for one player.
#[derive(Debug)]
pub struct Seat;

/// How a seat is filled: a human behind a connection, or an AI bound to a
/// named strategy from the AI configuration.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum Role {
    Human,
    Ai { strategy_id: String },
}

impl Role {
    pub fn is_ai(&self) -> bool {
        matches!(self, Role::Ai { .. })
    }
}

/// One seated player: an opaque identifier, a display name, and a role.
/// Identity lives on the id, not the display name, so a human reconnect can
/// never collide with an AI-assigned name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatedPlayer {
    pub id: ID<Seat>,
    pub display_name: String,
    pub role: Role,
    /// Position in the seating order; breaks ties in completion records.
    pub joined_order: usize,
}

impl SeatedPlayer {
    pub fn human(display_name: impl Into<String>, joined_order: usize) -> Self {
        Self {
            id: ID::default(),
            display_name: display_name.into(),
            role: Role::Human,
            joined_order,
        }
    }

    pub fn ai(display_name: impl Into<String>, strategy_id: impl Into<String>, joined_order: usize) -> Self {
        Self {
            id: ID::default(),
            display_name: display_name.into(),
            role: Role::Ai {
                strategy_id: strategy_id.into(),
            },
            joined_order,
        }
    }
}
