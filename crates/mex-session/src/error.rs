use mex_match::MatchError;
use mex_rules::RulesError;

/// Tagged failure kinds the session manager reports to an originating
/// client. None of these represent a crash or corrupt match
/// state; the caller reports the message and leaves state untouched.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no match with that id exists")]
    MatchNotFound,
    #[error("the match is full")]
    MatchFull,
    #[error("the match has already started")]
    MatchAlreadyStarted,
    #[error("the match has not started yet")]
    MatchNotInProgress,
    #[error("not enough seated players to start")]
    NotEnoughPlayers,
    #[error("only the host may perform this action")]
    NotHost,
    #[error("spectators are not allowed in this match")]
    SpectatorsNotAllowed,
    #[error("no seat with that id is in this match")]
    SeatNotFound,
    #[error("unrecognized message type '{0}'")]
    UnknownMessage(String),
    #[error("malformed message payload: {0}")]
    MalformedPayload(String),
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error("an internal error occurred")]
    Internal,
}

impl From<MatchError> for SessionError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::MatchFull => Self::MatchFull,
            MatchError::MatchAlreadyStarted => Self::MatchAlreadyStarted,
            MatchError::NotHost => Self::NotHost,
            MatchError::NotEnoughPlayers => Self::NotEnoughPlayers,
        }
    }
}

impl SessionError {
    /// The wire-level error kind tag (outbound `error`).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MatchNotFound => "match_not_found",
            Self::MatchFull => "match_full",
            Self::MatchAlreadyStarted => "match_already_started",
            Self::MatchNotInProgress => "match_not_in_progress",
            Self::NotEnoughPlayers => "not_enough_players",
            Self::NotHost => "not_host",
            Self::SpectatorsNotAllowed => "spectators_not_allowed",
            Self::SeatNotFound => "seat_not_found",
            Self::UnknownMessage(_) => "unknown_message",
            Self::MalformedPayload(_) => "malformed_payload",
            Self::Rules(RulesError::NotYourTurn) => "not_your_turn",
            Self::Rules(RulesError::TileNotInHand) => "tile_not_in_hand",
            Self::Rules(RulesError::IllegalDestination) => "illegal_destination",
            Self::Rules(RulesError::MustPlayNotDraw) => "must_play_not_draw",
            Self::Rules(RulesError::GameAlreadyEnded) => "game_already_ended",
            Self::Internal => "internal_error",
        }
    }
}
