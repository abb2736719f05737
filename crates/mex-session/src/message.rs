use mex_core::{Pip, Position, Score, ID};
use mex_domino::{Tile, TileId, TrainKind};
use mex_match::Seat;
use serde::{Deserialize, Serialize};

/// A tile exactly as shown to a client: its stable id plus both pip halves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TileView {
    pub id: TileId,
    pub low: Pip,
    pub high: Pip,
    pub is_double: bool,
}

impl From<&Tile> for TileView {
    fn from(tile: &Tile) -> Self {
        Self {
            id: tile.id(),
            low: tile.low(),
            high: tile.high(),
            is_double: tile.is_double(),
        }
    }
}

/// `{train_type, train_owner}` — internally tagged so the same shape both
/// parses an inbound `make_move` destination and serializes an outbound
/// train reference.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "train_type", rename_all = "snake_case")]
pub enum WireTrain {
    Personal { train_owner: Position },
    Mexican,
}

impl From<TrainKind> for WireTrain {
    fn from(kind: TrainKind) -> Self {
        match kind {
            TrainKind::Personal(owner) => Self::Personal { train_owner: owner },
            TrainKind::Mexican => Self::Mexican,
        }
    }
}
impl From<WireTrain> for TrainKind {
    fn from(wire: WireTrain) -> Self {
        match wire {
            WireTrain::Personal { train_owner } => Self::Personal(train_owner),
            WireTrain::Mexican => Self::Mexican,
        }
    }
}

/// A placed tile as shown on a train.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlacedTileView {
    pub tile: TileView,
    pub head: Pip,
    pub tail: Pip,
}

/// One train's full public state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainView {
    #[serde(flatten)]
    pub kind: WireTrain,
    pub tiles: Vec<PlacedTileView>,
    pub open: bool,
    pub unsatisfied_double: bool,
    pub head_value: Pip,
}

/// A seated player as shown in a match snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatView {
    pub seat: Position,
    pub id: ID<Seat>,
    pub display_name: String,
    pub is_ai: bool,
    pub connected: bool,
}

/// One hand as shown to a recipient: the viewer's own hand shows every
/// tile; every other hand shows only its size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandView {
    pub seat: Position,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiles: Option<Vec<TileView>>,
}

/// A personalized snapshot of the current game. `None` if no game is running
/// (the match is `waiting` or `completed`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStateView {
    pub max_pip: Pip,
    pub engine_pip: Pip,
    pub turn: Position,
    pub boneyard_size: usize,
    pub hands: Vec<HandView>,
    pub trains: Vec<TrainView>,
    pub unsatisfied_doubles: Vec<WireTrain>,
    pub played_double_this_turn: bool,
    pub ended: Option<GameResultView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameResultView {
    pub winner: Position,
    pub scores: Vec<Score>,
    pub deadlocked: bool,
}

/// A personalized snapshot of the match: lifecycle, seats, and cumulative
/// scoring, independent of whichever game is currently in progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchStateView {
    pub match_id: ID<mex_match::MatchMarker>,
    pub name: String,
    pub host: ID<Seat>,
    pub status: String,
    pub seats: Vec<SeatView>,
    pub games_to_play: usize,
    pub games_played: usize,
    pub cumulative_scores: Vec<Score>,
    pub spectator_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegalMoveView {
    pub tile: TileView,
    #[serde(flatten)]
    pub destination: WireTrain,
}

/// Every recognized inbound message, with its required payload fields.
#[derive(Debug, Clone)]
pub enum ClientMessage {
    JoinGame { player_name: String },
    SpectateGame { spectator_name: String },
    StartGame { force: bool },
    MakeMove { player_id: ID<Seat>, tile_id: TileId, destination: TrainKind },
    DrawDomino { player_id: ID<Seat> },
    GetValidMoves { player_id: ID<Seat>, tile: Option<TileId> },
    GetAllValidMoves { player_id: ID<Seat> },
    ChatMessage { payload: serde_json::Value },
}

/// Every recognized outbound message, including the read-only responses to
/// `get_valid_moves`/`get_all_valid_moves`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    MatchState(MatchStateView),
    GameState(GameStateView),
    MoveResult { success: bool, play_again: bool, new_tail: Option<Pip> },
    DrawResult { turn_passed: bool, can_play_drawn: bool },
    PlayerJoined { seat: SeatView },
    SpectatorJoined { spectator_name: String, spectator_count: usize },
    SpectatorLeft { spectator_name: String, spectator_count: usize },
    GameStarted,
    GameEnded { winner: Position, scores: Vec<Score>, deadlocked: bool },
    MatchEnded {
        winner: Position,
        margin: Score,
        games_won: Vec<u32>,
        achievements: Vec<mex_match::Achievement>,
    },
    CountdownUpdate { minutes_remaining: u64, seconds_remaining: u64, can_auto_start: bool, message: Option<String> },
    GameAutoStarted,
    GameDeleted { reason: String, redirect_to_lobby: bool },
    AiMove { seat: Position, tile: TileView, destination: WireTrain },
    AiError { seat: Position, reason: String },
    ValidMoves { moves: Vec<LegalMoveView> },
    AllValidMoves { moves: Vec<LegalMoveView>, can_play: bool, must_draw: bool },
    ChatMessage { payload: serde_json::Value },
    Error { kind: String, message: String },
}

/// The bare `{ type, data }` envelope every inbound message arrives in;
/// `data` is parsed per-type in [`crate::protocol`].
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}
