/// Tagged failure kinds returned by the rules engine. These are reported to
/// the originating client; none of them represent a crash or corrupt state.
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum RulesError {
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("tile is not in your hand")]
    TileNotInHand,
    #[error("tile does not match the destination, or the destination is unreachable")]
    IllegalDestination,
    #[error("you have a legal move and must play it instead of drawing")]
    MustPlayNotDraw,
    #[error("the game has already ended")]
    GameAlreadyEnded,
}
