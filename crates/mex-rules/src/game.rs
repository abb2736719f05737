use crate::error::RulesError;
use mex_core::{Pip, Position, Score};
use mex_domino::{Boneyard, Hand, Tile, TileId, TileSet, Train, TrainKind};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One candidate (tile, destination) pair a player may legally choose.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct LegalMove {
    pub tile_id: TileId,
    pub destination: TrainKind,
}

/// Outcome of [`Game::make_move`]: what changed as a result of one placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// The destination's new exposed tail value.
    pub new_tail: Pip,
    /// True if this was a double, obligating the same player to play again.
    pub play_again: bool,
    /// Set if the move ended the current player's turn without resolving a
    /// standing obligation, opening their personal train.
    pub train_opened: Option<TrainKind>,
    /// Set if this move ended the game (empty hand).
    pub game_ended: Option<GameResult>,
}

/// Outcome of [`Game::draw`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawOutcome {
    /// The drawn tile, if the boneyard was non-empty.
    pub tile: Option<Tile>,
    /// True if this action ended the current player's turn.
    pub turn_passed: bool,
    /// True if the drawn tile may be played immediately, same turn.
    pub can_play_drawn: bool,
    /// Set if the turn ended without a play, opening the player's train.
    pub train_opened: Option<TrainKind>,
    /// Set if the draw triggered a deadlock game end.
    pub game_ended: Option<GameResult>,
}

/// Terminal result of a completed game (one round).
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub winner: Position,
    /// Per-player round score: pips remaining in hand (0 for the winner on
    /// an empty-hand finish).
    pub scores: Vec<Score>,
    pub deadlocked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum GamePhase {
    InPlay,
    Ended(GameResult),
}

/// One round of Mexican Train: the rules engine's state machine.
///
/// Construct with [`Game::deal`]; drive with [`Game::legal_moves`],
/// [`Game::make_move`], and [`Game::draw`] until [`Game::result`] returns
/// `Some`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    max_pip: Pip,
    engine_pip: Pip,
    hands: Vec<Hand>,
    personal_trains: Vec<Train>,
    mexican_train: Train,
    boneyard: Boneyard,
    turn: Position,
    unsatisfied_doubles: Vec<TrainKind>,
    played_double_this_turn: bool,
    phase: GamePhase,
}

impl Game {
    /// Builds, shuffles, and deals a new game for `players` seats.
    pub fn deal<R: Rng>(players: usize, max_pip: Pip, rng: &mut R) -> Self {
        assert!(players >= 1, "a game needs at least one seated player");
        let tiles = TileSet::full(max_pip).into_tiles();
        let mut boneyard = Boneyard::shuffled(tiles, rng);

        let size = Self::hand_size(players);
        let mut hands: Vec<Hand> = (0..players)
            .map(|_| {
                let dealt: Vec<Tile> = (0..size).filter_map(|_| boneyard.draw()).collect();
                Hand::new(dealt)
            })
            .collect();

        let (starter, engine_pip) = Self::select_starter(&mut hands);

        let personal_trains = (0..players).map(|p| Train::new(TrainKind::Personal(p))).collect();
        let mexican_train = Train::new(TrainKind::Mexican);

        Self {
            max_pip,
            engine_pip,
            hands,
            personal_trains,
            mexican_train,
            boneyard,
            turn: starter,
            unsatisfied_doubles: Vec::new(),
            played_double_this_turn: false,
            phase: GamePhase::InPlay,
        }
    }

    /// Per-player hand size for the given seat count.
    fn hand_size(players: usize) -> usize {
        match players {
            0..=2 => 16,
            3..=4 => 15,
            5..=6 => 12,
            _ => 10,
        }
    }

    /// Picks the starting player and this game's engine pip: the holder of
    /// the highest double in any hand, or (if no double was dealt) the
    /// holder of the highest-valued tile, synthesizing an engine `(k,k)`
    /// from its higher pip. The used tile is removed from that hand.
    fn select_starter(hands: &mut [Hand]) -> (Position, Pip) {
        let mut best_double: Option<(Position, Tile)> = None;
        for (pos, hand) in hands.iter().enumerate() {
            for tile in hand.tiles() {
                if tile.is_double() {
                    let better = best_double.map_or(true, |(_, b)| tile.high() > b.high());
                    if better {
                        best_double = Some((pos, *tile));
                    }
                }
            }
        }
        if let Some((pos, tile)) = best_double {
            hands[pos].remove(tile.id());
            return (pos, tile.high());
        }

        let mut best: Option<(Position, Tile)> = None;
        for (pos, hand) in hands.iter().enumerate() {
            for tile in hand.tiles() {
                let better = best.map_or(true, |(_, b)| tile.value() > b.value());
                if better {
                    best = Some((pos, *tile));
                }
            }
        }
        let (pos, tile) = best.expect("every seated player was dealt a hand");
        let engine_pip = tile.high().max(tile.low());
        hands[pos].remove(tile.id());
        (pos, engine_pip)
    }

    pub fn max_pip(&self) -> Pip {
        self.max_pip
    }
    pub fn engine_pip(&self) -> Pip {
        self.engine_pip
    }
    pub fn turn(&self) -> Position {
        self.turn
    }
    pub fn seats(&self) -> usize {
        self.hands.len()
    }
    pub fn hand(&self, player: Position) -> &Hand {
        &self.hands[player]
    }
    pub fn boneyard_len(&self) -> usize {
        self.boneyard.len()
    }
    pub fn unsatisfied_doubles(&self) -> &[TrainKind] {
        &self.unsatisfied_doubles
    }
    pub fn played_double_this_turn(&self) -> bool {
        self.played_double_this_turn
    }
    pub fn is_ended(&self) -> bool {
        matches!(self.phase, GamePhase::Ended(_))
    }
    pub fn result(&self) -> Option<&GameResult> {
        match &self.phase {
            GamePhase::Ended(r) => Some(r),
            GamePhase::InPlay => None,
        }
    }
    pub fn train(&self, kind: TrainKind) -> &Train {
        match kind {
            TrainKind::Personal(p) => &self.personal_trains[p],
            TrainKind::Mexican => &self.mexican_train,
        }
    }
    fn train_mut(&mut self, kind: TrainKind) -> &mut Train {
        match kind {
            TrainKind::Personal(p) => &mut self.personal_trains[p],
            TrainKind::Mexican => &mut self.mexican_train,
        }
    }

    /// Every train currently reachable by `player`, in order.
    fn reachable_destinations(&self, player: Position) -> Vec<TrainKind> {
        if !self.unsatisfied_doubles.is_empty() {
            return self.unsatisfied_doubles.clone();
        }
        let mut destinations = vec![TrainKind::Personal(player), TrainKind::Mexican];
        for (pos, train) in self.personal_trains.iter().enumerate() {
            if pos != player && train.is_open() {
                destinations.push(TrainKind::Personal(pos));
            }
        }
        destinations
    }

    /// All legal `(tile, destination)` pairs for `player` right now.
    pub fn legal_moves(&self, player: Position) -> Vec<LegalMove> {
        let hand = &self.hands[player];
        let destinations = self.reachable_destinations(player);
        let mut moves = Vec::new();
        for dest in destinations {
            let train = self.train(dest);
            for tile in hand.tiles() {
                if train.can_accept(tile, self.engine_pip) {
                    moves.push(LegalMove {
                        tile_id: tile.id(),
                        destination: dest,
                    });
                }
            }
        }
        moves
    }

    /// True if `tile` could be legally placed somewhere by `player` right now
    /// (used to decide whether a freshly drawn tile may be played).
    fn tile_has_legal_destination(&self, player: Position, tile: &Tile) -> bool {
        self.reachable_destinations(player)
            .iter()
            .any(|&dest| self.train(dest).can_accept(tile, self.engine_pip))
    }

    /// Applies a move for `player`, placing `tile_id` onto `destination`.
    pub fn make_move(
        &mut self,
        player: Position,
        tile_id: TileId,
        destination: TrainKind,
    ) -> Result<MoveOutcome, RulesError> {
        if self.is_ended() {
            return Err(RulesError::GameAlreadyEnded);
        }
        if player != self.turn {
            return Err(RulesError::NotYourTurn);
        }
        let tile = self.hands[player]
            .get(tile_id)
            .copied()
            .ok_or(RulesError::TileNotInHand)?;
        if !self.reachable_destinations(player).contains(&destination) {
            return Err(RulesError::IllegalDestination);
        }
        if !self.train(destination).can_accept(&tile, self.engine_pip) {
            return Err(RulesError::IllegalDestination);
        }

        self.hands[player].remove(tile_id);
        let was_pending = self.train(destination).has_unsatisfied_double();
        let new_tail = self.train_mut(destination).place(tile, self.engine_pip);

        let mut play_again = false;
        if tile.is_double() {
            if !self.unsatisfied_doubles.contains(&destination) {
                self.unsatisfied_doubles.push(destination);
            }
            self.played_double_this_turn = true;
            play_again = true;
        } else if was_pending {
            self.train_mut(destination).satisfy_double();
            self.unsatisfied_doubles.retain(|&d| d != destination);
        }

        // Open question (DESIGN.md #1): an empty hand wins immediately, even
        // if it was emptied by a double that leaves an obligation nobody can
        // ever satisfy again.
        if self.hands[player].is_empty() {
            let result = self.finish_with_winner(player);
            self.phase = GamePhase::Ended(result.clone());
            return Ok(MoveOutcome {
                new_tail,
                play_again: false,
                train_opened: None,
                game_ended: Some(result),
            });
        }

        if play_again || !self.unsatisfied_doubles.is_empty() {
            // Same player continues; doubles-restricted enumeration applies
            // to their (or anyone's) very next action.
            return Ok(MoveOutcome {
                new_tail,
                play_again: true,
                train_opened: None,
                game_ended: None,
            });
        }

        self.advance_turn();
        let deadlock = self.check_deadlock();
        Ok(MoveOutcome {
            new_tail,
            play_again: false,
            train_opened: None,
            game_ended: deadlock,
        })
    }

    /// Draws a tile from the boneyard for `player`. Succeeds even when the
    /// boneyard is empty: an empty boneyard is a success outcome, not an
    /// error.
    pub fn draw(&mut self, player: Position) -> Result<DrawOutcome, RulesError> {
        if self.is_ended() {
            return Err(RulesError::GameAlreadyEnded);
        }
        if player != self.turn {
            return Err(RulesError::NotYourTurn);
        }
        if !self.legal_moves(player).is_empty() {
            return Err(RulesError::MustPlayNotDraw);
        }

        match self.boneyard.draw() {
            None => {
                let opened = self.open_current_players_train();
                self.advance_turn();
                let deadlock = self.check_deadlock();
                Ok(DrawOutcome {
                    tile: None,
                    turn_passed: true,
                    can_play_drawn: false,
                    train_opened: Some(opened),
                    game_ended: deadlock,
                })
            }
            Some(tile) => {
                self.hands[player].push(tile);
                if self.tile_has_legal_destination(player, &tile) {
                    Ok(DrawOutcome {
                        tile: Some(tile),
                        turn_passed: false,
                        can_play_drawn: true,
                        train_opened: None,
                        game_ended: None,
                    })
                } else {
                    let opened = self.open_current_players_train();
                    self.advance_turn();
                    let deadlock = self.check_deadlock();
                    Ok(DrawOutcome {
                        tile: Some(tile),
                        turn_passed: true,
                        can_play_drawn: false,
                        train_opened: Some(opened),
                        game_ended: deadlock,
                    })
                }
            }
        }
    }

    /// Unconditionally ends `player`'s turn without a play, bypassing the
    /// must-play-not-draw check that [`Game::draw`] enforces. Used to
    /// recover from a stuck AI or an operator's forced turn-advance —
    /// in both cases the caller is giving up on this
    /// player's turn regardless of whether a legal move existed, which
    /// `draw` alone cannot express. Opens `player`'s personal train exactly
    /// as a forced-open draw would.
    pub fn force_pass(&mut self, player: Position) -> Result<Option<GameResult>, RulesError> {
        if self.is_ended() {
            return Err(RulesError::GameAlreadyEnded);
        }
        if player != self.turn {
            return Err(RulesError::NotYourTurn);
        }
        self.open_current_players_train();
        self.advance_turn();
        Ok(self.check_deadlock())
    }

    fn open_current_players_train(&mut self) -> TrainKind {
        let dest = TrainKind::Personal(self.turn);
        self.train_mut(dest).open();
        dest
    }

    fn advance_turn(&mut self) {
        self.turn = (self.turn + 1) % self.hands.len();
        self.played_double_this_turn = false;
    }

    /// Ends the game with `player` emptying their hand: every other hand's
    /// pip total is charged against its holder, the winner scores 0.
    fn finish_with_winner(&self, player: Position) -> GameResult {
        let scores = self
            .hands
            .iter()
            .enumerate()
            .map(|(pos, hand)| if pos == player { 0 } else { hand.pip_total() as Score })
            .collect();
        GameResult {
            winner: player,
            scores,
            deadlocked: false,
        }
    }

    /// Checks whether the game has deadlocked: boneyard empty, nobody has a
    /// legal move, and (by construction of `legal_moves`) no unsatisfied
    /// double can be resolved by any hand either. If so, ends the game with
    /// the minimum-remaining-pips player as winner.
    fn check_deadlock(&mut self) -> Option<GameResult> {
        if !self.boneyard.is_empty() {
            return None;
        }
        let stuck = (0..self.hands.len()).all(|p| self.legal_moves(p).is_empty());
        if !stuck {
            return None;
        }
        let winner = (0..self.hands.len())
            .min_by_key(|&p| self.hands[p].pip_total())
            .expect("at least one seated player");
        let scores = self.hands.iter().map(|h| h.pip_total() as Score).collect();
        let result = GameResult {
            winner,
            scores,
            deadlocked: true,
        };
        self.phase = GamePhase::Ended(result.clone());
        Some(result)
    }

    /// Invariant check: every tile appears exactly once across
    /// hands, trains, boneyard, and the consumed engine tile.
    #[cfg(test)]
    fn tile_conservation_holds(&self) -> bool {
        let expected = TileSet::count(self.max_pip);
        let mut seen = std::collections::HashSet::new();
        for hand in &self.hands {
            for tile in hand.tiles() {
                if !seen.insert(tile.id()) {
                    return false;
                }
            }
        }
        for train in self.personal_trains.iter().chain(std::iter::once(&self.mexican_train)) {
            for placed in train.tiles() {
                if !seen.insert(placed.tile.id()) {
                    return false;
                }
            }
        }
        for tile in self.boneyard.tiles() {
            if !seen.insert(tile.id()) {
                return false;
            }
        }
        // the engine tile (real or synthesized) accounts for the one tile
        // missing from `seen` relative to the full set, when it was a real
        // dealt tile consumed at setup.
        seen.len() == expected || seen.len() == expected - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mex_domino::TileId;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    #[test]
    fn deal_produces_conserved_tiles() {
        let game = Game::deal(4, 12, &mut rng());
        assert!(game.tile_conservation_holds());
    }

    #[test]
    fn hand_sizes_follow_player_count() {
        assert_eq!(Game::hand_size(2), 16);
        assert_eq!(Game::hand_size(4), 15);
        assert_eq!(Game::hand_size(6), 12);
        assert_eq!(Game::hand_size(8), 10);
    }

    /// Engine selection by highest double.
    #[test]
    fn starter_selected_by_highest_double() {
        let mut hands = vec![
            Hand::new(vec![Tile::new(TileId(0), 9, 9), Tile::new(TileId(1), 3, 12)]),
            Hand::new(vec![Tile::new(TileId(2), 11, 11), Tile::new(TileId(3), 6, 6)]),
        ];
        let (starter, engine_pip) = Game::select_starter(&mut hands);
        assert_eq!(starter, 1);
        assert_eq!(engine_pip, 11);
        assert!(!hands[1].contains(TileId(2)));
        assert_eq!(hands[1].len(), 1);
    }

    #[test]
    fn starter_falls_back_to_highest_value_with_no_doubles() {
        let mut hands = vec![
            Hand::new(vec![Tile::new(TileId(0), 4, 12)]),
            Hand::new(vec![Tile::new(TileId(1), 2, 3)]),
        ];
        let (starter, engine_pip) = Game::select_starter(&mut hands);
        assert_eq!(starter, 0);
        assert_eq!(engine_pip, 12);
    }

    /// Forced opening on an empty boneyard.
    #[test]
    fn draw_on_empty_boneyard_passes_and_opens_train() {
        let mut game = Game::deal(2, 12, &mut rng());
        // Drain the boneyard and force a hand that cannot match the head.
        while game.boneyard.draw().is_some() {}
        let current = game.turn();
        game.hands[current] = Hand::new(vec![Tile::new(TileId(900), 5, 6)]);
        // pick a head the lone tile cannot match
        let foreign_head = if game.engine_pip == 0 { 1 } else { 0 };
        game.mexican_train = Train::new(TrainKind::Mexican);
        game.personal_trains[current] = Train::new(TrainKind::Personal(current));
        game.personal_trains[current].place(Tile::new(TileId(901), foreign_head, 7), foreign_head);
        // hack engine_pip so current hand genuinely cannot match anywhere
        game.engine_pip = foreign_head;
        let outcome = game.draw(current).expect("draw succeeds on empty boneyard");
        assert!(outcome.turn_passed);
        assert_eq!(outcome.train_opened, Some(TrainKind::Personal(current)));
        assert!(game.train(TrainKind::Personal(current)).is_open());
    }

    /// A double obligation restricts enumeration.
    #[test]
    fn double_restricts_subsequent_moves_to_its_train() {
        let mut game = Game::deal(2, 6, &mut rng());
        let player = game.turn();
        game.hands[player] = Hand::new(vec![Tile::new(TileId(950), 6, 6), Tile::new(TileId(951), 1, 2)]);
        game.engine_pip = 6;
        let outcome = game
            .make_move(player, TileId(950), TrainKind::Personal(player))
            .expect("double is legal on own train");
        assert!(outcome.play_again);
        assert_eq!(game.unsatisfied_doubles(), &[TrainKind::Personal(player)]);
        let moves = game.legal_moves(player);
        assert!(moves.iter().all(|m| m.destination == TrainKind::Personal(player)));
    }

    /// A drawn tile may be played same-turn.
    #[test]
    fn drawn_tile_can_be_played_same_turn_when_legal() {
        let mut game = Game::deal(2, 12, &mut rng());
        let player = game.turn();
        let head = game.engine_pip();
        game.hands[player] = Hand::new(vec![]);
        let matching = head.min(11);
        let other = if matching == 0 { 1 } else { 0 };
        game.boneyard = Boneyard::new(vec![Tile::new(TileId(980), head, other)]);
        let outcome = game.draw(player).expect("draw succeeds");
        assert!(outcome.can_play_drawn);
        assert!(!outcome.turn_passed);
    }

    #[test]
    fn empty_hand_wins_even_with_outstanding_double() {
        let mut game = Game::deal(2, 6, &mut rng());
        let player = game.turn();
        game.engine_pip = 6;
        game.hands[player] = Hand::new(vec![Tile::new(TileId(970), 6, 6)]);
        let outcome = game
            .make_move(player, TileId(970), TrainKind::Personal(player))
            .unwrap();
        assert!(outcome.game_ended.is_some());
        assert_eq!(outcome.game_ended.unwrap().winner, player);
    }

    #[test]
    fn not_your_turn_is_rejected() {
        let mut game = Game::deal(3, 12, &mut rng());
        let not_current = (game.turn() + 1) % game.seats();
        let tile_id = game.hand(not_current).tiles()[0].id();
        let err = game
            .make_move(not_current, tile_id, TrainKind::Personal(not_current))
            .unwrap_err();
        assert_eq!(err, RulesError::NotYourTurn);
    }

    #[test]
    fn must_play_not_draw_when_a_legal_move_exists() {
        let mut game = Game::deal(2, 12, &mut rng());
        let player = game.turn();
        let head = game.engine_pip();
        game.hands[player] = Hand::new(vec![Tile::new(TileId(990), head, 0)]);
        let err = game.draw(player).unwrap_err();
        assert_eq!(err, RulesError::MustPlayNotDraw);
    }

    /// A force-advance (AI timeout or admin recovery) must pass the turn
    /// even when the stuck player actually had a legal move available —
    /// `draw` alone would reject that with `must_play_not_draw`.
    #[test]
    fn force_pass_advances_the_turn_even_with_a_legal_move() {
        let mut game = Game::deal(2, 12, &mut rng());
        let player = game.turn();
        let head = game.engine_pip();
        game.hands[player] = Hand::new(vec![Tile::new(TileId(991), head, 0)]);
        assert!(!game.legal_moves(player).is_empty());
        game.force_pass(player).expect("force pass always succeeds for the current player");
        assert_ne!(game.turn(), player);
        assert!(game.train(TrainKind::Personal(player)).is_open());
    }

    #[test]
    fn force_pass_rejects_a_non_current_player() {
        let mut game = Game::deal(3, 12, &mut rng());
        let not_current = (game.turn() + 1) % game.seats();
        let err = game.force_pass(not_current).unwrap_err();
        assert_eq!(err, RulesError::NotYourTurn);
    }
}
