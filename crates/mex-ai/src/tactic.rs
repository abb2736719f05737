use mex_domino::TrainKind;
use mex_rules::{Game, LegalMove};
use serde::{Deserialize, Serialize};

/// One named, pure scoring contribution. Given the legal moves available to
/// an AI-seated player and the game they sit in, each tactic adds to every
/// candidate move's accumulated score; it never removes a move from
/// consideration and never mutates the game.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TacticKind {
    Random,
    MaximizePips,
    MinimizePips,
    PreferOwnTrain,
    PreferMexicanTrain,
    PreferOpenTrains,
    BlockOpponents,
    PreserveDoubles,
    DumpDoubles,
    EndgameAwareness,
    HandComposition,
    ChainLength,
}

impl TacticKind {
    /// Parses a tactic id from configuration text; `None` for an unknown name
    /// (the caller logs a warning and skips it, per the failure policy).
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "random" => Self::Random,
            "maximize_pips" => Self::MaximizePips,
            "minimize_pips" => Self::MinimizePips,
            "prefer_own_train" => Self::PreferOwnTrain,
            "prefer_mexican_train" => Self::PreferMexicanTrain,
            "prefer_open_trains" => Self::PreferOpenTrains,
            "block_opponents" => Self::BlockOpponents,
            "preserve_doubles" => Self::PreserveDoubles,
            "dump_doubles" => Self::DumpDoubles,
            "endgame_awareness" => Self::EndgameAwareness,
            "hand_composition" => Self::HandComposition,
            "chain_length" => Self::ChainLength,
            _ => return None,
        })
    }

    /// Adds this tactic's contribution to every entry of `scores`, one per
    /// move in `moves` (same order, same length).
    pub fn score<R: rand::Rng>(
        self,
        game: &Game,
        player: mex_core::Position,
        moves: &[LegalMove],
        weight: f64,
        scores: &mut [f64],
        rng: &mut R,
    ) {
        debug_assert_eq!(moves.len(), scores.len());
        match self {
            Self::Random => {
                for score in scores.iter_mut() {
                    *score += weight * rng.random::<f64>();
                }
            }
            Self::MaximizePips => {
                let max_value = moves
                    .iter()
                    .map(|m| tile_of(game, player, m).value())
                    .fold(0u32, u32::max);
                if max_value > 0 {
                    for (m, score) in moves.iter().zip(scores.iter_mut()) {
                        let value = tile_of(game, player, m).value();
                        *score += weight * (value as f64 / max_value as f64);
                    }
                }
            }
            Self::MinimizePips => {
                let max_value = moves
                    .iter()
                    .map(|m| tile_of(game, player, m).value())
                    .fold(0u32, u32::max);
                if max_value > 0 {
                    for (m, score) in moves.iter().zip(scores.iter_mut()) {
                        let value = tile_of(game, player, m).value();
                        *score += weight * ((max_value - value) as f64 / max_value as f64);
                    }
                }
            }
            Self::PreferOwnTrain => {
                for (m, score) in moves.iter().zip(scores.iter_mut()) {
                    if m.destination == TrainKind::Personal(player) {
                        *score += weight;
                    }
                }
            }
            Self::PreferMexicanTrain => {
                for (m, score) in moves.iter().zip(scores.iter_mut()) {
                    if m.destination == TrainKind::Mexican {
                        *score += weight;
                    }
                }
            }
            Self::PreferOpenTrains => {
                for (m, score) in moves.iter().zip(scores.iter_mut()) {
                    let is_other_open = match m.destination {
                        TrainKind::Personal(p) => p != player && game.train(m.destination).is_open(),
                        TrainKind::Mexican => false,
                    };
                    if is_other_open {
                        *score += weight;
                    }
                }
            }
            Self::BlockOpponents => {
                for (m, score) in moves.iter().zip(scores.iter_mut()) {
                    let exposed = exposed_tail_after(game, player, m);
                    let mut k = 0u32;
                    for opponent in 0..game.seats() {
                        if opponent == player {
                            continue;
                        }
                        k += game.hand(opponent).tiles().iter().filter(|t| t.touches(exposed)).count() as u32;
                    }
                    *score += weight / (1.0 + k as f64);
                }
            }
            Self::PreserveDoubles => {
                for (m, score) in moves.iter().zip(scores.iter_mut()) {
                    if tile_of(game, player, m).is_double() {
                        *score -= weight;
                    }
                }
            }
            Self::DumpDoubles => {
                for (m, score) in moves.iter().zip(scores.iter_mut()) {
                    if tile_of(game, player, m).is_double() {
                        *score += weight;
                    }
                }
            }
            Self::EndgameAwareness => {
                let total_remaining: usize = (0..game.seats()).map(|p| game.hand(p).len()).sum();
                if total_remaining <= 8 {
                    let max_value = moves
                        .iter()
                        .map(|m| tile_of(game, player, m).value())
                        .fold(0u32, u32::max);
                    if max_value > 0 {
                        for (m, score) in moves.iter().zip(scores.iter_mut()) {
                            let value = tile_of(game, player, m).value();
                            *score += weight * (value as f64 / max_value as f64);
                        }
                    }
                }
            }
            Self::HandComposition => {
                let hand = game.hand(player);
                if hand.is_empty() {
                    return;
                }
                let mut counts = std::collections::HashMap::new();
                for tile in hand.tiles() {
                    *counts.entry(tile.low()).or_insert(0u32) += 1;
                    *counts.entry(tile.high()).or_insert(0u32) += 1;
                }
                for (m, score) in moves.iter().zip(scores.iter_mut()) {
                    let exposed = exposed_tail_after(game, player, m);
                    let composition = *counts.get(&exposed).unwrap_or(&0) as f64 * 0.5;
                    *score += composition * weight;
                }
            }
            Self::ChainLength => {
                let hand = game.hand(player);
                if hand.is_empty() {
                    return;
                }
                let chain_lengths: Vec<u32> = moves
                    .iter()
                    .map(|m| {
                        let exposed = exposed_tail_after(game, player, m);
                        let remaining: Vec<_> = hand
                            .tiles()
                            .iter()
                            .filter(|t| t.id() != m.tile_id)
                            .copied()
                            .collect();
                        chain_length_from(&remaining, exposed, 0)
                    })
                    .collect();
                let max_chain = chain_lengths.iter().copied().max().unwrap_or(0);
                if max_chain > 0 {
                    for (length, score) in chain_lengths.iter().zip(scores.iter_mut()) {
                        *score += weight * (*length as f64 / max_chain as f64);
                    }
                }
            }
        }
    }
}

fn tile_of(game: &Game, player: mex_core::Position, m: &LegalMove) -> mex_domino::Tile {
    *game
        .hand(player)
        .get(m.tile_id)
        .expect("a legal move always names a tile currently in the acting player's hand")
}

/// The pip value exposed at `m.destination`'s tail, were this move taken.
fn exposed_tail_after(game: &Game, player: mex_core::Position, m: &LegalMove) -> mex_core::Pip {
    let tile = tile_of(game, player, m);
    let head = game.train(m.destination).head_value(game.engine_pip());
    tile.other_end(head).unwrap_or(tile.high())
}

/// Bounded recursive search: the longest sequence of plays reachable from
/// `hand` if the train's exposed tail is currently `from`, making at most
/// one placement per remaining tile. Mirrors a simple longest-path search
/// over a small multigraph, capped by hand size so it always terminates.
fn chain_length_from(hand: &[mex_domino::Tile], from: mex_core::Pip, depth: u32) -> u32 {
    if depth as usize >= hand.len() {
        return 0;
    }
    let mut best = 0;
    for (i, tile) in hand.iter().enumerate() {
        if let Some(next) = tile.other_end(from) {
            let mut remaining = hand.to_vec();
            remaining.remove(i);
            let extended = 1 + chain_length_from(&remaining, next, depth + 1);
            best = best.max(extended);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use mex_core::DEFAULT_MAX_PIP;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    #[test]
    fn unknown_tactic_name_parses_to_none() {
        assert_eq!(TacticKind::parse("not_a_real_tactic"), None);
        assert_eq!(TacticKind::parse("random"), Some(TacticKind::Random));
    }

    #[test]
    fn prefer_own_train_rewards_only_own_destination() {
        let game = Game::deal(3, DEFAULT_MAX_PIP, &mut rng());
        let player = game.turn();
        let moves = game.legal_moves(player);
        if moves.is_empty() {
            return;
        }
        let mut scores = vec![0.0; moves.len()];
        TacticKind::PreferOwnTrain.score(&game, player, &moves, 2.0, &mut scores, &mut rng());
        for (m, score) in moves.iter().zip(scores.iter()) {
            if m.destination == TrainKind::Personal(player) {
                assert_eq!(*score, 2.0);
            } else {
                assert_eq!(*score, 0.0);
            }
        }
    }

    #[test]
    fn preserve_and_dump_doubles_are_opposite_signed() {
        let game = Game::deal(2, DEFAULT_MAX_PIP, &mut rng());
        let player = game.turn();
        let moves = game.legal_moves(player);
        if moves.is_empty() {
            return;
        }
        let mut preserve = vec![0.0; moves.len()];
        let mut dump = vec![0.0; moves.len()];
        TacticKind::PreserveDoubles.score(&game, player, &moves, 1.0, &mut preserve, &mut rng());
        TacticKind::DumpDoubles.score(&game, player, &moves, 1.0, &mut dump, &mut rng());
        for (p, d) in preserve.iter().zip(dump.iter()) {
            assert_eq!(*p, -*d);
        }
    }

    #[test]
    fn chain_length_of_single_tile_hand_is_zero() {
        let mut game = Game::deal(2, 6, &mut rng());
        let player = game.turn();
        let moves = game.legal_moves(player);
        if moves.is_empty() {
            return;
        }
        let mut scores = vec![0.0; moves.len()];
        TacticKind::ChainLength.score(&game, player, &moves, 1.0, &mut scores, &mut rng());
        // with at least two tiles in hand this is exercised meaningfully
        // elsewhere; here we only assert it never panics and stays finite.
        for s in scores {
            assert!(s.is_finite());
            let _ = &mut game;
        }
    }
}
