use crate::tactic::TacticKind;
use mex_core::Position;
use mex_rules::{Game, LegalMove};
use serde::{Deserialize, Serialize};

/// One `(tactic, weight, priority)` entry within a [`Strategy`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedTactic {
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub priority: i32,
}

fn default_weight() -> f64 {
    1.0
}

/// A named, ordered combination of tactics: an AI player's policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub tactics: Vec<WeightedTactic>,
}

impl Strategy {
    /// A fallback strategy with no configuration behind it: uniform random
    /// choice among legal moves.
    pub fn uniform_random() -> Self {
        Self {
            name: "uniform_random".to_string(),
            description: "fallback strategy, no tactics configured".to_string(),
            tactics: vec![WeightedTactic {
                name: "random".to_string(),
                weight: 1.0,
                priority: 1,
            }],
        }
    }

    /// Chooses one move from `game`'s current legal moves for `player` by
    /// running every configured tactic in priority order and taking the
    /// highest total score, ties broken by enumeration (insertion) order.
    ///
    /// Returns `None` if `player` has no legal move right now (the caller is
    /// expected to draw instead).
    pub fn choose_move<R: rand::Rng>(&self, game: &Game, player: Position, rng: &mut R) -> Option<LegalMove> {
        let moves = game.legal_moves(player);
        if moves.is_empty() {
            return None;
        }

        let tactics = if self.tactics.is_empty() {
            vec![WeightedTactic {
                name: "random".to_string(),
                weight: 1.0,
                priority: 1,
            }]
        } else {
            self.tactics.clone()
        };

        let mut ordered = tactics;
        ordered.sort_by_key(|t| t.priority);

        let mut scores = vec![0.0f64; moves.len()];
        for entry in &ordered {
            match TacticKind::parse(&entry.name) {
                Some(kind) => kind.score(game, player, &moves, entry.weight, &mut scores, rng),
                None => log::warn!("unknown AI tactic '{}', contributing nothing", entry.name),
            }
        }

        let mut best_index = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (i, score) in scores.iter().enumerate() {
            if *score > best_score {
                best_score = *score;
                best_index = i;
            }
        }
        Some(moves[best_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mex_core::DEFAULT_MAX_PIP;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn empty_tactics_falls_back_to_uniform_random() {
        let strategy = Strategy {
            name: "empty".into(),
            description: String::new(),
            tactics: vec![],
        };
        let mut rng = SmallRng::seed_from_u64(3);
        let game = Game::deal(2, DEFAULT_MAX_PIP, &mut rng);
        let player = game.turn();
        // May legitimately be None if the starter has no legal move, but
        // must never panic.
        let _ = strategy.choose_move(&game, player, &mut rng);
    }

    #[test]
    fn unknown_tactic_is_skipped_not_fatal() {
        let strategy = Strategy {
            name: "broken".into(),
            description: String::new(),
            tactics: vec![WeightedTactic {
                name: "does_not_exist".into(),
                weight: 5.0,
                priority: 1,
            }],
        };
        let mut rng = SmallRng::seed_from_u64(9);
        let game = Game::deal(2, DEFAULT_MAX_PIP, &mut rng);
        let player = game.turn();
        let _ = strategy.choose_move(&game, player, &mut rng);
    }

    #[test]
    fn ties_break_by_first_move_in_enumeration_order() {
        let strategy = Strategy {
            name: "inert".into(),
            description: String::new(),
            tactics: vec![WeightedTactic {
                name: "preserve_doubles".into(),
                weight: 0.0,
                priority: 1,
            }],
        };
        let mut rng = SmallRng::seed_from_u64(11);
        let game = Game::deal(2, DEFAULT_MAX_PIP, &mut rng);
        let player = game.turn();
        let moves = game.legal_moves(player);
        if let Some(chosen) = strategy.choose_move(&game, player, &mut rng) {
            assert_eq!(chosen, moves[0]);
        }
    }
}
