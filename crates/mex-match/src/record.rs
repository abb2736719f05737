use mex_core::{Position, Score};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Statistics captured when one [`crate::Match`]'s game reaches termination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_number: usize,
    pub engine_pip: mex_core::Pip,
    pub winner: Position,
    pub deadlocked: bool,
    pub per_player_scores: Vec<Score>,
    pub duration: Duration,
    pub longest_held_hand: usize,
    pub total_pips_remaining: Score,
}

impl GameRecord {
    pub fn new(
        game_number: usize,
        engine_pip: mex_core::Pip,
        result: &mex_rules::GameResult,
        duration: Duration,
        hand_sizes_during_game: &[usize],
    ) -> Self {
        let total_pips_remaining = result.scores.iter().sum();
        let longest_held_hand = hand_sizes_during_game.iter().copied().max().unwrap_or(0);
        Self {
            game_number,
            engine_pip,
            winner: result.winner,
            deadlocked: result.deadlocked,
            per_player_scores: result.scores.clone(),
            duration,
            longest_held_hand,
            total_pips_remaining,
        }
    }
}

/// A single named accomplishment derived from extrema across a match's
/// completed games, surfaced in the match completion record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    pub name: String,
    pub description: String,
    pub seat: Position,
}

/// Scans completed game records for notable extrema and names them.
/// Conservative by design: an achievement is only awarded when its
/// underlying extremum is unambiguous (a sole maximum/minimum holder).
pub fn derive_achievements(records: &[GameRecord], seats: usize) -> Vec<Achievement> {
    let mut achievements = Vec::new();

    if let Some(fastest) = records.iter().min_by_key(|r| r.duration) {
        achievements.push(Achievement {
            name: "quick_draw".to_string(),
            description: "won the fastest game of the match".to_string(),
            seat: fastest.winner,
        });
    }

    if let Some(biggest_pile) = records.iter().max_by_key(|r| r.total_pips_remaining) {
        if biggest_pile.total_pips_remaining > 0 {
            let loser = (0..seats)
                .filter(|&p| p != biggest_pile.winner)
                .max_by_key(|&p| biggest_pile.per_player_scores.get(p).copied().unwrap_or(0));
            if let Some(seat) = loser {
                achievements.push(Achievement {
                    name: "heavy_load".to_string(),
                    description: "finished a game holding the most pips of anyone all match".to_string(),
                    seat,
                });
            }
        }
    }

    let mut win_counts = vec![0u32; seats];
    for record in records {
        win_counts[record.winner] += 1;
    }
    if let Some((seat, _)) = win_counts
        .iter()
        .enumerate()
        .max_by_key(|&(_, &count)| count)
        .filter(|&(_, &count)| count > 1 && win_counts.iter().filter(|&&c| c == count).count() == 1)
    {
        achievements.push(Achievement {
            name: "locomotive".to_string(),
            description: "won more games than anyone else in the match".to_string(),
            seat,
        });
    }

    achievements
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(game_number: usize, winner: Position, duration_secs: u64, scores: Vec<Score>) -> GameRecord {
        GameRecord {
            game_number,
            engine_pip: 12,
            winner,
            deadlocked: false,
            total_pips_remaining: scores.iter().sum(),
            per_player_scores: scores,
            duration: Duration::from_secs(duration_secs),
            longest_held_hand: 5,
        }
    }

    #[test]
    fn locomotive_awarded_to_sole_leading_winner() {
        let records = vec![
            record(1, 0, 30, vec![0, 10]),
            record(2, 0, 40, vec![0, 14]),
            record(3, 1, 20, vec![8, 0]),
        ];
        let achievements = derive_achievements(&records, 2);
        assert!(achievements.iter().any(|a| a.name == "locomotive" && a.seat == 0));
    }

    #[test]
    fn no_locomotive_when_win_counts_tie() {
        let records = vec![record(1, 0, 30, vec![0, 10]), record(2, 1, 20, vec![8, 0])];
        let achievements = derive_achievements(&records, 2);
        assert!(!achievements.iter().any(|a| a.name == "locomotive"));
    }
}
