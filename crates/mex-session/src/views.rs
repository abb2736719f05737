use crate::message::{
    GameResultView, GameStateView, HandView, LegalMoveView, MatchStateView, PlacedTileView, SeatView, TileView,
    TrainView,
};
use mex_core::Position;
use mex_match::{Match, Role};
use mex_rules::{Game, LegalMove};

/// Builds the personalized match snapshot sent to `viewer` (or a spectator,
/// if `viewer` is `None`) — the `match_state` message.
pub fn build_match_state_view(
    mtch: &Match,
    connected_seats: &std::collections::HashSet<Position>,
    spectator_count: usize,
) -> MatchStateView {
    let seats = mtch
        .seats
        .iter()
        .enumerate()
        .map(|(pos, seat)| SeatView {
            seat: pos,
            id: seat.id,
            display_name: seat.display_name.clone(),
            is_ai: matches!(seat.role, Role::Ai { .. }),
            connected: connected_seats.contains(&pos),
        })
        .collect();

    MatchStateView {
        match_id: mtch.id,
        name: mtch.name.clone(),
        host: mtch.host,
        status: match mtch.status {
            mex_match::MatchStatus::Waiting => "waiting".to_string(),
            mex_match::MatchStatus::InProgress => "in_progress".to_string(),
            mex_match::MatchStatus::Completed => "completed".to_string(),
        },
        seats,
        games_to_play: mtch.config.games_to_play,
        games_played: mtch.games_played(),
        cumulative_scores: mtch.cumulative_scores().to_vec(),
        spectator_count,
    }
}

/// Builds the personalized game snapshot sent to `viewer`: `viewer`'s own
/// hand is shown in full, every other hand only as a tile count, and
/// spectators (`viewer = None`) see no tile contents at all.
pub fn build_game_state_view(game: &Game, viewer: Option<Position>) -> GameStateView {
    let hands = (0..game.seats())
        .map(|seat| {
            let hand = game.hand(seat);
            let tiles = if Some(seat) == viewer {
                Some(hand.tiles().iter().map(TileView::from).collect())
            } else {
                None
            };
            HandView {
                seat,
                count: hand.len(),
                tiles,
            }
        })
        .collect();

    let mut trains: Vec<TrainView> = (0..game.seats())
        .map(|seat| build_train_view(game, mex_domino::TrainKind::Personal(seat)))
        .collect();
    trains.push(build_train_view(game, mex_domino::TrainKind::Mexican));

    GameStateView {
        max_pip: game.max_pip(),
        engine_pip: game.engine_pip(),
        turn: game.turn(),
        boneyard_size: game.boneyard_len(),
        hands,
        trains,
        unsatisfied_doubles: game.unsatisfied_doubles().iter().map(|&k| k.into()).collect(),
        played_double_this_turn: game.played_double_this_turn(),
        ended: game.result().map(|r| GameResultView {
            winner: r.winner,
            scores: r.scores.clone(),
            deadlocked: r.deadlocked,
        }),
    }
}

fn build_train_view(game: &Game, kind: mex_domino::TrainKind) -> TrainView {
    let train = game.train(kind);
    let tiles = train
        .tiles()
        .iter()
        .map(|placed| PlacedTileView {
            tile: TileView::from(&placed.tile),
            head: placed.head,
            tail: placed.tail,
        })
        .collect();
    TrainView {
        kind: kind.into(),
        tiles,
        open: train.is_open(),
        unsatisfied_double: train.has_unsatisfied_double(),
        head_value: train.head_value(game.engine_pip()),
    }
}

pub fn build_legal_move_views(moves: &[LegalMove], game: &Game, player: Position) -> Vec<LegalMoveView> {
    let hand = game.hand(player);
    moves
        .iter()
        .filter_map(|m| {
            hand.get(m.tile_id).map(|tile| LegalMoveView {
                tile: TileView::from(tile),
                destination: m.destination.into(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mex_core::DEFAULT_MAX_PIP;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn game_state_view_hides_other_hands() {
        let mut rng = SmallRng::seed_from_u64(1);
        let game = Game::deal(3, DEFAULT_MAX_PIP, &mut rng);
        let view = build_game_state_view(&game, Some(0));
        assert!(view.hands[0].tiles.is_some());
        assert!(view.hands[1].tiles.is_none());
        assert!(view.hands[2].tiles.is_none());
    }

    #[test]
    fn spectator_view_hides_every_hand() {
        let mut rng = SmallRng::seed_from_u64(2);
        let game = Game::deal(2, DEFAULT_MAX_PIP, &mut rng);
        let view = build_game_state_view(&game, None);
        assert!(view.hands.iter().all(|h| h.tiles.is_none()));
    }

    #[test]
    fn train_view_includes_mexican_and_every_personal_train() {
        let mut rng = SmallRng::seed_from_u64(3);
        let game = Game::deal(4, DEFAULT_MAX_PIP, &mut rng);
        let view = build_game_state_view(&game, None);
        assert_eq!(view.trains.len(), 5);
    }
}
