use crate::connection::{Connection, ConnectionRole, ConnectionTable};
use crate::error::SessionError;
use crate::message::{ClientMessage, ServerMessage, TileView};
use crate::views::{build_game_state_view, build_legal_move_views, build_match_state_view};
use mex_ai::AiConfig;
use mex_core::{Position, ID};
use mex_domino::TileId;
use mex_match::{Match, Seat};
use std::sync::Arc;

/// What happened when the scheduler asked a seat's AI to act
/// ([`MatchSession::apply_ai_move`]). Mirrors the branches
/// `trigger_ai_moves` distinguishes in the original game manager: a normal
/// play, a forced draw, or the resulting game ending.
#[derive(Debug)]
pub enum AiTurnOutcome {
    Played { tile: TileId, destination: mex_domino::TrainKind, game_ended: bool },
    Drew { turn_passed: bool },
}

/// One live match: its rules/match state, its connection registry, and the
/// bookkeeping the session manager needs to schedule and cancel AI turns.
///
/// Grounded on `hosting::casino::Casino`'s per-room state plus
/// `gameroom::table::Table`'s connection registry, merged into a single
/// per-match unit since Mexican Train has no betting-room/hand split to
/// warrant keeping them apart.
pub struct MatchSession {
    pub mtch: Match,
    connections: ConnectionTable,
    ai_config: Arc<std::sync::RwLock<AiConfig>>,
    /// Bumped on every accepted mutation. An AI turn scheduled against one
    /// version silently aborts if the version has since changed instead of
    /// needing a cancellation channel.
    version: u64,
    /// True while a background AI-move driver task is actively looping
    /// against this match. Claimed via [`MatchSession::try_claim_ai_driver`]
    /// so a reconnection re-arm and a normal post-move trigger can never
    /// spawn two overlapping driver loops for the same match.
    ai_driver_active: bool,
}

impl MatchSession {
    pub fn new(mtch: Match, ai_config: Arc<std::sync::RwLock<AiConfig>>) -> Self {
        Self { mtch, connections: ConnectionTable::new(), ai_config, version: 0, ai_driver_active: false }
    }

    /// Claims the right to run the AI-move driver loop; returns `false` if
    /// one is already active, in which case the caller must not spawn
    /// another.
    pub fn try_claim_ai_driver(&mut self) -> bool {
        if self.ai_driver_active {
            false
        } else {
            self.ai_driver_active = true;
            true
        }
    }
    /// Releases the driver claim once a loop has finished (turn left AI
    /// control, the match completed, or the safety bound was hit).
    pub fn release_ai_driver(&mut self) {
        self.ai_driver_active = false;
    }

    pub fn version(&self) -> u64 {
        self.version
    }
    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Attaches a newly-opened connection, pending its `join_game` or
    /// `spectate_game` declaration.
    pub fn attach_connection(&mut self, id: ID<Connection>, sender: tokio::sync::mpsc::UnboundedSender<ServerMessage>) {
        self.connections.add(id, sender, ConnectionRole::Pending);
        self.bump();
    }

    /// Removes a closed connection. If it was spectating, broadcasts
    /// `spectator_left` with the updated count so the remaining spectators' presence
    /// view stays accurate. The connection table doesn't retain a
    /// disconnecting spectator's display name, so `spectator_name` is empty
    /// here; the count is the field recipients actually need.
    pub fn detach_connection(&mut self, id: ID<Connection>) -> Option<ConnectionRole> {
        let role = self.connections.remove(id);
        self.bump();
        if role == Some(ConnectionRole::Spectator) {
            let spectator_count = self.connections.spectator_count();
            self.connections
                .send_to_spectators(ServerMessage::SpectatorLeft { spectator_name: String::new(), spectator_count });
        }
        role
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn role_of(&self, id: ID<Connection>) -> Option<ConnectionRole> {
        self.connections.role(id)
    }

    /// Whether `seat` currently has at least one live connection.
    pub fn seat_connected(&self, seat: Position) -> bool {
        self.connections.connected_seats().contains(&seat)
    }

    /// Total live connections (players, spectators, and pending) — used by
    /// the administrative interface.
    pub fn connection_count(&self) -> usize {
        self.connections.connection_count()
    }
    pub fn spectator_count(&self) -> usize {
        self.connections.spectator_count()
    }

    pub fn current_turn_is_ai(&self) -> bool {
        self.mtch
            .current_game()
            .map(|g| self.mtch.is_ai_seat(g.turn()))
            .unwrap_or(false)
    }
    pub fn current_turn_seat(&self) -> Option<Position> {
        self.mtch.current_game().map(|g| g.turn())
    }

    /// Sends `message` to a single connection — used to answer a request
    /// (`valid_moves`, `error`) only to its originator.
    pub fn unicast(&self, id: ID<Connection>, message: ServerMessage) {
        self.connections.unicast(id, message);
    }

    /// Re-sends the current match and (if any) game state to one connection
    /// — used on connect/reconnect.
    pub fn send_full_state(&self, id: ID<Connection>, role: ConnectionRole) {
        let viewer = match role {
            ConnectionRole::Player(seat) => Some(seat),
            ConnectionRole::Spectator | ConnectionRole::Pending => None,
        };
        self.unicast(
            id,
            ServerMessage::MatchState(build_match_state_view(
                &self.mtch,
                &self.connections.connected_seats(),
                self.connections.spectator_count(),
            )),
        );
        if let Some(game) = self.mtch.current_game() {
            self.unicast(id, ServerMessage::GameState(build_game_state_view(game, viewer)));
        }
    }

    fn broadcast_match_state(&self) {
        let view = build_match_state_view(
            &self.mtch,
            &self.connections.connected_seats(),
            self.connections.spectator_count(),
        );
        self.connections.send_to_spectators(ServerMessage::MatchState(view.clone()));
        self.connections.broadcast_per_seat(|_| ServerMessage::MatchState(view.clone()));
    }

    fn broadcast_game_state(&self) {
        if let Some(game) = self.mtch.current_game() {
            self.connections.send_to_spectators(ServerMessage::GameState(build_game_state_view(game, None)));
            self.connections
                .broadcast_per_seat(|seat| ServerMessage::GameState(build_game_state_view(game, Some(seat))));
        }
    }

    /// Dispatches one decoded client message, originating from `origin`.
    /// `origin`'s role is looked up fresh on every call so a mid-flight
    /// disconnect can't be acted on with stale permissions.
    pub fn handle_client_message(&mut self, origin: ID<Connection>, message: ClientMessage) -> Result<(), SessionError> {
        match message {
            ClientMessage::JoinGame { player_name } => self.handle_join(origin, player_name),
            ClientMessage::SpectateGame { spectator_name } => self.handle_spectate(origin, spectator_name),
            ClientMessage::StartGame { force } => {
                let requester = self.seat_id_of(origin)?;
                self.handle_start(requester, force)
            }
            ClientMessage::MakeMove { player_id, tile_id, destination } => self.handle_make_move(origin, player_id, tile_id, destination),
            ClientMessage::DrawDomino { player_id } => self.handle_draw(origin, player_id),
            ClientMessage::GetValidMoves { player_id, tile } => self.handle_get_valid_moves(origin, player_id, tile),
            ClientMessage::GetAllValidMoves { player_id } => self.handle_get_all_valid_moves(origin, player_id),
            ClientMessage::ChatMessage { payload } => self.handle_chat(payload),
        }
    }

    fn seat_id_of(&self, origin: ID<Connection>) -> Result<ID<Seat>, SessionError> {
        match self.connections.role(origin) {
            Some(ConnectionRole::Player(seat)) => self.mtch.seats.get(seat).map(|s| s.id).ok_or(SessionError::SeatNotFound),
            _ => Err(SessionError::SeatNotFound),
        }
    }

    /// Rejects `origin` unless it is the connection actually seated at
    /// `position`: a spectator, an unrelated player, or a not-yet-declared
    /// connection may never act or read as someone else's seat. The rules
    /// engine's own turn check catches the *order* a seat may act in, but
    /// only this catches a connection acting as a seat it does not own at
    /// all — mistaking one for the other is exactly how a hidden hand leaks.
    fn require_origin_owns_seat(&self, origin: ID<Connection>, position: Position) -> Result<(), SessionError> {
        match self.connections.role(origin) {
            Some(ConnectionRole::Player(seat)) if seat == position => Ok(()),
            _ => Err(SessionError::Rules(mex_rules::RulesError::NotYourTurn)),
        }
    }

    fn handle_join(&mut self, origin: ID<Connection>, player_name: String) -> Result<(), SessionError> {
        let seat = self.mtch.join(&player_name)?.clone();
        let position = self.mtch.seat_index(seat.id).expect("just joined");
        self.connections.set_role(origin, ConnectionRole::Player(position));
        self.bump();
        self.connections.broadcast_per_seat(|_| ServerMessage::PlayerJoined {
            seat: crate::message::SeatView {
                seat: position,
                id: seat.id,
                display_name: seat.display_name.clone(),
                is_ai: false,
                connected: true,
            },
        });
        self.broadcast_match_state();
        // A player rejoining a match already in progress must also receive
        // the current game snapshot, not just the match snapshot.
        if self.mtch.current_game().is_some() {
            self.broadcast_game_state();
        }
        Ok(())
    }

    fn handle_spectate(&mut self, origin: ID<Connection>, spectator_name: String) -> Result<(), SessionError> {
        if !self.mtch.config.spectators_allowed {
            return Err(SessionError::SpectatorsNotAllowed);
        }
        self.connections.set_role(origin, ConnectionRole::Spectator);
        self.bump();
        let spectator_count = self.connections.spectator_count();
        self.connections
            .send_to_spectators(ServerMessage::SpectatorJoined { spectator_name: spectator_name.clone(), spectator_count });
        self.broadcast_match_state();
        if self.mtch.current_game().is_some() {
            self.broadcast_game_state();
        }
        Ok(())
    }

    fn handle_start(&mut self, requester: ID<Seat>, force: bool) -> Result<(), SessionError> {
        let strategies: Vec<String> = {
            let config = self.ai_config.read().expect("ai config lock poisoned");
            config.list_strategies().into_iter().map(str::to_string).collect()
        };
        self.mtch.start(requester, force, &strategies, &mut rand::rng())?;
        self.bump();
        self.connections.broadcast_per_seat(|_| ServerMessage::GameStarted);
        self.connections.send_to_spectators(ServerMessage::GameStarted);
        self.broadcast_match_state();
        self.broadcast_game_state();
        Ok(())
    }

    /// Starts the match exactly as the countdown scheduler does: same seating
    /// check as [`Match::auto_start`], `game_auto_started`
    /// in place of `game_started`.
    pub fn auto_start(&mut self) -> Result<(), SessionError> {
        self.mtch.auto_start(&mut rand::rng())?;
        self.bump();
        self.connections.broadcast_per_seat(|_| ServerMessage::GameAutoStarted);
        self.connections.send_to_spectators(ServerMessage::GameAutoStarted);
        self.broadcast_match_state();
        self.broadcast_game_state();
        Ok(())
    }

    /// Broadcasts a countdown tick (`countdown_update`).
    pub fn broadcast_countdown(&self, minutes_remaining: u64, seconds_remaining: u64, can_auto_start: bool, message: Option<String>) {
        let wire = ServerMessage::CountdownUpdate { minutes_remaining, seconds_remaining, can_auto_start, message };
        self.connections.broadcast_per_seat(|_| wire.clone());
        self.connections.send_to_spectators(wire);
    }

    /// Broadcasts that the match is being deleted (countdown expiry with too
    /// few players, or an administrative force-terminate) before the caller
    /// removes it from the session registry.
    pub fn broadcast_deleted(&self, reason: &str) {
        let wire = ServerMessage::GameDeleted { reason: reason.to_string(), redirect_to_lobby: true };
        self.connections.broadcast_per_seat(|_| wire.clone());
        self.connections.send_to_spectators(wire);
    }

    fn handle_make_move(
        &mut self,
        origin: ID<Connection>,
        player_id: ID<Seat>,
        tile_id: TileId,
        destination: mex_domino::TrainKind,
    ) -> Result<(), SessionError> {
        let position = self.mtch.seat_index(player_id).ok_or(SessionError::SeatNotFound)?;
        self.require_origin_owns_seat(origin, position)?;
        let game = self.mtch.current_game_mut().ok_or(SessionError::MatchNotInProgress)?;
        let outcome = game.make_move(position, tile_id, destination)?;
        self.mtch.sample_hand_sizes();
        self.bump();

        self.connections.send_to_seat(
            position,
            ServerMessage::MoveResult { success: true, play_again: outcome.play_again, new_tail: Some(outcome.new_tail) },
        );
        self.broadcast_game_state();

        if let Some(result) = outcome.game_ended {
            self.finish_game(result);
        }
        Ok(())
    }

    fn handle_draw(&mut self, origin: ID<Connection>, player_id: ID<Seat>) -> Result<(), SessionError> {
        let position = self.mtch.seat_index(player_id).ok_or(SessionError::SeatNotFound)?;
        self.require_origin_owns_seat(origin, position)?;
        let game = self.mtch.current_game_mut().ok_or(SessionError::MatchNotInProgress)?;
        let outcome = game.draw(position)?;
        self.bump();

        self.connections.send_to_seat(
            position,
            ServerMessage::DrawResult { turn_passed: outcome.turn_passed, can_play_drawn: outcome.can_play_drawn },
        );
        self.broadcast_game_state();

        if let Some(result) = outcome.game_ended {
            self.finish_game(result);
        }
        Ok(())
    }

    fn handle_get_valid_moves(&self, origin: ID<Connection>, player_id: ID<Seat>, tile: Option<TileId>) -> Result<(), SessionError> {
        let position = self.mtch.seat_index(player_id).ok_or(SessionError::SeatNotFound)?;
        self.require_origin_owns_seat(origin, position)?;
        let game = self.mtch.current_game().ok_or(SessionError::MatchNotInProgress)?;
        let mut moves = game.legal_moves(position);
        if let Some(tile_id) = tile {
            moves.retain(|m| m.tile_id == tile_id);
        }
        let views = build_legal_move_views(&moves, game, position);
        self.unicast(origin, ServerMessage::ValidMoves { moves: views });
        Ok(())
    }

    fn handle_get_all_valid_moves(&self, origin: ID<Connection>, player_id: ID<Seat>) -> Result<(), SessionError> {
        let position = self.mtch.seat_index(player_id).ok_or(SessionError::SeatNotFound)?;
        self.require_origin_owns_seat(origin, position)?;
        let game = self.mtch.current_game().ok_or(SessionError::MatchNotInProgress)?;
        let moves = game.legal_moves(position);
        let can_play = !moves.is_empty();
        let views = build_legal_move_views(&moves, game, position);
        self.unicast(
            origin,
            ServerMessage::AllValidMoves { moves: views, can_play, must_draw: !can_play },
        );
        Ok(())
    }

    fn handle_chat(&self, payload: serde_json::Value) -> Result<(), SessionError> {
        self.connections.broadcast_per_seat(|_| ServerMessage::ChatMessage { payload: payload.clone() });
        self.connections.send_to_spectators(ServerMessage::ChatMessage { payload });
        Ok(())
    }

    fn finish_game(&mut self, result: mex_rules::GameResult) {
        self.connections.broadcast_per_seat(|_| ServerMessage::GameEnded {
            winner: result.winner,
            scores: result.scores.clone(),
            deadlocked: result.deadlocked,
        });
        self.connections.send_to_spectators(ServerMessage::GameEnded {
            winner: result.winner,
            scores: result.scores.clone(),
            deadlocked: result.deadlocked,
        });

        if let Some(completion) = self.mtch.complete_current_game(result, &mut rand::rng()) {
            self.connections.broadcast_per_seat(|_| ServerMessage::MatchEnded {
                winner: completion.winner,
                margin: completion.margin,
                games_won: completion.games_won.clone(),
                achievements: completion.achievements.clone(),
            });
        } else {
            self.broadcast_game_state();
        }
        self.bump();
        self.broadcast_match_state();
    }

    /// Applies one AI turn for the current player. Grounded on
    /// `game_manager.py`'s `_delayed_ai_move`: picks via the seat's
    /// configured strategy, falls back to drawing when no legal move
    /// exists, and reports ended games the same way a human-caused end
    /// does. Callers (the session-level scheduler) are responsible for the
    /// pre-move delay and the version check that makes this safe to call
    /// after an `await`.
    pub fn apply_ai_move(&mut self) -> Result<AiTurnOutcome, SessionError> {
        let position = self.current_turn_seat().ok_or(SessionError::MatchNotInProgress)?;
        let strategy_id = self.mtch.strategy_id_for(position).unwrap_or("sleepy_caboose").to_string();
        let strategy = {
            let config = self.ai_config.read().expect("ai config lock poisoned");
            config.strategy_by_name(&strategy_id).cloned().unwrap_or_else(mex_ai::Strategy::uniform_random)
        };

        let (chosen, tile_view) = {
            let game = self.mtch.current_game().ok_or(SessionError::MatchNotInProgress)?;
            let chosen = strategy.choose_move(game, position, &mut rand::rng());
            let tile_view = chosen.and_then(|m| game.hand(position).get(m.tile_id).map(TileView::from));
            (chosen, tile_view)
        };

        match chosen {
            Some(mv) => {
                let game = self.mtch.current_game_mut().expect("checked above");
                let outcome = game.make_move(position, mv.tile_id, mv.destination)?;
                self.mtch.sample_hand_sizes();
                self.bump();

                if let Some(tile) = tile_view {
                    let message = ServerMessage::AiMove { seat: position, tile, destination: mv.destination.into() };
                    self.connections.broadcast_per_seat(|_| message.clone());
                    self.connections.send_to_spectators(message);
                }
                self.broadcast_game_state();
                let ended = outcome.game_ended.is_some();
                if let Some(result) = outcome.game_ended {
                    self.finish_game(result);
                }
                Ok(AiTurnOutcome::Played { tile: mv.tile_id, destination: mv.destination, game_ended: ended })
            }
            None => {
                let game = self.mtch.current_game_mut().expect("checked above");
                let outcome = game.draw(position)?;
                self.bump();
                self.broadcast_game_state();
                if let Some(result) = outcome.game_ended {
                    self.finish_game(result);
                }
                Ok(AiTurnOutcome::Drew { turn_passed: outcome.turn_passed })
            }
        }
    }

    /// Reports an AI failure (timeout or loop-safety-bound exhaustion) and
    /// forces the current player's turn to end without a play, so the match
    /// can't stall forever on a misbehaving strategy. Uses
    /// [`mex_rules::Game::force_pass`] rather than `draw`, since a plain
    /// draw would be rejected by `must_play_not_draw` if the stuck player
    /// actually had a legal move — exactly the case a broken scoring tactic
    /// can produce.
    pub fn force_advance_after_ai_failure(&mut self, reason: &str) {
        if let Some(position) = self.current_turn_seat() {
            let result = self
                .mtch
                .current_game_mut()
                .and_then(|game| game.force_pass(position).ok())
                .flatten();
            self.bump();
            self.connections.broadcast_per_seat(|_| ServerMessage::AiError { seat: position, reason: reason.to_string() });
            self.broadcast_game_state();
            if let Some(result) = result {
                self.finish_game(result);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ClientMessage;
    use mex_ai::AiConfig;
    use mex_match::{MatchConfig, SeatedPlayer};
    use std::sync::RwLock;

    fn session(min_players: usize, max_players: usize) -> MatchSession {
        let host = SeatedPlayer::human("host", 0);
        let config = MatchConfig {
            min_players,
            max_players,
            games_to_play: 2,
            ..Default::default()
        };
        let mtch = Match::create("table", host, config);
        MatchSession::new(mtch, Arc::new(RwLock::new(AiConfig::embedded_default())))
    }

    fn attach(session: &mut MatchSession) -> (ID<Connection>, tokio::sync::mpsc::UnboundedReceiver<ServerMessage>) {
        let id: ID<Connection> = ID::default();
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        session.attach_connection(id, tx);
        (id, rx)
    }

    #[test]
    fn join_assigns_player_role_and_is_idempotent_on_rejoin() {
        let mut session = session(1, 4);
        let (conn, _rx) = attach(&mut session);
        session
            .handle_client_message(conn, ClientMessage::JoinGame { player_name: "host".into() })
            .unwrap();
        assert_eq!(session.role_of(conn), Some(ConnectionRole::Player(0)));

        // Re-joining under the same connection/display name must not error
        // or duplicate the seat.
        session
            .handle_client_message(conn, ClientMessage::JoinGame { player_name: "host".into() })
            .unwrap();
        assert_eq!(session.mtch.seats.len(), 1);
    }

    #[test]
    fn spectate_rejected_when_match_disallows_spectators() {
        let mut session = session(1, 4);
        session.mtch.config.spectators_allowed = false;
        let (conn, _rx) = attach(&mut session);
        let err = session
            .handle_client_message(conn, ClientMessage::SpectateGame { spectator_name: "watcher".into() })
            .unwrap_err();
        assert_eq!(err.kind(), "spectators_not_allowed");
    }

    #[test]
    fn make_move_by_the_wrong_seat_is_rejected_without_mutating_state() {
        let mut session = session(2, 2);
        let (host_conn, _rx) = attach(&mut session);
        session
            .handle_client_message(host_conn, ClientMessage::JoinGame { player_name: "host".into() })
            .unwrap();
        session.mtch.join("guest").unwrap();
        let host_id = session.mtch.host;
        session.handle_start(host_id, false).unwrap();

        let game = session.mtch.current_game().unwrap();
        let current = game.turn();
        let other = (current + 1) % 2;
        let other_seat_id = session.mtch.seats[other].id;
        let tile_id = session.mtch.current_game().unwrap().hand(other).tiles()[0].id();

        let err = session
            .handle_client_message(
                host_conn,
                ClientMessage::MakeMove { player_id: other_seat_id, tile_id, destination: mex_domino::TrainKind::Personal(other) },
            )
            .unwrap_err();
        assert_eq!(err.kind(), "not_your_turn");
        // the boneyard and turn cursor are untouched by a rejected move
        assert_eq!(session.mtch.current_game().unwrap().turn(), current);
    }

    /// Mirrors a misbehaving AI strategy being caught and recovered from: a
    /// forced advance must move the turn along and open the stuck player's
    /// train even though that player may have had a legal move available.
    #[test]
    fn force_advance_after_ai_failure_passes_the_turn_and_opens_the_train() {
        let mut session = session(2, 2);
        session.mtch.join("guest").unwrap();
        let host_id = session.mtch.host;
        session.handle_start(host_id, false).unwrap();

        let stuck = session.mtch.current_game().unwrap().turn();
        session.force_advance_after_ai_failure("ai_timeout");

        let game = session.mtch.current_game().unwrap();
        assert_ne!(game.turn(), stuck);
        assert!(game.train(mex_domino::TrainKind::Personal(stuck)).is_open());
    }

    /// A connection seated as one player must not be able to submit a move
    /// on another seat's behalf by naming that seat's `player_id` — the
    /// rules engine's turn check alone wouldn't catch this when the
    /// impersonated seat happens to be the one actually on the clock.
    #[test]
    fn make_move_rejects_a_connection_impersonating_another_seat() {
        let mut session = session(2, 2);
        let (host_conn, _rx) = attach(&mut session);
        session
            .handle_client_message(host_conn, ClientMessage::JoinGame { player_name: "host".into() })
            .unwrap();
        session.mtch.join("guest").unwrap();
        let host_id = session.mtch.host;
        session.handle_start(host_id, false).unwrap();

        let current = session.mtch.current_game().unwrap().turn();
        let current_seat_id = session.mtch.seats[current].id;
        let tile_id = session.mtch.current_game().unwrap().hand(current).tiles()[0].id();

        // host_conn is seated at position 0; impersonate the current player
        // (which may or may not be seat 0) via player_id alone.
        let host_position = session.role_of(host_conn);
        if host_position != Some(ConnectionRole::Player(current)) {
            let err = session
                .handle_client_message(
                    host_conn,
                    ClientMessage::MakeMove { player_id: current_seat_id, tile_id, destination: mex_domino::TrainKind::Personal(current) },
                )
                .unwrap_err();
            assert_eq!(err.kind(), "not_your_turn");
        }
    }

    /// A non-owning connection must not be able to read another seat's hand
    /// through `get_valid_moves`/`get_all_valid_moves`.
    #[test]
    fn get_valid_moves_rejects_a_connection_reading_another_seats_hand() {
        let mut session = session(2, 2);
        let (host_conn, mut host_rx) = attach(&mut session);
        session
            .handle_client_message(host_conn, ClientMessage::JoinGame { player_name: "host".into() })
            .unwrap();
        let (guest_conn, _guest_rx) = attach(&mut session);
        session
            .handle_client_message(guest_conn, ClientMessage::JoinGame { player_name: "guest".into() })
            .unwrap();
        let host_id = session.mtch.host;
        session.handle_start(host_id, false).unwrap();
        while host_rx.try_recv().is_ok() {}

        let guest_seat_id = session.mtch.seats[1].id;
        let err = session
            .handle_client_message(host_conn, ClientMessage::GetValidMoves { player_id: guest_seat_id, tile: None })
            .unwrap_err();
        assert_eq!(err.kind(), "not_your_turn");
        assert!(host_rx.try_recv().is_err(), "no moves view should have been sent");

        let err = session
            .handle_client_message(host_conn, ClientMessage::GetAllValidMoves { player_id: guest_seat_id })
            .unwrap_err();
        assert_eq!(err.kind(), "not_your_turn");
    }

    #[test]
    fn detach_of_a_spectator_broadcasts_spectator_left() {
        let mut session = session(1, 4);
        let (conn, _rx) = attach(&mut session);
        session
            .handle_client_message(conn, ClientMessage::SpectateGame { spectator_name: "watcher".into() })
            .unwrap();
        let (_other_conn, mut other_rx) = attach(&mut session);
        session
            .handle_client_message(_other_conn, ClientMessage::SpectateGame { spectator_name: "watcher2".into() })
            .unwrap();
        // drain the join-time broadcasts before detaching
        while other_rx.try_recv().is_ok() {}

        session.detach_connection(conn);
        let mut saw_spectator_left = false;
        while let Ok(message) = other_rx.try_recv() {
            if matches!(message, ServerMessage::SpectatorLeft { spectator_count: 1, .. }) {
                saw_spectator_left = true;
            }
        }
        assert!(saw_spectator_left);
    }
}
