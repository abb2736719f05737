use crate::record::{derive_achievements, Achievement, GameRecord};
use crate::seat::{Role, Seat, SeatedPlayer};
use mex_core::{Position, Score, ID};
use mex_rules::Game;
use rand::Rng;
use std::time::{Duration, SystemTime};

/// Marker type for [`ID<Match>`].
#[derive(Debug)]
pub struct MatchMarker;

/// Lifecycle state of a [`Match`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum MatchStatus {
    Waiting,
    InProgress,
    Completed,
}

/// Configuration knobs a match is created with.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub max_pip: mex_core::Pip,
    pub games_to_play: usize,
    pub min_players: usize,
    pub max_players: usize,
    pub countdown: Duration,
    pub spectators_allowed: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_pip: mex_core::DEFAULT_MAX_PIP,
            games_to_play: mex_core::DEFAULT_GAMES_PER_MATCH,
            min_players: mex_core::DEFAULT_MIN_PLAYERS,
            max_players: mex_core::MAX_PLAYERS_HARD_CAP,
            countdown: Duration::from_secs(60 * mex_core::DEFAULT_COUNTDOWN_MINUTES),
            spectators_allowed: true,
        }
    }
}

/// The winning seat and supporting detail reported when a match completes.
#[derive(Debug, Clone)]
pub struct CompletionRecord {
    pub winner: Position,
    pub margin: Score,
    pub games_won: Vec<u32>,
    pub achievements: Vec<Achievement>,
}

#[derive(Debug, thiserror::Error, Clone, Copy, Eq, PartialEq)]
pub enum MatchError {
    #[error("the match is full")]
    MatchFull,
    #[error("the match has already started")]
    MatchAlreadyStarted,
    #[error("only the host may perform this action")]
    NotHost,
    #[error("not enough seated players to start")]
    NotEnoughPlayers,
}

/// An ordered series of games, their cumulative scores, and the match's
/// lifecycle state. A running game's per-turn mechanics stay inside
/// [`mex_rules::Game`]; this owns everything above that: seating, scoring
/// across games, and game-to-game transitions.
#[derive(Debug, Clone)]
pub struct Match {
    pub id: ID<MatchMarker>,
    pub name: String,
    pub host: ID<Seat>,
    pub config: MatchConfig,
    pub seats: Vec<SeatedPlayer>,
    pub status: MatchStatus,
    pub created_at: SystemTime,
    cumulative_scores: Vec<Score>,
    games_won: Vec<u32>,
    records: Vec<GameRecord>,
    current_game: Option<Game>,
    current_game_started_at: Option<SystemTime>,
    hand_size_samples: Vec<usize>,
}

impl Match {
    /// Creates a new match in `waiting` status, countdown armed from now.
    pub fn create(name: impl Into<String>, host_seat: SeatedPlayer, config: MatchConfig) -> Self {
        let host = host_seat.id;
        Self {
            id: ID::default(),
            name: name.into(),
            host,
            cumulative_scores: vec![0],
            games_won: vec![0],
            seats: vec![host_seat],
            status: MatchStatus::Waiting,
            created_at: SystemTime::now(),
            records: Vec::new(),
            current_game: None,
            current_game_started_at: None,
            hand_size_samples: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.seats.len() >= self.config.max_players
    }

    pub fn seat_index(&self, seat_id: ID<Seat>) -> Option<Position> {
        self.seats.iter().position(|s| s.id == seat_id)
    }

    /// Seats a new human player if the match is still `waiting` and has
    /// room. Idempotent on re-join by display name (reconnection) — returns
    /// the existing seat.
    pub fn join(&mut self, display_name: &str) -> Result<&SeatedPlayer, MatchError> {
        if let Some(pos) = self.seats.iter().position(|s| s.display_name == display_name) {
            return Ok(&self.seats[pos]);
        }
        if self.status != MatchStatus::Waiting {
            return Err(MatchError::MatchAlreadyStarted);
        }
        if self.is_full() {
            return Err(MatchError::MatchFull);
        }
        let order = self.seats.len();
        self.seats.push(SeatedPlayer::human(display_name, order));
        self.cumulative_scores.push(0);
        self.games_won.push(0);
        Ok(self.seats.last().expect("just pushed"))
    }

    /// Fills remaining seats with AI players up to `max_players`, assigning
    /// each a strategy id from `strategy_ids` (cycled if shorter than the
    /// number of seats to fill).
    pub fn fill_with_ai(&mut self, strategy_ids: &[String]) {
        if strategy_ids.is_empty() {
            return;
        }
        let mut cursor = 0;
        while self.seats.len() < self.config.max_players {
            let order = self.seats.len();
            let strategy_id = strategy_ids[cursor % strategy_ids.len()].clone();
            let name = format!("AI-{}", order + 1);
            self.seats.push(SeatedPlayer::ai(name, strategy_id, order));
            self.cumulative_scores.push(0);
            self.games_won.push(0);
            cursor += 1;
        }
    }

    /// Starts the match: requester must be the host and ≥ `min_players`
    /// seated, unless `force` is set, in which case AI seats are filled up
    /// to `max_players` first before the seating check runs.
    pub fn start<R: Rng>(
        &mut self,
        requester: ID<Seat>,
        force: bool,
        fallback_strategy_ids: &[String],
        rng: &mut R,
    ) -> Result<(), MatchError> {
        if requester != self.host {
            return Err(MatchError::NotHost);
        }
        if self.status != MatchStatus::Waiting {
            return Err(MatchError::MatchAlreadyStarted);
        }
        if force {
            self.fill_with_ai(fallback_strategy_ids);
        }
        if self.seats.len() < self.config.min_players {
            return Err(MatchError::NotEnoughPlayers);
        }
        self.status = MatchStatus::InProgress;
        self.spawn_next_game(rng);
        Ok(())
    }

    /// Auto-start path for the countdown scheduler: identical seating check
    /// to [`Match::start`], but never forces AI fill (the scheduler only
    /// calls this when the deadline has passed with enough seated players).
    pub fn auto_start<R: Rng>(&mut self, rng: &mut R) -> Result<(), MatchError> {
        if self.status != MatchStatus::Waiting {
            return Err(MatchError::MatchAlreadyStarted);
        }
        if self.seats.len() < self.config.min_players {
            return Err(MatchError::NotEnoughPlayers);
        }
        self.status = MatchStatus::InProgress;
        self.spawn_next_game(rng);
        Ok(())
    }

    fn spawn_next_game<R: Rng>(&mut self, rng: &mut R) {
        let game = Game::deal(self.seats.len(), self.config.max_pip, rng);
        self.current_game_started_at = Some(SystemTime::now());
        self.hand_size_samples.clear();
        self.current_game = Some(game);
    }

    pub fn current_game(&self) -> Option<&Game> {
        self.current_game.as_ref()
    }
    pub fn current_game_mut(&mut self) -> Option<&mut Game> {
        self.current_game.as_mut()
    }
    pub fn games_played(&self) -> usize {
        self.records.len()
    }
    pub fn records(&self) -> &[GameRecord] {
        &self.records
    }
    pub fn cumulative_scores(&self) -> &[Score] {
        &self.cumulative_scores
    }

    /// Samples the current game's hand sizes, for the eventual
    /// `longest_held_hand` statistic. Call after each accepted move.
    pub fn sample_hand_sizes(&mut self) {
        if let Some(game) = &self.current_game {
            let max = (0..game.seats()).map(|p| game.hand(p).len()).max().unwrap_or(0);
            self.hand_size_samples.push(max);
        }
    }

    /// Call once the current game's [`mex_rules::GameResult`] is known.
    /// Records statistics, updates cumulative scores and win counters, and
    /// either spawns the next game or transitions the match to `completed`.
    pub fn complete_current_game<R: Rng>(
        &mut self,
        result: mex_rules::GameResult,
        rng: &mut R,
    ) -> Option<CompletionRecord> {
        let game = self.current_game.take().expect("a game was in progress");
        let started = self.current_game_started_at.take().unwrap_or_else(SystemTime::now);
        let duration = SystemTime::now().duration_since(started).unwrap_or(Duration::ZERO);

        for (pos, score) in result.scores.iter().enumerate() {
            self.cumulative_scores[pos] += score;
        }
        self.games_won[result.winner] += 1;

        let record = GameRecord::new(
            self.records.len() + 1,
            game.engine_pip(),
            &result,
            duration,
            &self.hand_size_samples,
        );
        self.records.push(record);

        if self.games_played() >= self.config.games_to_play {
            self.status = MatchStatus::Completed;
            Some(self.finish())
        } else {
            self.spawn_next_game(rng);
            None
        }
    }

    fn finish(&self) -> CompletionRecord {
        let min_score = *self.cumulative_scores.iter().min().unwrap_or(&0);
        let winner = (0..self.seats.len())
            .filter(|&p| self.cumulative_scores[p] == min_score)
            .min_by_key(|&p| (self.games_won[p], self.seats[p].joined_order))
            .unwrap_or(0);
        let runner_up = (0..self.seats.len())
            .filter(|&p| p != winner)
            .map(|p| self.cumulative_scores[p])
            .min()
            .unwrap_or(min_score);
        CompletionRecord {
            winner,
            margin: runner_up - min_score,
            games_won: self.games_won.clone(),
            achievements: derive_achievements(&self.records, self.seats.len()),
        }
    }

    /// Whether any of `self.seats` holds the given seat id with an AI role.
    pub fn is_ai_seat(&self, position: Position) -> bool {
        self.seats.get(position).map(|s| s.role.is_ai()).unwrap_or(false)
    }

    pub fn strategy_id_for(&self, position: Position) -> Option<&str> {
        match self.seats.get(position).map(|s| &s.role) {
            Some(Role::Ai { strategy_id }) => Some(strategy_id.as_str()),
            _ => None,
        }
    }
}
