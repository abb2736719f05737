use crate::connection::Connection;
use crate::error::SessionError;
use crate::match_session::MatchSession;
use crate::message::ClientMessage;
use mex_ai::AiConfig;
use mex_core::{Position, ID, AI_LOOP_SAFETY_BOUND, AI_MOVE_DELAY_MS, AI_MOVE_TIMEOUT_SECS, COUNTDOWN_TICK_SECS};
use mex_match::{Match, MatchConfig, MatchStatus, SeatedPlayer};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::{Mutex, RwLock};

/// Reserved key prefixes auto-creation never claims: an
/// operator dashboard routing to `admin-*`/`system-*` should 404, not spawn
/// an ad-hoc match under that name.
const RESERVED_PREFIXES: &[&str] = &["admin-", "system-"];

/// The multiplexer owning every live match in the process. Grounded on
/// `hosting::casino::Casino`'s `RwLock<HashMap<ID<Room>, RoomHandle>>`
/// registry, generalized from a UUID-only room id to an arbitrary string key
/// so unknown keys can be auto-created without the caller minting a UUID
/// first.
pub struct SessionManager {
    matches: RwLock<HashMap<String, Arc<Mutex<MatchSession>>>>,
    ai_config: Arc<std::sync::RwLock<AiConfig>>,
    defaults: MatchConfig,
    auto_create: bool,
}

impl SessionManager {
    pub fn new(ai_config: AiConfig, defaults: MatchConfig, auto_create: bool) -> Self {
        Self {
            matches: RwLock::new(HashMap::new()),
            ai_config: Arc::new(std::sync::RwLock::new(ai_config)),
            defaults,
            auto_create,
        }
    }

    fn is_reserved(key: &str) -> bool {
        RESERVED_PREFIXES.iter().any(|prefix| key.starts_with(prefix))
    }

    /// Replaces the active AI configuration for every match, live: an
    /// atomically-swappable registry behind a lock rather than a shared
    /// mutable global.
    pub fn reload_ai_config(&self, path: impl AsRef<std::path::Path>) {
        let fresh = AiConfig::load(path);
        *self.ai_config.write().expect("ai config lock poisoned") = fresh;
        log::info!("[session-manager] AI configuration reloaded");
    }

    pub async fn get(&self, key: &str) -> Option<Arc<Mutex<MatchSession>>> {
        self.matches.read().await.get(key).cloned()
    }

    /// Creates a brand-new match under `key`, seating `host_name` as its
    /// host. Returns the session handle and the host's seat id.
    pub async fn create_match(
        &self,
        key: impl Into<String>,
        name: impl Into<String>,
        host_name: &str,
    ) -> (Arc<Mutex<MatchSession>>, ID<mex_match::Seat>) {
        let host = SeatedPlayer::human(host_name, 0);
        let host_id = host.id;
        let mtch = Match::create(name, host, self.defaults.clone());
        let session = Arc::new(Mutex::new(MatchSession::new(mtch, self.ai_config.clone())));
        self.matches.write().await.insert(key.into(), session.clone());
        (session, host_id)
    }

    /// Looks up `key`, auto-creating a default single-game match session
    /// owned by `joiner_name` if it doesn't exist. Disabled for
    /// reserved key prefixes regardless of the `auto_create` flag.
    ///
    /// Auto-created matches play exactly one game
    /// (`games_to_play = 1`) regardless of `self.defaults`, matching
    /// `game_manager.py`'s auto-creation path — a host-initiated
    /// `create_match` is the only way to get a multi-game match.
    pub async fn get_or_create(&self, key: &str, joiner_name: &str) -> Result<Arc<Mutex<MatchSession>>, SessionError> {
        if let Some(session) = self.get(key).await {
            return Ok(session);
        }
        if !self.auto_create || Self::is_reserved(key) {
            return Err(SessionError::MatchNotFound);
        }
        let single_game = MatchConfig { games_to_play: 1, ..self.defaults.clone() };
        let host = SeatedPlayer::human(joiner_name, 0);
        let mtch = Match::create(format!("Match {key}"), host, single_game);
        let session = Arc::new(Mutex::new(MatchSession::new(mtch, self.ai_config.clone())));
        self.matches.write().await.insert(key.to_string(), session.clone());
        log::info!("[session-manager] auto-created single-game match '{key}'");
        Ok(session)
    }

    /// Dispatches one decoded inbound message to the match named `key`, then
    /// arms the AI-move driver if the mutation just handed the turn to an
    /// AI seat. The driver check runs after every message,
    /// not only after `make_move`/`draw_domino` — this is what re-arms a
    /// lost AI trigger on reconnection for free.
    pub async fn dispatch(&self, key: &str, origin: ID<Connection>, message: ClientMessage) -> Result<(), SessionError> {
        let session = self.get(key).await.ok_or(SessionError::MatchNotFound)?;
        {
            let mut guard = session.lock().await;
            guard.handle_client_message(origin, message)?;
        }
        Self::arm_ai_driver_if_needed(key.to_string(), session);
        Ok(())
    }

    /// Claims and spawns the AI-move driver loop for this match if the
    /// current player is AI-seated and no driver is already running.
    fn arm_ai_driver_if_needed(key: String, session: Arc<Mutex<MatchSession>>) {
        tokio::spawn(async move {
            let should_run = {
                let mut guard = session.lock().await;
                guard.current_turn_is_ai() && guard.try_claim_ai_driver()
            };
            if should_run {
                run_ai_driver(key, session).await;
            }
        });
    }

    /// One countdown-scheduler sweep: auto-starts matches
    /// past deadline with enough seats, deletes under-subscribed ones, and
    /// broadcasts a tick at each minute boundary for everyone else.
    pub async fn sweep_countdowns(&self) {
        let snapshot: Vec<(String, Arc<Mutex<MatchSession>>)> = {
            let matches = self.matches.read().await;
            matches.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
        };

        let mut expired_keys = Vec::new();
        for (key, session) in snapshot {
            let mut guard = session.lock().await;
            if guard.mtch.status != MatchStatus::Waiting {
                continue;
            }
            let deadline = guard
                .mtch
                .created_at
                .checked_add(guard.mtch.config.countdown)
                .unwrap_or_else(SystemTime::now);
            let now = SystemTime::now();
            let seated = guard.mtch.seats.len();
            let min_players = guard.mtch.config.min_players;

            if now >= deadline {
                if seated >= min_players {
                    if guard.auto_start().is_ok() {
                        log::info!("[countdown] match '{key}' auto-started with {seated} seated players");
                        drop(guard);
                        Self::arm_ai_driver_if_needed(key.clone(), session.clone());
                    }
                } else {
                    log::info!("[countdown] match '{key}' deleted: only {seated}/{min_players} players at deadline");
                    guard.broadcast_deleted("countdown expired with too few players");
                    expired_keys.push(key);
                }
            } else {
                let remaining = deadline.duration_since(now).unwrap_or(Duration::ZERO);
                let remaining_secs = remaining.as_secs();
                if remaining_secs % 60 == 0 {
                    guard.broadcast_countdown(remaining_secs / 60, remaining_secs, seated >= min_players, None);
                }
            }
        }

        if !expired_keys.is_empty() {
            let mut matches = self.matches.write().await;
            for key in expired_keys {
                matches.remove(&key);
            }
        }
    }

    /// Runs the countdown scheduler's ticker loop forever: a
    /// single background ticker every 30s. Intended to be spawned once at
    /// startup against an `Arc<SessionManager>`.
    pub async fn run_countdown_scheduler(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(Duration::from_secs(COUNTDOWN_TICK_SECS));
        loop {
            ticker.tick().await;
            self.sweep_countdowns().await;
        }
    }

    /// Read-only listing for the lobby directory.
    pub async fn list_matches(&self) -> Vec<crate::lobby::MatchListing> {
        let matches = self.matches.read().await;
        let mut listings = Vec::with_capacity(matches.len());
        for (key, session) in matches.iter() {
            let guard = session.lock().await;
            listings.push(crate::lobby::build_listing(key, &guard));
        }
        listings
    }

    /// Read-only presence listing for the lobby directory,
    /// derived entirely from connection/seat state — no independent store.
    pub async fn online_users(&self) -> Vec<crate::lobby::UserPresence> {
        let matches = self.matches.read().await;
        let mut users = Vec::new();
        for session in matches.values() {
            let guard = session.lock().await;
            crate::lobby::collect_presence(&guard, &mut users);
        }
        users
    }

    /// Per-match administrative detail.
    pub async fn admin_detail(&self, key: &str) -> Result<crate::admin::MatchDetail, SessionError> {
        let session = self.get(key).await.ok_or(SessionError::MatchNotFound)?;
        let guard = session.lock().await;
        Ok(crate::admin::build_detail(key, &guard))
    }

    /// Lists every live match's administrative detail in one pass.
    pub async fn admin_list(&self) -> Vec<crate::admin::MatchDetail> {
        let matches = self.matches.read().await;
        let mut details = Vec::with_capacity(matches.len());
        for (key, session) in matches.iter() {
            let guard = session.lock().await;
            details.push(crate::admin::build_detail(key, &guard));
        }
        details
    }

    /// Force-terminates a match regardless of its lifecycle state, removing
    /// it from the registry — an operator tool, not a rules
    /// outcome.
    pub async fn admin_force_terminate(&self, key: &str, reason: &str) -> Result<(), SessionError> {
        let session = self.get(key).await.ok_or(SessionError::MatchNotFound)?;
        {
            let guard = session.lock().await;
            guard.broadcast_deleted(reason);
        }
        self.matches.write().await.remove(key);
        log::warn!("[admin] match '{key}' force-terminated: {reason}");
        Ok(())
    }

    /// Force-advances the current turn past a stuck AI seat.
    pub async fn admin_force_advance(&self, key: &str) -> Result<(), SessionError> {
        let session = self.get(key).await.ok_or(SessionError::MatchNotFound)?;
        let mut guard = session.lock().await;
        guard.force_advance_after_ai_failure("admin_forced_advance");
        Ok(())
    }

    /// Seat position of the player on the clock, for building an admin
    /// summary without exposing the whole session.
    pub async fn current_turn(&self, key: &str) -> Option<Position> {
        let session = self.get(key).await?;
        let guard = session.lock().await;
        guard.current_turn_seat()
    }
}

/// Drives consecutive AI turns for one match: a perceptibility delay, a
/// per-move timeout, and a safety-bound cap on loop iterations. Cancels
/// early if the turn moves away from an
/// AI seat during the delay (someone else's reconnection re-armed it, or the
/// match ended) rather than acting on stale state. Stands alone (no
/// `SessionManager` reference needed) since everything it touches lives on
/// the match session itself.
async fn run_ai_driver(key: String, session: Arc<Mutex<MatchSession>>) {
    for iteration in 0..AI_LOOP_SAFETY_BOUND {
        tokio::time::sleep(Duration::from_millis(AI_MOVE_DELAY_MS)).await;

        let still_ai_turn = {
            let guard = session.lock().await;
            guard.mtch.status == MatchStatus::InProgress && guard.current_turn_is_ai()
        };
        if !still_ai_turn {
            log::debug!("[ai-driver {key}] turn changed away from AI before the delay elapsed, cancelling");
            break;
        }

        let outcome = tokio::time::timeout(Duration::from_secs(AI_MOVE_TIMEOUT_SECS), async {
            let mut guard = session.lock().await;
            guard.apply_ai_move()
        })
        .await;

        match outcome {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => {
                log::warn!("[ai-driver {key}] AI move failed: {err}");
                session.lock().await.force_advance_after_ai_failure("ai_internal_error");
            }
            Err(_timed_out) => {
                log::warn!("[ai-driver {key}] AI move timed out after {AI_MOVE_TIMEOUT_SECS}s");
                session.lock().await.force_advance_after_ai_failure("ai_timeout");
            }
        }

        let continue_looping = {
            let guard = session.lock().await;
            guard.mtch.status == MatchStatus::InProgress && guard.current_turn_is_ai()
        };
        if !continue_looping {
            break;
        }
        if iteration + 1 == AI_LOOP_SAFETY_BOUND {
            log::warn!("[ai-driver {key}] hit the safety bound of {AI_LOOP_SAFETY_BOUND} consecutive AI turns");
        }
    }
    session.lock().await.release_ai_driver();
}

#[cfg(test)]
mod tests {
    use super::*;
    use mex_core::ID;

    fn manager() -> SessionManager {
        SessionManager::new(AiConfig::embedded_default(), MatchConfig::default(), true)
    }

    #[tokio::test]
    async fn unknown_key_is_not_found_when_auto_create_disabled() {
        let manager = SessionManager::new(AiConfig::embedded_default(), MatchConfig::default(), false);
        assert!(manager.get_or_create("table-1", "alice").await.is_err());
    }

    #[tokio::test]
    async fn auto_create_spawns_a_waiting_match() {
        let manager = manager();
        let session = manager.get_or_create("table-1", "alice").await.unwrap();
        let guard = session.lock().await;
        assert_eq!(guard.mtch.status, MatchStatus::Waiting);
        assert_eq!(guard.mtch.seats.len(), 1);
    }

    #[tokio::test]
    async fn auto_created_match_plays_a_single_game_regardless_of_defaults() {
        // defaults carries the 13-game series; auto-creation must not inherit it.
        let manager = SessionManager::new(AiConfig::embedded_default(), MatchConfig::default(), true);
        let session = manager.get_or_create("table-1", "alice").await.unwrap();
        let guard = session.lock().await;
        assert_eq!(guard.mtch.config.games_to_play, 1);
    }

    #[tokio::test]
    async fn host_created_match_keeps_the_full_default_series() {
        let manager = manager();
        let (session, _host) = manager.create_match("table-2", "Table 2", "alice").await;
        let guard = session.lock().await;
        assert_eq!(guard.mtch.config.games_to_play, mex_core::DEFAULT_GAMES_PER_MATCH);
    }

    #[tokio::test]
    async fn reserved_prefix_is_never_auto_created() {
        let manager = manager();
        let err = manager.get_or_create("admin-dashboard", "alice").await.unwrap_err();
        assert_eq!(err.kind(), "match_not_found");
    }

    #[tokio::test]
    async fn dispatch_rejects_unknown_match() {
        let manager = manager();
        let origin: ID<Connection> = ID::default();
        let err = manager
            .dispatch("nowhere", origin, ClientMessage::JoinGame { player_name: "bob".into() })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "match_not_found");
    }

    #[tokio::test]
    async fn admin_force_terminate_removes_the_match() {
        let manager = manager();
        manager.get_or_create("table-1", "alice").await.unwrap();
        manager.admin_force_terminate("table-1", "operator cleanup").await.unwrap();
        assert!(manager.get("table-1").await.is_none());
    }
}
