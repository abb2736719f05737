use mex_ai::AiConfig;
use mex_match::MatchConfig;
use mex_session::SessionManager;
use std::sync::Arc;

/// Process-wide shared state handed to every Axum handler.
/// Grounded on `hosting::Casino`, generalized from a single
/// `Arc<Client>` database handle to the AI config path and match defaults
/// this core actually needs at the boundary.
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub ai_config_path: String,
}

impl AppState {
    /// Builds the shared state from environment configuration, the same way
    /// `Server::run` reads `BIND_ADDR` (configuration surface):
    ///
    /// - `AI_CONFIG_PATH` — path to the tactic/strategy JSON document
    ///   (default `config/ai_config.json`); missing or malformed falls back
    ///   to [`AiConfig::embedded_default`] rather than failing startup.
    /// - `AUTO_CREATE_MATCHES` — `"1"`/`"true"` enables auto-creation on an
    ///   unknown match key; defaults to enabled.
    pub fn bootstrap() -> Self {
        let ai_config_path = std::env::var("AI_CONFIG_PATH").unwrap_or_else(|_| "config/ai_config.json".to_string());
        let ai_config = AiConfig::load(&ai_config_path);
        let auto_create = std::env::var("AUTO_CREATE_MATCHES")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(true);
        let sessions = Arc::new(SessionManager::new(ai_config, MatchConfig::default(), auto_create));
        Self { sessions, ai_config_path }
    }
}
