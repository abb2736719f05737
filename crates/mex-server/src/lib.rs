//! HTTP and WebSocket hosting layer for the Mexican Train server
//! (server/WS bridge, component "the boundary mex-session sits
//! behind"). Grounded on `hosting::server::Server` and `hosting::Casino`,
//! swapping `actix-web`/`actix-ws` for Axum's router and native WebSocket
//! upgrade — the rest of the shape (one shared state handle, a route per
//! lifecycle action, a bridge task per connection) carries over directly.
mod bridge;
mod routes;
mod state;

pub use state::AppState;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub struct Server;

impl Server {
    pub async fn run() -> std::io::Result<()> {
        let state = Arc::new(AppState::bootstrap());

        let scheduler = state.sessions.clone();
        tokio::spawn(async move {
            scheduler.run_countdown_scheduler().await;
        });

        let app = Router::new()
            .merge(routes::router())
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state);

        let bind_addr = std::env::var("BIND_ADDR").expect("BIND_ADDR must be set");
        log::info!("[server] listening on {bind_addr}");
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
        axum::serve(listener, app).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_state_bootstraps_with_defaults_when_env_is_unset() {
        let state = AppState::bootstrap();
        assert!(state.ai_config_path.ends_with("ai_config.json"));
    }
}
