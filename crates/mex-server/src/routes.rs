use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use mex_core::ID;
use mex_match::Seat;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Builds every HTTP route outside the WebSocket bridge: lobby listing,
/// match creation, and the administrative interface.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/matches", get(list_matches).post(create_match))
        .route("/matches/:key", get(match_detail))
        .route("/matches/:key/terminate", post(force_terminate))
        .route("/matches/:key/advance", post(force_advance))
        .route("/users/online", get(online_users))
        .route("/ws/:key", get(crate::bridge::ws_handler))
        .route("/ai-config/reload", post(reload_ai_config))
}

#[derive(Debug, Deserialize)]
struct CreateMatchRequest {
    key: String,
    name: String,
    host_name: String,
}

#[derive(Debug, Serialize)]
struct CreateMatchResponse {
    key: String,
    host_seat_id: ID<Seat>,
}

async fn create_match(State(state): State<Arc<AppState>>, Json(body): Json<CreateMatchRequest>) -> impl IntoResponse {
    if state.sessions.get(&body.key).await.is_some() {
        return (StatusCode::CONFLICT, Json(serde_json::json!({ "error": "a match with that key already exists" })))
            .into_response();
    }
    let (_, host_seat_id) = state.sessions.create_match(body.key.clone(), body.name, &body.host_name).await;
    (StatusCode::CREATED, Json(CreateMatchResponse { key: body.key, host_seat_id })).into_response()
}

async fn list_matches(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.sessions.list_matches().await)
}

async fn online_users(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.sessions.online_users().await)
}

async fn match_detail(State(state): State<Arc<AppState>>, Path(key): Path<String>) -> impl IntoResponse {
    match state.sessions.admin_detail(&key).await {
        Ok(detail) => Json(detail).into_response(),
        Err(err) => (StatusCode::NOT_FOUND, err.to_string()).into_response(),
    }
}

#[derive(Debug, Deserialize, Default)]
struct TerminateRequest {
    #[serde(default = "default_reason")]
    reason: String,
}
fn default_reason() -> String {
    "administrative force-terminate".to_string()
}

/// Operator-only: force-terminates a match regardless of lifecycle state.
/// Not gated behind auth here — authentication/authorization is an
/// out-of-scope external collaborator, same as the account system itself.
async fn force_terminate(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    body: Option<Json<TerminateRequest>>,
) -> impl IntoResponse {
    let reason = body.map(|Json(b)| b.reason).unwrap_or_else(default_reason);
    match state.sessions.admin_force_terminate(&key, &reason).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => (StatusCode::NOT_FOUND, err.to_string()).into_response(),
    }
}

async fn force_advance(State(state): State<Arc<AppState>>, Path(key): Path<String>) -> impl IntoResponse {
    match state.sessions.admin_force_advance(&key).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => (StatusCode::NOT_FOUND, err.to_string()).into_response(),
    }
}

/// Hot-reloads the AI tactic/strategy configuration from disk, applying to
/// every live match immediately.
async fn reload_ai_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.sessions.reload_ai_config(&state.ai_config_path);
    StatusCode::OK
}
