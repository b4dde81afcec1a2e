//! /status, /login, /daemon/shutdown handlers.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use super::{ApiState, Caller};

// ── /status ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StatusResponse {
    pub peers: usize,
    pub channels: usize,
    pub messages: usize,
    pub uptime_secs: u64,
    pub gate_required: bool,
}

pub async fn handle_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    let stats = state.broker.stats();
    Json(StatusResponse {
        peers: stats.peers,
        channels: stats.channels,
        messages: stats.messages,
        uptime_secs: state.started_at.elapsed().as_secs(),
        gate_required: state.gate.required,
    })
}

// ── /login (POST) ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct LoginResponse {
    pub ok: bool,
}

/// Hands out the gate cookie. The gate is a boolean switch, not identity.
pub async fn handle_login(State(state): State<ApiState>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, format!("{}; Path=/", state.gate.cookie))],
        Json(LoginResponse { ok: true }),
    )
}

// ── /daemon/shutdown (POST) ───────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ShutdownResponse {
    pub ok: bool,
}

/// Gated by the `Caller` extractor; there is no broker call to check it.
pub async fn handle_shutdown(
    State(state): State<ApiState>,
    _caller: Caller,
) -> Json<ShutdownResponse> {
    tracing::info!("shutdown requested via API");
    let _ = state.shutdown_tx.send(());
    Json(ShutdownResponse { ok: true })
}
