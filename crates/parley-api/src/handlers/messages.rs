//! /message and /sync handlers: relayed messaging.

use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use parley_core::{Message, PeerId};

use super::{reject, ApiState, Caller};

// ── /message (POST) ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct PostMessageRequest {
    pub name: String,
    pub peer_id: String,
    pub text: String,
}

#[derive(Serialize)]
pub struct PostMessageResponse {
    pub ok: bool,
    pub position: u64,
}

pub async fn handle_post_message(
    State(state): State<ApiState>,
    Caller(caller): Caller,
    Json(req): Json<PostMessageRequest>,
) -> Result<Json<PostMessageResponse>, (StatusCode, String)> {
    let position = state
        .broker
        .post(
            caller,
            &req.name,
            &PeerId::new(req.peer_id),
            &req.text,
        )
        .map_err(reject)?;

    Ok(Json(PostMessageResponse { ok: true, position }))
}

// ── /sync (POST) ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SyncRequest {
    pub name: String,
    /// Last position the caller consumed. 0 = from the beginning.
    #[serde(default)]
    pub after: u64,
    /// Long-poll: wait up to this long for something new. Capped by config.
    #[serde(default)]
    pub wait_ms: Option<u64>,
}

#[derive(Serialize)]
pub struct SyncResponse {
    pub name: String,
    pub messages: Vec<Message>,
    pub new_after: u64,
}

pub async fn handle_sync(
    State(state): State<ApiState>,
    Caller(caller): Caller,
    Json(req): Json<SyncRequest>,
) -> Result<Json<SyncResponse>, (StatusCode, String)> {
    let wait = req
        .wait_ms
        .map(Duration::from_millis)
        .unwrap_or(Duration::ZERO)
        .min(state.max_sync_wait);

    let batch = if wait.is_zero() {
        state.broker.sync(caller, &req.name, req.after)
    } else {
        state
            .broker
            .sync_wait(caller, &req.name, req.after, wait)
            .await
    }
    .map_err(reject)?;

    Ok(Json(SyncResponse {
        name: req.name,
        messages: batch.messages,
        new_after: batch.new_after,
    }))
}
