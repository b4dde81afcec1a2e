//! /peer handlers: registration and listing.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use parley_core::{PeerAddr, PeerId};

use super::{reject, ApiState, Caller};

// ── /peer/register (POST) ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub peer_id: String,
    #[serde(alias = "ip")]
    pub host: String,
    pub port: u16,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub ok: bool,
    pub peer_id: String,
}

pub async fn handle_peer_register(
    State(state): State<ApiState>,
    Caller(caller): Caller,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, (StatusCode, String)> {
    state
        .broker
        .register(
            caller,
            PeerId::new(req.peer_id.clone()),
            PeerAddr::new(req.host, req.port),
        )
        .map_err(reject)?;

    Ok(Json(RegisterResponse {
        ok: true,
        peer_id: req.peer_id,
    }))
}

// ── /peers (GET) ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct PeersResponse {
    pub peers: Vec<PeerInfo>,
}

#[derive(Serialize)]
pub struct PeerInfo {
    pub peer_id: String,
    pub host: String,
    pub port: u16,
    pub registered_at: u64,
    pub last_seen: u64,
}

pub async fn handle_peers(
    State(state): State<ApiState>,
    Caller(caller): Caller,
) -> Result<Json<PeersResponse>, (StatusCode, String)> {
    let peers = state
        .broker
        .peers(caller)
        .map_err(reject)?
        .into_iter()
        .map(|(id, entry)| PeerInfo {
            peer_id: id.to_string(),
            host: entry.addr.host,
            port: entry.addr.port,
            registered_at: entry.registered_at,
            last_seen: entry.last_seen,
        })
        .collect();

    Ok(Json(PeersResponse { peers }))
}
