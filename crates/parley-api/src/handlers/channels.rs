//! /channel handlers: create, join, and member discovery.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use parley_core::PeerId;
use parley_services::Member;

use super::{reject, ApiState, Caller};

// ── /channel/create (POST) ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateRequest {
    pub name: String,
}

#[derive(Serialize)]
pub struct CreateResponse {
    pub ok: bool,
    pub name: String,
}

pub async fn handle_channel_create(
    State(state): State<ApiState>,
    Caller(caller): Caller,
    Json(req): Json<CreateRequest>,
) -> Result<Json<CreateResponse>, (StatusCode, String)> {
    state
        .broker
        .create(caller, &req.name)
        .map_err(reject)?;

    Ok(Json(CreateResponse {
        ok: true,
        name: req.name,
    }))
}

// ── /channel/join (POST) ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct JoinRequest {
    pub name: String,
    pub peer_id: String,
}

/// Join answers with the current member list so a direct-mode client can
/// start dialing without a second round trip.
#[derive(Serialize)]
pub struct JoinResponse {
    pub ok: bool,
    pub name: String,
    pub members: Vec<Member>,
}

pub async fn handle_channel_join(
    State(state): State<ApiState>,
    Caller(caller): Caller,
    Json(req): Json<JoinRequest>,
) -> Result<Json<JoinResponse>, (StatusCode, String)> {
    state
        .broker
        .join(caller, &req.name, &PeerId::new(req.peer_id))
        .map_err(reject)?;
    let members = state.broker.members(caller, &req.name).map_err(reject)?;

    Ok(Json(JoinResponse {
        ok: true,
        name: req.name,
        members,
    }))
}

// ── /channel/{name}/members (GET) ─────────────────────────────────────────────

#[derive(Serialize)]
pub struct MembersResponse {
    pub name: String,
    pub members: Vec<Member>,
}

pub async fn handle_channel_members(
    State(state): State<ApiState>,
    Caller(caller): Caller,
    Path(name): Path<String>,
) -> Result<Json<MembersResponse>, (StatusCode, String)> {
    let members = state
        .broker
        .members(caller, &name)
        .map_err(reject)?;

    Ok(Json(MembersResponse { name, members }))
}
