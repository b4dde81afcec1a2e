//! Channel commands: create, join, members.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::http::ApiClient;

#[derive(Deserialize, Clone)]
pub struct Member {
    pub peer_id: String,
    pub host: String,
    pub port: u16,
}

#[derive(Serialize)]
struct CreateRequest<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
#[allow(dead_code)]
struct CreateResponse {
    ok: bool,
    name: String,
}

#[derive(Serialize)]
struct JoinRequest<'a> {
    name: &'a str,
    peer_id: &'a str,
}

#[derive(Deserialize)]
struct JoinResponse {
    members: Vec<Member>,
}

#[derive(Deserialize)]
#[allow(dead_code)]
struct MembersResponse {
    name: String,
    members: Vec<Member>,
}

pub async fn create(api: &ApiClient, name: &str) -> Result<()> {
    let _: CreateResponse = api
        .post_json_body(&["channel", "create"], &CreateRequest { name })
        .await?;
    Ok(())
}

/// Join a channel and return its current members.
pub async fn join(api: &ApiClient, name: &str, peer_id: &str) -> Result<Vec<Member>> {
    let resp: JoinResponse = api
        .post_json_body(&["channel", "join"], &JoinRequest { name, peer_id })
        .await?;
    Ok(resp.members)
}

pub async fn members(api: &ApiClient, name: &str) -> Result<Vec<Member>> {
    let resp: MembersResponse = api.get_json(&["channel", name, "members"]).await?;
    Ok(resp.members)
}

pub async fn cmd_create(api: &ApiClient, name: &str) -> Result<()> {
    create(api, name).await?;
    println!("Channel #{} ready.", name);
    Ok(())
}

pub async fn cmd_join(api: &ApiClient, name: &str, peer_id: &str) -> Result<()> {
    let members = join(api, name, peer_id).await?;
    println!("{} joined #{} ({} members)", peer_id, name, members.len());
    Ok(())
}

pub async fn cmd_members(api: &ApiClient, name: &str) -> Result<()> {
    let members = members(api, name).await?;

    if members.is_empty() {
        println!("#{} has no members.", name);
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Members of #{} ({})", name, members.len());
    println!("═══════════════════════════════════════");
    for m in &members {
        println!("  {:<16} {}:{}", m.peer_id, m.host, m.port);
    }

    Ok(())
}
