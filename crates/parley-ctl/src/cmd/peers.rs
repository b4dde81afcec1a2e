//! Peer registration and listing commands.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::http::ApiClient;

#[derive(Deserialize)]
struct PeersResponse {
    peers: Vec<PeerInfo>,
}

#[derive(Deserialize)]
#[allow(dead_code)]
struct PeerInfo {
    peer_id: String,
    host: String,
    port: u16,
    registered_at: u64,
    last_seen: u64,
}

#[derive(Serialize)]
pub struct RegisterRequest<'a> {
    pub peer_id: &'a str,
    pub host: &'a str,
    pub port: u16,
}

#[derive(Deserialize)]
#[allow(dead_code)]
pub struct RegisterResponse {
    pub peer_id: String,
}

pub async fn register(api: &ApiClient, peer_id: &str, host: &str, port: u16) -> Result<()> {
    let _: RegisterResponse = api
        .post_json_body(&["peer", "register"], &RegisterRequest { peer_id, host, port })
        .await?;
    Ok(())
}

pub async fn cmd_register(api: &ApiClient, peer_id: &str, host: &str, port: u16) -> Result<()> {
    register(api, peer_id, host, port).await?;
    println!("Registered {} at {}:{}", peer_id, host, port);
    Ok(())
}

pub async fn cmd_peers(api: &ApiClient) -> Result<()> {
    let resp: PeersResponse = api.get_json(&["peers"]).await?;

    if resp.peers.is_empty() {
        println!("No peers registered yet.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Registered Peers ({})", resp.peers.len());
    println!("═══════════════════════════════════════");

    for p in &resp.peers {
        println!("  ┌─ {}", p.peer_id);
        println!("  └─ addr : {}:{}", p.host, p.port);
    }

    Ok(())
}
