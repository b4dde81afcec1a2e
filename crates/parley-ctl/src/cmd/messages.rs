//! Relayed messaging commands: send and sync.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::http::ApiClient;

#[derive(Serialize)]
struct PostMessageRequest<'a> {
    name: &'a str,
    peer_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct PostMessageResponse {
    position: u64,
}

#[derive(Serialize)]
struct SyncRequest<'a> {
    name: &'a str,
    after: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    wait_ms: Option<u64>,
}

#[derive(Deserialize)]
pub struct SyncResponse {
    pub messages: Vec<MessageJson>,
    pub new_after: u64,
}

#[derive(Deserialize)]
#[allow(dead_code)]
pub struct MessageJson {
    pub position: u64,
    pub author: String,
    pub text: String,
    pub timestamp: u64,
}

pub async fn post(api: &ApiClient, name: &str, peer_id: &str, text: &str) -> Result<u64> {
    let resp: PostMessageResponse = api
        .post_json_body(
            &["message"],
            &PostMessageRequest {
                name,
                peer_id,
                text,
            },
        )
        .await?;
    Ok(resp.position)
}

pub async fn sync(
    api: &ApiClient,
    name: &str,
    after: u64,
    wait_ms: Option<u64>,
) -> Result<SyncResponse> {
    api.post_json_body(
        &["sync"],
        &SyncRequest {
            name,
            after,
            wait_ms,
        },
    )
    .await
}

pub async fn cmd_send(api: &ApiClient, name: &str, peer_id: &str, text: &str) -> Result<()> {
    let position = post(api, name, peer_id, text).await?;
    println!("Message sent:");
    println!("  Channel  : #{}", name);
    println!("  Position : {}", position);
    Ok(())
}

pub async fn cmd_sync(api: &ApiClient, name: &str, after: u64) -> Result<()> {
    let resp = sync(api, name, after, None).await?;

    if resp.messages.is_empty() {
        println!("No messages in #{} after {}.", name, after);
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Messages in #{} after {}", name, after);
    println!("═══════════════════════════════════════");
    for m in &resp.messages {
        println!("  {:>4}  [{}] {}", m.position, m.author, m.text);
    }
    println!("  next cursor: {}", resp.new_after);

    Ok(())
}
