//! Relayed chat: post through the broker and poll it for new messages.

use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::channels;
use super::http::ApiClient;
use super::messages;
use super::peers;

/// Long-poll window per sync request. The broker caps it further.
const POLL_WAIT_MS: u64 = 10_000;
const IDLE_DELAY: Duration = Duration::from_secs(1);
const RETRY_DELAY: Duration = Duration::from_millis(600);

pub async fn cmd_chat(api: &ApiClient, channel: &str, peer_id: &str, host: &str, port: u16) -> Result<()> {
    peers::register(api, peer_id, host, port).await?;
    channels::create(api, channel).await?;
    channels::join(api, channel, peer_id).await?;

    let poller = {
        let api = api.clone();
        let channel = channel.to_string();
        tokio::spawn(async move { poll_loop(api, channel).await })
    };

    println!("[{}] joined #{}. Type to chat, /quit to leave.", peer_id, channel);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let text = line.trim_end();
        if text == "/quit" {
            break;
        }
        if text.trim().is_empty() {
            continue;
        }
        if let Err(e) = messages::post(api, channel, peer_id, text).await {
            eprintln!("[error] send failed: {e:#}");
        }
    }

    poller.abort();
    println!("bye.");
    Ok(())
}

/// Print every message past the local cursor, forever. The cursor lives
/// here; the broker is stateless about it.
async fn poll_loop(api: ApiClient, channel: String) {
    let mut after = 0;
    loop {
        match messages::sync(&api, &channel, after, Some(POLL_WAIT_MS)).await {
            Ok(resp) => {
                for m in &resp.messages {
                    println!("\r[{}] {}", m.author, m.text);
                }
                after = resp.new_after;
                if resp.messages.is_empty() {
                    tokio::time::sleep(IDLE_DELAY).await;
                }
            }
            Err(_) => tokio::time::sleep(RETRY_DELAY).await,
        }
    }
}
