//! Broker status command.

use anyhow::Result;
use serde::Deserialize;

use super::http::ApiClient;

#[derive(Deserialize)]
struct StatusResponse {
    peers: usize,
    channels: usize,
    messages: usize,
    uptime_secs: u64,
    gate_required: bool,
}

pub async fn cmd_status(api: &ApiClient) -> Result<()> {
    let resp: StatusResponse = api.get_json(&["status"]).await?;

    println!("═══════════════════════════════════════");
    println!("  Parley Broker Status");
    println!("═══════════════════════════════════════");
    println!("  Peers registered : {}", resp.peers);
    println!("  Channels         : {}", resp.channels);
    println!("  Messages         : {}", resp.messages);
    println!("  Uptime           : {}s", resp.uptime_secs);
    println!(
        "  Access gate      : {}",
        if resp.gate_required { "required" } else { "off" }
    );

    Ok(())
}
