//! Forwarding relay: transparent TCP pass-through to the API front end.
//!
//! Bytes are piped unchanged in both directions until either side closes,
//! so request/response semantics, ordering, and cookies are preserved.

use anyhow::{Context, Result};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

pub async fn run(
    listener: TcpListener,
    upstream: String,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<()> {
    tracing::info!(
        listen = %listener.local_addr()?,
        upstream = %upstream,
        "relay listening"
    );

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                tracing::info!("relay shutting down");
                return Ok(());
            }
            accepted = listener.accept() => {
                let (client, client_addr) = accepted.context("relay accept failed")?;
                let upstream = upstream.clone();
                tokio::spawn(async move {
                    match forward(client, &upstream).await {
                        Ok((up, down)) => tracing::debug!(
                            client = %client_addr,
                            bytes_up = up,
                            bytes_down = down,
                            "relay connection closed"
                        ),
                        Err(e) => tracing::warn!(
                            client = %client_addr,
                            error = %e,
                            "relay connection failed"
                        ),
                    }
                });
            }
        }
    }
}

/// Pipe one client connection to the upstream. Returns bytes (up, down).
async fn forward(mut client: TcpStream, upstream: &str) -> Result<(u64, u64)> {
    let mut server = TcpStream::connect(upstream)
        .await
        .with_context(|| format!("failed to connect to upstream {upstream}"))?;
    let counts = tokio::io::copy_bidirectional(&mut client, &mut server).await?;
    Ok(counts)
}
