//! parleyd: Parley rendezvous broker and forwarding relay.
//!
//! Usage:
//!   parleyd [serve]
//!   parleyd relay [--listen <port>] [--upstream <host:port>]

use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::net::TcpListener;

use parley_core::config::ParleyConfig;
use parley_services::Broker;

mod relay;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = ParleyConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let mut config = ParleyConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        ParleyConfig::default()
    });

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.split_first() {
        None => run_broker(config).await,
        Some((cmd, [])) if cmd == "serve" => run_broker(config).await,
        Some((cmd, rest)) if cmd == "relay" => {
            apply_relay_flags(&mut config, rest)?;
            run_relay(config).await
        }
        Some((cmd, _)) => bail!("unknown command: {cmd} (expected `serve` or `relay`)"),
    }
}

fn apply_relay_flags(config: &mut ParleyConfig, args: &[String]) -> Result<()> {
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--listen" => {
                i += 1;
                config.relay.listen_port = args
                    .get(i)
                    .context("--listen requires a value")?
                    .parse()
                    .context("--listen must be a port number")?;
            }
            "--upstream" => {
                i += 1;
                config.relay.upstream = args
                    .get(i)
                    .context("--upstream requires a value")?
                    .clone();
            }
            other => bail!("unknown relay option: {other}"),
        }
        i += 1;
    }
    Ok(())
}

fn spawn_ctrl_c(shutdown: tokio::sync::broadcast::Sender<()>) {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("shutdown signal received");
        let _ = shutdown.send(());
    });
}

async fn run_broker(config: ParleyConfig) -> Result<()> {
    tracing::info!(
        bind = %config.server.bind,
        port = config.server.port,
        gate_required = config.gate.required,
        max_sync_wait_ms = config.sync.max_wait_ms,
        "parleyd starting"
    );
    if !config.gate.required {
        tracing::warn!("access gate disabled, every request is authorized");
    }

    let broker = Broker::new();
    let state = parley_api::ApiState::new(
        broker.clone(),
        config.gate.clone(),
        Duration::from_millis(config.sync.max_wait_ms),
    );
    spawn_ctrl_c(state.shutdown_tx.clone());

    parley_api::serve(state, &config.server.bind, config.server.port)
        .await
        .context("API server failed")?;

    let stats = broker.stats();
    tracing::info!(
        peers = stats.peers,
        channels = stats.channels,
        messages = stats.messages,
        "shutting down"
    );
    Ok(())
}

async fn run_relay(config: ParleyConfig) -> Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", config.relay.listen_port))
        .await
        .with_context(|| format!("failed to bind relay port {}", config.relay.listen_port))?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel::<()>(1);
    spawn_ctrl_c(shutdown_tx);

    relay::run(listener, config.relay.upstream, shutdown_rx).await
}
