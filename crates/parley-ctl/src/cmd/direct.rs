//! Direct mode: use the broker only for discovery, then talk peer to peer.
//!
//! Each peer listens on its advertised address. After joining, a peer dials
//! every member whose id sorts after its own, so each pair ends up with one
//! connection. Frames are newline-delimited JSON; the dialer sends `hello`
//! first so the listener can name the connection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use super::channels::{self, Member};
use super::http::ApiClient;
use super::peers;

const DIAL_TIMEOUT: Duration = Duration::from_secs(3);
const REFRESH_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Frame {
    Hello {
        from: String,
        chan: String,
    },
    Msg {
        chan: String,
        from: String,
        text: String,
        ts: u64,
    },
}

impl Frame {
    fn encode(&self) -> Result<Vec<u8>> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}

/// Open connections keyed by remote peer id. Each writer is tagged with
/// the id of the socket it belongs to, so a closing socket only removes
/// its own entry and never one that replaced it.
type Connections = Arc<Mutex<HashMap<String, (u64, OwnedWriteHalf)>>>;

struct DirectPeer {
    peer_id: String,
    channel: String,
    conns: Connections,
    next_conn: AtomicU64,
}

pub async fn cmd_direct(
    api: &ApiClient,
    channel: &str,
    peer_id: &str,
    host: &str,
    port: u16,
) -> Result<()> {
    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("failed to listen on {}:{}", host, port))?;
    println!("[{}] listening on {}:{}", peer_id, host, port);

    let peer = Arc::new(DirectPeer::new(peer_id, channel));

    let acceptor = tokio::spawn(peer.clone().accept_loop(listener));

    peers::register(api, peer_id, host, port).await?;
    channels::create(api, channel).await?;
    let members = channels::join(api, channel, peer_id).await?;
    peer.dial_members(&members).await;

    let refresher = {
        let peer = peer.clone();
        let api = api.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(REFRESH_INTERVAL);
            loop {
                interval.tick().await;
                match channels::members(&api, &peer.channel).await {
                    Ok(members) => peer.dial_members(&members).await,
                    Err(e) => eprintln!("[error] member refresh failed: {e:#}"),
                }
            }
        })
    };

    println!("[{}] joined #{} directly. Type to chat, /quit to leave.", peer_id, channel);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let text = line.trim_end();
        if text == "/quit" {
            break;
        }
        if text.trim().is_empty() {
            continue;
        }
        peer.broadcast(text).await?;
    }

    refresher.abort();
    acceptor.abort();
    peer.conns.lock().await.clear();
    println!("bye.");
    Ok(())
}

impl DirectPeer {
    fn new(peer_id: &str, channel: &str) -> Self {
        Self {
            peer_id: peer_id.to_string(),
            channel: channel.to_string(),
            conns: Arc::new(Mutex::new(HashMap::new())),
            next_conn: AtomicU64::new(1),
        }
    }

    fn conn_id(&self) -> u64 {
        self.next_conn.fetch_add(1, Ordering::Relaxed)
    }

    async fn accept_loop(self: Arc<Self>, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let (reader, writer) = stream.into_split();
                    let conn = self.conn_id();
                    // Unnamed until its hello arrives.
                    tokio::spawn(self.clone().read_loop(conn, reader, Some(writer), None));
                }
                Err(e) => {
                    eprintln!("[error] accept failed: {e}");
                    return;
                }
            }
        }
    }

    /// Dial members that sort after us and are not yet connected.
    async fn dial_members(self: &Arc<Self>, members: &[Member]) {
        for m in members {
            if m.peer_id <= self.peer_id {
                continue;
            }
            if self.conns.lock().await.contains_key(&m.peer_id) {
                continue;
            }
            if let Err(e) = self.dial(m).await {
                eprintln!("[error] could not reach {}: {e:#}", m.peer_id);
            }
        }
    }

    async fn dial(self: &Arc<Self>, member: &Member) -> Result<()> {
        let addr = (member.host.as_str(), member.port);
        let stream = tokio::time::timeout(DIAL_TIMEOUT, TcpStream::connect(addr))
            .await
            .context("connect timed out")??;
        let (reader, mut writer) = stream.into_split();

        let hello = Frame::Hello {
            from: self.peer_id.clone(),
            chan: self.channel.clone(),
        };
        writer.write_all(&hello.encode()?).await?;

        let conn = self.conn_id();
        self.conns
            .lock()
            .await
            .insert(member.peer_id.clone(), (conn, writer));
        tokio::spawn(
            self.clone()
                .read_loop(conn, reader, None, Some(member.peer_id.clone())),
        );
        println!(
            "[{}] connected to {} at {}:{}",
            self.peer_id, member.peer_id, member.host, member.port
        );
        Ok(())
    }

    async fn read_loop(
        self: Arc<Self>,
        conn: u64,
        reader: OwnedReadHalf,
        mut pending_writer: Option<OwnedWriteHalf>,
        mut remote: Option<String>,
    ) {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            // Unparsable lines are skipped.
            let Ok(frame) = serde_json::from_str::<Frame>(&line) else {
                continue;
            };
            match frame {
                Frame::Hello { from, .. } => {
                    if let Some(writer) = pending_writer.take() {
                        self.conns.lock().await.insert(from.clone(), (conn, writer));
                    }
                    remote = Some(from);
                }
                Frame::Msg { from, text, .. } => println!("\r[{}] {}", from, text),
            }
        }

        if let Some(id) = remote {
            let mut conns = self.conns.lock().await;
            if conns.get(&id).is_some_and(|(owner, _)| *owner == conn) {
                conns.remove(&id);
            }
        }
    }

    /// Send a chat line to every open connection. Dead ones are dropped.
    async fn broadcast(&self, text: &str) -> Result<()> {
        let frame = Frame::Msg {
            chan: self.channel.clone(),
            from: self.peer_id.clone(),
            text: text.to_string(),
            ts: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0),
        };
        let bytes = frame.encode()?;

        let mut conns = self.conns.lock().await;
        let mut dead = Vec::new();
        for (id, (_, writer)) in conns.iter_mut() {
            if writer.write_all(&bytes).await.is_err() {
                dead.push(id.clone());
            }
        }
        for id in dead {
            conns.remove(&id);
        }

        println!("[{}] {}", self.peer_id, text);
        Ok(())
    }
}
