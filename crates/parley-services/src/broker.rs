//! Broker: the single entry point the transport front end calls.
//!
//! Every operation checks the caller's [`Access`] before touching state.
//! The broker owns the peer registry and channel store; it is built once at
//! startup and handed to request handlers as a cheaply cloneable handle.

use std::time::Duration;

use parley_core::{Access, BrokerError, BrokerResult, PeerAddr, PeerId};

use crate::channel_store::ChannelStore;
use crate::discovery::{resolve_members, Member};
use crate::peer::{PeerEntry, PeerRegistry};
use crate::sync::SyncBatch;

/// Point-in-time counters for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerStats {
    pub peers: usize,
    pub channels: usize,
    pub messages: usize,
}

#[derive(Clone, Default)]
pub struct Broker {
    peers: PeerRegistry,
    channels: ChannelStore,
}

fn gate(access: Access) -> BrokerResult<()> {
    if access.is_granted() {
        Ok(())
    } else {
        Err(BrokerError::AccessDenied)
    }
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, access: Access, peer: PeerId, addr: PeerAddr) -> BrokerResult<()> {
        gate(access)?;
        let label = peer.to_string();
        let shown = addr.to_string();
        if self.peers.register(peer, addr)? {
            tracing::info!(peer = %label, addr = %shown, "peer registered");
        } else {
            tracing::debug!(peer = %label, addr = %shown, "peer re-registered");
        }
        Ok(())
    }

    pub fn lookup(&self, access: Access, peer: &PeerId) -> BrokerResult<PeerAddr> {
        gate(access)?;
        self.peers.lookup(peer)
    }

    /// All registered peers with their entries.
    pub fn peers(&self, access: Access) -> BrokerResult<Vec<(PeerId, PeerEntry)>> {
        gate(access)?;
        Ok(self.peers.list())
    }

    pub fn create(&self, access: Access, name: &str) -> BrokerResult<()> {
        gate(access)?;
        if self.channels.create(name)? {
            tracing::info!(channel = name, "channel created");
        }
        Ok(())
    }

    pub fn join(&self, access: Access, name: &str, peer: &PeerId) -> BrokerResult<()> {
        gate(access)?;
        if self.channels.join(name, peer, &self.peers)? {
            tracing::info!(channel = name, peer = %peer, "peer joined channel");
        }
        Ok(())
    }

    /// Append to a channel log. Returns the assigned position.
    pub fn post(&self, access: Access, name: &str, peer: &PeerId, text: &str) -> BrokerResult<u64> {
        gate(access)?;
        let position = self.channels.append(name, peer, text)?;
        tracing::debug!(channel = name, peer = %peer, position, "message appended");
        Ok(position)
    }

    pub fn sync(&self, access: Access, name: &str, after: u64) -> BrokerResult<SyncBatch> {
        gate(access)?;
        self.channels.sync(name, after)
    }

    /// Long-poll sync; see [`ChannelStore::sync_wait`].
    pub async fn sync_wait(
        &self,
        access: Access,
        name: &str,
        after: u64,
        wait: Duration,
    ) -> BrokerResult<SyncBatch> {
        gate(access)?;
        self.channels.sync_wait(name, after, wait).await
    }

    /// Discovery handoff: every member of a channel and its address.
    pub fn members(&self, access: Access, name: &str) -> BrokerResult<Vec<Member>> {
        gate(access)?;
        resolve_members(&self.channels, &self.peers, name)
    }

    /// Ungated counters for health and status endpoints.
    pub fn stats(&self) -> BrokerStats {
        BrokerStats {
            peers: self.peers.len(),
            channels: self.channels.len(),
            messages: self.channels.message_count(),
        }
    }
}
