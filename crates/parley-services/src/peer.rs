//! Peer registry: maps peer ids to the address they advertise.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parley_core::{BrokerError, BrokerResult, PeerAddr, PeerId};

use crate::now_ms;

/// Tracked state for a registered peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerEntry {
    /// Current advertised address. Re-registration overwrites it.
    pub addr: PeerAddr,
    /// Unix ms of the first registration.
    pub registered_at: u64,
    /// Unix ms of the most recent registration.
    pub last_seen: u64,
}

/// The peer registry. Cheap to clone; clones share the same map.
///
/// Each key is updated atomically, so concurrent re-registrations of one
/// peer resolve to exactly one of the submitted addresses.
#[derive(Clone, Default)]
pub struct PeerRegistry {
    peers: Arc<DashMap<PeerId, PeerEntry>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or overwrite a peer's address (last write wins).
    ///
    /// Returns true if the peer was not registered before.
    pub fn register(&self, peer: PeerId, addr: PeerAddr) -> BrokerResult<bool> {
        if peer.is_empty() {
            return Err(BrokerError::InvalidArgument(
                "peer_id must not be empty".to_string(),
            ));
        }
        if addr.host.is_empty() {
            return Err(BrokerError::InvalidArgument(
                "host must not be empty".to_string(),
            ));
        }

        let now = now_ms();
        match self.peers.entry(peer) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                entry.addr = addr;
                entry.last_seen = now;
                Ok(false)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(PeerEntry {
                    addr,
                    registered_at: now,
                    last_seen: now,
                });
                Ok(true)
            }
        }
    }

    /// Current address of a peer.
    pub fn lookup(&self, peer: &PeerId) -> BrokerResult<PeerAddr> {
        self.peers
            .get(peer)
            .map(|e| e.addr.clone())
            .ok_or_else(|| BrokerError::PeerNotFound(peer.to_string()))
    }

    /// Full entry for a peer, if registered.
    pub fn get(&self, peer: &PeerId) -> Option<PeerEntry> {
        self.peers.get(peer).map(|e| e.clone())
    }

    pub fn contains(&self, peer: &PeerId) -> bool {
        self.peers.contains_key(peer)
    }

    /// All registered peers, sorted by id.
    pub fn list(&self) -> Vec<(PeerId, PeerEntry)> {
        let mut peers: Vec<_> = self
            .peers
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        peers.sort_by(|a, b| a.0.cmp(&b.0));
        peers
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
