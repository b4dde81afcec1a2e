//! Channel store: named channels with a member set and an append-only log.
//!
//! The channel table is a concurrent map of handles. Each handle guards its
//! own log and membership with one lock, so channels never contend with each
//! other and appends to a single channel are serialized.

use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parley_core::{BrokerError, BrokerResult, Message, PeerId};
use tokio::sync::watch;

use crate::now_ms;
use crate::peer::PeerRegistry;

#[derive(Default)]
pub(crate) struct ChannelState {
    pub(crate) members: BTreeSet<PeerId>,
    /// `log[i].position == i + 1`.
    pub(crate) log: Vec<Message>,
}

pub(crate) struct ChannelHandle {
    state: RwLock<ChannelState>,
    /// Highest committed position. Long-poll readers wait on this.
    pub(crate) head: watch::Sender<u64>,
}

impl ChannelHandle {
    fn new() -> Self {
        let (head, _) = watch::channel(0);
        Self {
            state: RwLock::new(ChannelState::default()),
            head,
        }
    }

    // Every mutation completes before its guard drops, so a poisoned lock
    // still holds a consistent log.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, ChannelState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ChannelState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-memory channel store. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct ChannelStore {
    channels: Arc<DashMap<String, Arc<ChannelHandle>>>,
}

impl ChannelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a channel if absent. Returns true if it was newly created.
    pub fn create(&self, name: &str) -> BrokerResult<bool> {
        if name.is_empty() {
            return Err(BrokerError::InvalidArgument(
                "channel name must not be empty".to_string(),
            ));
        }
        match self.channels.entry(name.to_string()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::new(ChannelHandle::new()));
                Ok(true)
            }
        }
    }

    /// Add a registered peer to a channel's member set.
    ///
    /// Returns true if the peer was not already a member.
    pub fn join(&self, name: &str, peer: &PeerId, registry: &PeerRegistry) -> BrokerResult<bool> {
        let handle = self.handle(name)?;
        if !registry.contains(peer) {
            return Err(BrokerError::PeerNotFound(peer.to_string()));
        }
        let inserted = handle.write().members.insert(peer.clone());
        Ok(inserted)
    }

    /// Append a message and return its assigned position.
    ///
    /// The position is computed and the message stored under the channel's
    /// write lock, so log order equals commit order.
    pub fn append(&self, name: &str, peer: &PeerId, text: &str) -> BrokerResult<u64> {
        let handle = self.handle(name)?;
        let mut state = handle.write();
        if !state.members.contains(peer) {
            return Err(BrokerError::NotAMember {
                channel: name.to_string(),
                peer: peer.to_string(),
            });
        }

        let position = state.log.len() as u64 + 1;
        state.log.push(Message {
            position,
            author: peer.clone(),
            text: text.to_string(),
            timestamp: now_ms(),
        });
        handle.head.send_replace(position);
        Ok(position)
    }

    /// Current members of a channel, sorted by id.
    pub fn members(&self, name: &str) -> BrokerResult<Vec<PeerId>> {
        let handle = self.handle(name)?;
        let members = handle.read().members.iter().cloned().collect();
        Ok(members)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    /// Channel names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Total messages across all channels.
    pub fn message_count(&self) -> usize {
        self.channels.iter().map(|e| e.value().read().log.len()).sum()
    }

    /// Clone the channel's handle out of the map so no map shard stays
    /// locked while the channel lock is held.
    pub(crate) fn handle(&self, name: &str) -> BrokerResult<Arc<ChannelHandle>> {
        self.channels
            .get(name)
            .map(|h| h.value().clone())
            .ok_or_else(|| BrokerError::ChannelNotFound(name.to_string()))
    }
}
