//! Discovery handoff: resolve a channel's members to dialable addresses.
//!
//! A client that wants to leave broker-relayed messaging fetches this list,
//! opens direct connections, and stops polling. The broker keeps no record
//! of which peers have gone direct.

use parley_core::{BrokerResult, PeerAddr, PeerId};
use serde::Serialize;

use crate::channel_store::ChannelStore;
use crate::peer::PeerRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub peer_id: PeerId,
    #[serde(flatten)]
    pub addr: PeerAddr,
}

/// Every member of `name` with its current registered address, sorted by id.
pub fn resolve_members(
    channels: &ChannelStore,
    registry: &PeerRegistry,
    name: &str,
) -> BrokerResult<Vec<Member>> {
    let members = channels
        .members(name)?
        .into_iter()
        // join only admits registered peers and peers are never removed
        .filter_map(|peer_id| {
            let addr = registry.lookup(&peer_id).ok()?;
            Some(Member { peer_id, addr })
        })
        .collect();
    Ok(members)
}
