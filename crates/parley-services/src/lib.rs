//! parley-services: broker state and the operations over it.

pub mod broker;
pub mod channel_store;
pub mod discovery;
pub mod peer;
pub mod sync;

pub use broker::{Broker, BrokerStats};
pub use channel_store::ChannelStore;
pub use discovery::{resolve_members, Member};
pub use peer::{PeerEntry, PeerRegistry};
pub use sync::SyncBatch;

use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
