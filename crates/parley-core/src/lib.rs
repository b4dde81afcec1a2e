//! parley-core: shared types, error taxonomy, and configuration.
//! All other Parley crates depend on this one.

pub mod config;
pub mod error;
pub mod types;

pub use error::{BrokerError, BrokerResult};
pub use types::{Access, Message, PeerAddr, PeerId};
