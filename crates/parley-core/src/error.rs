//! Broker error taxonomy.
//!
//! Every variant is terminal for the request that produced it. The broker
//! never retries and never leaves a partially applied mutation behind.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    /// The caller's credential was absent or false.
    #[error("access denied")]
    AccessDenied,

    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    #[error("peer not found: {0}")]
    PeerNotFound(String),

    /// Posting requires a prior join.
    #[error("peer {peer} is not a member of channel {channel}")]
    NotAMember { channel: String, peer: String },

    /// Empty identifiers and similar malformed input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type BrokerResult<T> = std::result::Result<T, BrokerError>;
