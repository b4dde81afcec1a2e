//! Sync cursor protocol: the read side of a channel log.
//!
//! Clients hold the cursor. The server is asked for "messages after P" and
//! keeps no per-client state, so repeating a call with the same cursor is
//! always safe.

use std::time::Duration;

use parley_core::{BrokerResult, Message};
use serde::Serialize;

use crate::channel_store::{ChannelHandle, ChannelStore};

/// Result of a sync call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncBatch {
    /// Messages with position strictly greater than the cursor, ascending.
    pub messages: Vec<Message>,
    /// Highest position returned, or the caller's cursor if nothing is new.
    pub new_after: u64,
}

impl SyncBatch {
    fn read(handle: &ChannelHandle, after: u64) -> Self {
        let state = handle.read();
        // Positions are gapless from 1, so position P sits at index P - 1.
        let start = usize::try_from(after).unwrap_or(usize::MAX);
        let messages = state.log.get(start..).map(<[Message]>::to_vec).unwrap_or_default();
        let new_after = messages.last().map(|m| m.position).unwrap_or(after);
        Self {
            messages,
            new_after,
        }
    }
}

impl ChannelStore {
    /// All messages after `after` plus the new high-water mark. Pure read.
    pub fn sync(&self, name: &str, after: u64) -> BrokerResult<SyncBatch> {
        let handle = self.handle(name)?;
        Ok(SyncBatch::read(&handle, after))
    }

    /// Long-poll variant of [`sync`](Self::sync).
    ///
    /// Answers immediately when something is already past the cursor.
    /// Otherwise waits for the next append to this channel or for `wait` to
    /// elapse, then answers exactly as `sync` would at that moment.
    pub async fn sync_wait(&self, name: &str, after: u64, wait: Duration) -> BrokerResult<SyncBatch> {
        let handle = self.handle(name)?;
        let mut head = handle.head.subscribe();

        let batch = SyncBatch::read(&handle, after);
        if !batch.messages.is_empty() || wait.is_zero() {
            return Ok(batch);
        }

        let woke = tokio::time::timeout(wait, head.wait_for(|&h| h > after))
            .await
            .is_ok();
        tracing::trace!(channel = name, after, woke, "long-poll finished");

        Ok(SyncBatch::read(&handle, after))
    }
}
