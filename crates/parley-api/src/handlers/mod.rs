//! HTTP API handlers: exposes broker operations as JSON.

pub mod channels;
pub mod messages;
pub mod peers;
pub mod status;

use std::time::{Duration, Instant};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};

use parley_core::config::GateConfig;
use parley_core::{Access, BrokerError};
use parley_services::Broker;

#[derive(Clone)]
pub struct ApiState {
    pub broker: Broker,
    pub gate: GateConfig,
    /// Cap applied to client-requested long-poll waits.
    pub max_sync_wait: Duration,
    pub started_at: Instant,
    /// Shutdown broadcast sender. Signals graceful daemon shutdown.
    pub shutdown_tx: tokio::sync::broadcast::Sender<()>,
}

impl ApiState {
    pub fn new(broker: Broker, gate: GateConfig, max_sync_wait: Duration) -> Self {
        let (shutdown_tx, _) = tokio::sync::broadcast::channel(1);
        Self {
            broker,
            gate,
            max_sync_wait,
            started_at: Instant::now(),
            shutdown_tx,
        }
    }
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Derive the caller's credential from the request's cookies.
///
/// Authorized when the gate is off, or when any `Cookie` header carries the
/// configured `name=value` pair.
fn access(state: &ApiState, headers: &HeaderMap) -> Access {
    if !state.gate.required {
        return Access::Granted;
    }
    let wanted = state.gate.cookie.trim();
    let granted = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .any(|pair| pair.trim() == wanted);
    if !granted {
        tracing::debug!("request rejected by access gate");
    }
    Access::from(granted)
}

/// Gate extractor. Listed before any body extractor, so a request without
/// the credential is refused with 401 before its body is parsed.
pub struct Caller(pub Access);

impl FromRequestParts<ApiState> for Caller {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Self, Self::Rejection> {
        match access(state, &parts.headers) {
            Access::Granted => Ok(Caller(Access::Granted)),
            Access::Denied => Err(reject(BrokerError::AccessDenied)),
        }
    }
}

/// Map a broker failure to an HTTP status and message.
fn reject(err: BrokerError) -> (StatusCode, String) {
    let status = match err {
        BrokerError::AccessDenied => StatusCode::UNAUTHORIZED,
        BrokerError::ChannelNotFound(_) | BrokerError::PeerNotFound(_) => StatusCode::NOT_FOUND,
        BrokerError::NotAMember { .. } => StatusCode::FORBIDDEN,
        BrokerError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
    };
    (status, err.to_string())
}

// Re-export handler functions for use in router setup.
pub use channels::{handle_channel_create, handle_channel_join, handle_channel_members};
pub use messages::{handle_post_message, handle_sync};
pub use peers::{handle_peer_register, handle_peers};
pub use status::{handle_login, handle_shutdown, handle_status};
