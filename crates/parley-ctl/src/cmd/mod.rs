//! CLI command modules.

pub mod channels;
pub mod chat;
pub mod direct;
pub mod http;
pub mod messages;
pub mod peers;
pub mod status;
