//! Outbound adapters: channel implementations and the HTTP transport.

pub mod channel;
pub mod http;
