//! Outbound ports: things the dispatcher calls out to.

pub mod channel;
pub mod entity;
pub mod transport;
