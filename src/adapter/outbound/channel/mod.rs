//! Channel adapters.
//!
//! Each adapter implements [`Channel`](crate::port::Channel) on top of the
//! shared [`ChannelSettings`](crate::application::channel::ChannelSettings).

pub mod discord;
pub mod log;
pub mod pushover;
#[cfg(feature = "telegram")]
pub mod telegram;

pub use discord::DiscordChannel;
pub use log::LogChannel;
pub use pushover::PushoverChannel;
#[cfg(feature = "telegram")]
pub use telegram::TelegramChannel;
