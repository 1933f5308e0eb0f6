//! Inbound adapters: the ways alerts enter the process.

pub mod cli;
