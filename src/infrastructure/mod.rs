//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic: configuration, entity storage and component wiring.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading and validation
//! - [`entity`] - In-memory entity store
//! - [`factory`] - Component factory functions

pub mod bootstrap;
pub mod config;
pub mod entity;
pub mod factory;
