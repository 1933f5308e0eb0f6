//! Infrastructure configuration modules.

pub mod dispatcher;
pub mod logging;
pub mod settings;
