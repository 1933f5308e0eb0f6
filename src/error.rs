use thiserror::Error;

use crate::domain::entity::EntityId;
use crate::domain::event::EventType;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field '{field}' for {channel} ({scope}, {event} alerts)")]
    MissingField {
        channel: &'static str,
        scope: String,
        event: String,
        field: &'static str,
    },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidValue`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Failures talking to a channel's remote endpoint.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("{channel} request failed: {source}")]
    Request {
        channel: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{channel} responded with status {status}: {body}")]
    BadStatus {
        channel: String,
        status: u16,
        body: String,
    },
}

/// Malformed placeholder syntax in a message template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unclosed '{{' at position {position}")]
    Unclosed { position: usize },

    #[error("unknown placeholder '{0}'")]
    UnknownSymbol(String),

    #[error("invalid expression '{expression}': {reason}")]
    Syntax { expression: String, reason: String },
}

/// One channel's failure inside a delivery unit.
#[derive(Debug)]
pub struct ChannelFailure {
    pub channel: String,
    pub error: Error,
}

/// A delivery unit that finished with at least one failed channel.
///
/// Sibling channels that succeeded are not represented here; the unit
/// still ran every channel to completion.
#[derive(Error, Debug)]
#[error("{event} alert for {entity} failed on {}{}", first_failure(.failures), more_failures(.failures))]
pub struct DeliveryError {
    pub entity: EntityId,
    pub event: EventType,
    pub failures: Vec<ChannelFailure>,
}

fn first_failure(failures: &[ChannelFailure]) -> String {
    failures
        .first()
        .map(|f| format!("{}: {}", f.channel, f.error))
        .unwrap_or_else(|| "unknown channel".to_string())
}

fn more_failures(failures: &[ChannelFailure]) -> String {
    match failures.len() {
        0 | 1 => String::new(),
        n => format!(" (+{} more)", n - 1),
    }
}

impl DeliveryError {
    /// Whether the process should shut down because of this failure.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.failures.iter().any(|f| f.error.is_fatal())
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Delivery(Box<DeliveryError>),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("delivery task failed: {0}")]
    Task(String),
}

impl Error {
    /// Process-level policy for surfaced errors.
    ///
    /// Configuration problems and 4xx responses (bad credentials, rejected
    /// payloads) will not fix themselves; everything else is logged and the
    /// process keeps running.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Config(_) => true,
            Self::Transport(TransportError::BadStatus { status, .. }) => (400..500).contains(status),
            Self::Delivery(e) => e.is_fatal(),
            _ => false,
        }
    }
}

impl From<DeliveryError> for Error {
    fn from(err: DeliveryError) -> Self {
        Error::Delivery(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
