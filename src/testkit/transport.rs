//! In-memory [`Transport`] that records requests instead of sending them.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::TransportError;
use crate::port::Transport;

/// One captured request.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Json {
        channel: String,
        url: String,
        body: Value,
    },
    Form {
        channel: String,
        url: String,
        params: Vec<(String, String)>,
    },
}

impl Request {
    pub fn url(&self) -> &str {
        match self {
            Self::Json { url, .. } | Self::Form { url, .. } => url,
        }
    }

    /// JSON body, if this was a JSON request.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Json { body, .. } => Some(body),
            Self::Form { .. } => None,
        }
    }

    /// First value of form parameter `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        match self {
            Self::Form { params, .. } => params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            Self::Json { .. } => None,
        }
    }
}

/// Records requests and answers them with scripted statuses.
///
/// Each request pops the next status (default 200); statuses outside
/// `200..300` come back as [`TransportError::BadStatus`].
#[derive(Debug, Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<Request>>,
    statuses: Mutex<VecDeque<u16>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue response statuses for upcoming requests.
    pub fn with_statuses(self, statuses: &[u16]) -> Self {
        self.statuses.lock().extend(statuses.iter().copied());
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().clone()
    }

    pub fn last(&self) -> Option<Request> {
        self.requests.lock().last().cloned()
    }

    fn answer(&self, channel: &str, request: Request) -> Result<(), TransportError> {
        self.requests.lock().push(request);
        let status = self.statuses.lock().pop_front().unwrap_or(200);
        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(TransportError::BadStatus {
                channel: channel.to_string(),
                status,
                body: "recorded failure".into(),
            })
        }
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn post_json(&self, channel: &str, url: &str, body: &Value) -> Result<(), TransportError> {
        self.answer(
            channel,
            Request::Json {
                channel: channel.to_string(),
                url: url.to_string(),
                body: body.clone(),
            },
        )
    }

    async fn post_form(
        &self,
        channel: &str,
        url: &str,
        params: &[(String, String)],
    ) -> Result<(), TransportError> {
        self.answer(
            channel,
            Request::Form {
                channel: channel.to_string(),
                url: url.to_string(),
                params: params.to_vec(),
            },
        )
    }
}
