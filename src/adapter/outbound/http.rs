//! `reqwest`-backed [`Transport`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, TransportError};
use crate::port::Transport;

/// Total time allowed for one request, connect included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared HTTP client for every channel.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a client with [`REQUEST_TIMEOUT`].
    pub fn new() -> Result<Self> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("streamwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    async fn execute(&self, channel: &str, request: RequestBuilder) -> std::result::Result<(), TransportError> {
        let response = request.send().await.map_err(|source| TransportError::Request {
            channel: channel.to_string(),
            source,
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(channel, status = status.as_u16(), "Request accepted");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(TransportError::BadStatus {
            channel: channel.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, channel: &str, url: &str, body: &Value) -> std::result::Result<(), TransportError> {
        self.execute(channel, self.client.post(url).json(body)).await
    }

    async fn post_form(
        &self,
        channel: &str,
        url: &str,
        params: &[(String, String)],
    ) -> std::result::Result<(), TransportError> {
        self.execute(channel, self.client.post(url).form(params)).await
    }
}
