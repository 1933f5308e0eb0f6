//! Outbound HTTP port used by channel adapters.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;

/// Minimal HTTP surface the channels need.
///
/// `channel` labels errors so a failure can be traced back to the channel
/// that made the request.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST a JSON body.
    async fn post_json(&self, channel: &str, url: &str, body: &Value) -> Result<(), TransportError>;

    /// POST a url-encoded form.
    async fn post_form(
        &self,
        channel: &str,
        url: &str,
        params: &[(String, String)],
    ) -> Result<(), TransportError>;
}
