//! HTTP relay client
//!
//! Talks to a relay started with `pc serve` (or any compatible endpoint).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{ClientError, RelayClient};
use crate::relay::{RelayRequest, RelayResponse};

/// Client for a remote relay's `POST /api/proxy`
pub struct HttpRelayClient {
    endpoint: String,
    http: Client,
}

impl HttpRelayClient {
    /// Create a client for the relay rooted at `relay_url`
    pub fn new(relay_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let endpoint = format!("{}/api/proxy", relay_url.trim_end_matches('/'));
        debug!(%endpoint, ?timeout, "HttpRelayClient::new: called");
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { endpoint, http })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn call(&self, request: &RelayRequest) -> Result<RelayResponse, ClientError> {
        debug!(endpoint = %self.endpoint, "HttpRelayClient::call: called");
        let response = self.http.post(&self.endpoint).json(request).send().await?;

        let status = response.status().as_u16();
        let text = response.text().await?;

        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(body) => Ok(RelayResponse::new(status, body)),
            Err(e) if (200..300).contains(&status) => Err(ClientError::InvalidResponse(format!(
                "relay returned a non-JSON body: {}",
                e
            ))),
            Err(_) => {
                // Error envelope lost in transit; callers fall back to a generic message
                debug!(status, "HttpRelayClient::call: non-JSON error body");
                Ok(RelayResponse::new(status, serde_json::Value::Null))
            }
        }
    }
}
