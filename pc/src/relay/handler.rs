//! Relay request handling
//!
//! Stateless: every call validates, makes at most one upstream request and
//! returns a `RelayResponse`. Nothing escapes as an error.

use std::time::Duration;

use reqwest::{Client, Url};
use tracing::{debug, error};

use super::error::RelayError;
use super::messages::{RelayRequest, RelayResponse, UpstreamCall};
use crate::config::Config;

const MISSING_BASE_URL: &str = "API base URL is missing.";

/// Forwards validated requests to the planning agent API
pub struct Relay {
    base_url: Option<String>,
    app_name: String,
    http: Client,
}

impl Relay {
    /// Create a relay
    ///
    /// A missing base URL is not an error here; each request reports it.
    pub fn new(base_url: Option<String>, app_name: impl Into<String>, timeout: Duration) -> Result<Self, RelayError> {
        let app_name = app_name.into();
        debug!(?base_url, %app_name, ?timeout, "Relay::new: called");
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            app_name,
            http,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, RelayError> {
        Self::new(
            config.relay.resolve_base_url(),
            config.agent.app_name.clone(),
            config.relay.timeout(),
        )
    }

    /// Whether an agent API base URL is available
    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// Handle a decoded request
    pub async fn handle(&self, request: RelayRequest) -> RelayResponse {
        debug!(?request, "Relay::handle: called");
        let result = match self.base_url() {
            Ok(base) => match request.validate() {
                Ok(call) => self.forward(base, call).await,
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };
        self.finish(result)
    }

    /// Handle a raw JSON request body
    ///
    /// Configuration is checked before the body is looked at.
    pub async fn handle_body(&self, body: &[u8]) -> RelayResponse {
        debug!(body_len = body.len(), "Relay::handle_body: called");
        let result = match self.base_url() {
            Ok(base) => match RelayRequest::from_slice(body).and_then(RelayRequest::validate) {
                Ok(call) => self.forward(base, call).await,
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };
        self.finish(result)
    }

    fn finish(&self, result: Result<RelayResponse, RelayError>) -> RelayResponse {
        match result {
            Ok(response) => response,
            Err(e) => {
                match &e {
                    RelayError::Validation(msg) => debug!(%msg, "Relay: rejected request"),
                    RelayError::Configuration(msg) => error!(%msg, "Relay: configuration error"),
                    RelayError::Transport(_) | RelayError::Decode(_) => error!(error = %e, "Relay: unexpected error"),
                }
                e.to_response()
            }
        }
    }

    fn base_url(&self) -> Result<&str, RelayError> {
        self.base_url
            .as_deref()
            .ok_or_else(|| RelayError::Configuration(MISSING_BASE_URL.to_string()))
    }

    /// Build `{base}/{segments...}`, escaping each segment
    fn endpoint(&self, base: &str, segments: &[&str]) -> Result<Url, RelayError> {
        let mut url = Url::parse(base)
            .map_err(|e| RelayError::Configuration(format!("API base URL is invalid ({}).", e)))?;
        url.path_segments_mut()
            .map_err(|_| RelayError::Configuration("API base URL cannot carry a path.".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn forward(&self, base: &str, call: UpstreamCall) -> Result<RelayResponse, RelayError> {
        match call {
            UpstreamCall::InitializeSession { user_id, session_id } => {
                let url = self.endpoint(
                    base,
                    &[
                        "apps",
                        self.app_name.as_str(),
                        "users",
                        user_id.as_str(),
                        "sessions",
                        session_id.as_str(),
                    ],
                )?;
                debug!(%url, "Relay::forward: initializing session");
                let response = self
                    .http
                    .post(url)
                    .header("content-type", "application/json")
                    .send()
                    .await?;
                self.relay_response(response, "session init").await
            }
            UpstreamCall::Run(run) => {
                let url = self.endpoint(base, &["run"])?;
                debug!(%url, app_name = %run.app_name, session_id = %run.session_id, "Relay::forward: sending message");
                let response = self.http.post(url).json(&run).send().await?;
                self.relay_response(response, "run").await
            }
        }
    }

    /// Turn the upstream answer into a relay response
    ///
    /// Failure bodies are parsed best-effort and replaced by `{}` so the caller
    /// always gets JSON. A success body that is not JSON is an error.
    async fn relay_response(&self, response: reqwest::Response, operation: &str) -> Result<RelayResponse, RelayError> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = serde_json::from_str(&text).unwrap_or_else(|_| serde_json::json!({}));
            error!(%operation, status = status.as_u16(), %body, "External API call failed");
            return Ok(RelayResponse::new(status.as_u16(), body));
        }

        let bytes = response.bytes().await?;
        let body: serde_json::Value = serde_json::from_slice(&bytes)?;
        debug!(%operation, status = status.as_u16(), "Relay::relay_response: success");
        Ok(RelayResponse::new(status.as_u16(), body))
    }
}
