//! Relay request and response types
//!
//! Requests are JSON objects tagged by `type`. The two variants use different
//! field casing because that is what browsers and the agent already speak:
//! `initializeSession` carries `userId`/`sessionId`, `sendMessage` carries the
//! agent's own snake_case `/run` fields. `new_message` is opaque to the relay
//! and reaches the agent exactly as the caller sent it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::error::RelayError;
use crate::agent::{Message, SessionId};

pub(crate) const MISSING_INIT_FIELDS: &str = "Missing userId or sessionId for session initialization.";
pub(crate) const MISSING_SEND_FIELDS: &str = "Missing required fields for sending message.";
pub(crate) const INVALID_REQUEST_TYPE: &str = "Invalid request type provided.";

const INITIALIZE_SESSION: &str = "initializeSession";
const SEND_MESSAGE: &str = "sendMessage";

/// Requests accepted by the relay
///
/// Fields are optional at decode time so that a missing field is reported as
/// such instead of as an undecodable body; see [`RelayRequest::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RelayRequest {
    /// Register a session id with the agent
    #[serde(rename = "initializeSession")]
    InitializeSession {
        #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,

        #[serde(rename = "sessionId", default, skip_serializing_if = "Option::is_none")]
        session_id: Option<String>,
    },

    /// Forward a user message to the agent's `/run` endpoint
    #[serde(rename = "sendMessage")]
    SendMessage {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        app_name: Option<String>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_id: Option<String>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_message: Option<Value>,
    },
}

impl RelayRequest {
    pub fn initialize_session(user_id: impl Into<String>, session_id: &SessionId) -> Self {
        Self::InitializeSession {
            user_id: Some(user_id.into()),
            session_id: Some(session_id.to_string()),
        }
    }

    pub fn send_message(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        session_id: &SessionId,
        new_message: Message,
    ) -> Self {
        // Message has only string keys; a failure here would surface as a missing field
        let new_message = serde_json::to_value(new_message).ok();
        Self::SendMessage {
            app_name: Some(app_name.into()),
            user_id: Some(user_id.into()),
            session_id: Some(session_id.to_string()),
            new_message,
        }
    }

    /// Decode a raw request body
    ///
    /// Unknown `type` values and bodies that are not request objects are both
    /// rejected as an invalid request type. A known `type` whose fields have
    /// the wrong JSON type is reported as missing those fields.
    pub fn from_slice(body: &[u8]) -> Result<Self, RelayError> {
        let value: Value = serde_json::from_slice(body).map_err(|e| {
            debug!(error = %e, "RelayRequest::from_slice: body is not JSON");
            RelayError::Validation(INVALID_REQUEST_TYPE.to_string())
        })?;
        let kind = value.get("type").and_then(Value::as_str).map(str::to_string);

        serde_json::from_value(value).map_err(|e| {
            debug!(error = %e, ?kind, "RelayRequest::from_slice: rejecting body");
            let message = match kind.as_deref() {
                Some(INITIALIZE_SESSION) => MISSING_INIT_FIELDS,
                Some(SEND_MESSAGE) => MISSING_SEND_FIELDS,
                _ => INVALID_REQUEST_TYPE,
            };
            RelayError::Validation(message.to_string())
        })
    }

    /// Check required fields and produce the upstream call to make
    ///
    /// Empty strings and a null `new_message` count as missing.
    pub fn validate(self) -> Result<UpstreamCall, RelayError> {
        match self {
            RelayRequest::InitializeSession { user_id, session_id } => {
                match (present(user_id), present(session_id)) {
                    (Some(user_id), Some(session_id)) => Ok(UpstreamCall::InitializeSession { user_id, session_id }),
                    _ => Err(RelayError::Validation(MISSING_INIT_FIELDS.to_string())),
                }
            }
            RelayRequest::SendMessage {
                app_name,
                user_id,
                session_id,
                new_message,
            } => match (present(app_name), present(user_id), present(session_id), new_message) {
                (Some(app_name), Some(user_id), Some(session_id), Some(new_message)) => {
                    Ok(UpstreamCall::Run(RunRequest {
                        app_name,
                        user_id,
                        session_id,
                        new_message,
                    }))
                }
                _ => Err(RelayError::Validation(MISSING_SEND_FIELDS.to_string())),
            },
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// A validated request, ready to go upstream
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamCall {
    InitializeSession { user_id: String, session_id: String },
    Run(RunRequest),
}

/// Body of the agent's `POST /run`
///
/// `new_message` is forwarded without being reshaped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
    pub new_message: Value,
}

/// What the relay answers: a status code and a JSON body
///
/// For forwarded calls both come from the agent. For local failures the body
/// is `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayResponse {
    pub status: u16,
    pub body: Value,
}

impl RelayResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Build a local error envelope
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: serde_json::json!({ "error": message.into() }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Reason carried by a failure body
    ///
    /// Looks at the relay's own `error` field first, then the agent's `detail`.
    /// None when the body is not an object or has neither.
    pub fn error_message(&self) -> Option<String> {
        let body = self.body.as_object()?;
        if let Some(error) = body.get("error").and_then(|v| v.as_str()) {
            return Some(error.to_string());
        }
        match body.get("detail") {
            Some(Value::String(detail)) => Some(detail.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        }
    }
}
