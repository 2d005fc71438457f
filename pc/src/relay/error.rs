//! Relay error types

use thiserror::Error;

use super::messages::RelayResponse;

/// Message returned for failures whose details stay in the log
pub(crate) const UNEXPECTED_ERROR: &str = "An unexpected error occurred in the proxy.";

/// Errors that end a relay request before an upstream answer is forwarded
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Server configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid upstream response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RelayError {
    /// HTTP status reported to the caller
    pub fn status(&self) -> u16 {
        match self {
            RelayError::Configuration(_) => 500,
            RelayError::Validation(_) => 400,
            RelayError::Transport(_) => 500,
            RelayError::Decode(_) => 500,
        }
    }

    /// Text safe to hand back to the caller
    pub fn public_message(&self) -> String {
        match self {
            RelayError::Configuration(_) | RelayError::Validation(_) => self.to_string(),
            RelayError::Transport(_) | RelayError::Decode(_) => UNEXPECTED_ERROR.to_string(),
        }
    }

    /// Convert into the `{error}` envelope
    pub fn to_response(&self) -> RelayResponse {
        RelayResponse::error(self.status(), self.public_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(RelayError::Configuration("x".to_string()).status(), 500);
        assert_eq!(RelayError::Validation("x".to_string()).status(), 400);

        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(RelayError::Decode(decode).status(), 500);
    }

    #[test]
    fn test_configuration_message_is_public() {
        let err = RelayError::Configuration("API base URL is missing.".to_string());
        assert_eq!(
            err.public_message(),
            "Server configuration error: API base URL is missing."
        );
    }

    #[test]
    fn test_decode_details_are_hidden() {
        let decode = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err = RelayError::Decode(decode);
        let resp = err.to_response();
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body["error"], UNEXPECTED_ERROR);
        assert!(!resp.body["error"].as_str().unwrap().contains("html"));
    }
}
