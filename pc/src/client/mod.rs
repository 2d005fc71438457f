//! Relay client module
//!
//! The chat side reaches the relay through [`RelayClient`], either over HTTP
//! or in-process.

use std::sync::Arc;

use tracing::debug;

mod api;
mod error;
mod http;
mod local;

pub use api::RelayClient;
#[cfg(test)]
pub use api::mock;
pub use error::ClientError;
pub use http::HttpRelayClient;

use crate::config::Config;
use crate::relay::Relay;

/// Create the relay client the configuration asks for
///
/// With `client.relay-url` set, requests go over HTTP; otherwise an
/// in-process relay is built from the `relay` section.
pub fn create_client(config: &Config) -> eyre::Result<Arc<dyn RelayClient>> {
    match config.client.relay_url.as_deref() {
        Some(url) => {
            debug!(%url, "create_client: using HTTP relay");
            Ok(Arc::new(HttpRelayClient::new(url, config.client.timeout())?))
        }
        None => {
            debug!("create_client: using in-process relay");
            Ok(Arc::new(Relay::from_config(config)?))
        }
    }
}
