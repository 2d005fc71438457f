//! In-process relay client
//!
//! Lets the chat front end use a `Relay` directly when no relay server is
//! configured, skipping the HTTP hop.

use async_trait::async_trait;

use super::{ClientError, RelayClient};
use crate::relay::{Relay, RelayRequest, RelayResponse};

#[async_trait]
impl RelayClient for Relay {
    async fn call(&self, request: &RelayRequest) -> Result<RelayResponse, ClientError> {
        Ok(self.handle(request.clone()).await)
    }
}
