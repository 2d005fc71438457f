//! RelayClient trait definition

use async_trait::async_trait;

use super::ClientError;
use crate::relay::{RelayRequest, RelayResponse};

/// Anything that can carry a request to the relay and bring back its answer
///
/// A relay-side failure is still `Ok`: it arrives as a non-success
/// `RelayResponse`. `Err` means the relay itself could not be reached or
/// answered with something that is not JSON.
#[async_trait]
pub trait RelayClient: Send + Sync {
    async fn call(&self, request: &RelayRequest) -> Result<RelayResponse, ClientError>;
}
