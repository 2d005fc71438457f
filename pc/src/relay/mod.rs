//! Agent relay
//!
//! Accepts `initializeSession` and `sendMessage` requests, validates them and
//! forwards them to the planning agent API in the shape it expects. Every
//! outcome, including local failures, comes back as a status plus JSON body.

mod error;
mod handler;
mod messages;
pub mod server;

pub use error::RelayError;
pub use handler::Relay;
pub use messages::{RelayRequest, RelayResponse, RunRequest, UpstreamCall};
