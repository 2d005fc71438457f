//! PlanChat - chat client for a hosted planning agent
//!
//! A user types natural-language requests; the agent answers through a
//! server-side relay that hides the agent's address and speaks its REST
//! protocol. The agent's stream of events is filtered down to the replies
//! that belong in the transcript.
//!
//! # Modules
//!
//! - [`agent`] - Agent wire types: messages, events, session ids
//! - [`relay`] - Server-side relay and its HTTP surface
//! - [`client`] - How the chat side reaches the relay
//! - [`session`] - Durable session identity and registration
//! - [`projector`] - Events to displayable replies
//! - [`conversation`] - Transcript and submission state
//! - [`repl`] - Interactive terminal front end
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod agent;
pub mod cli;
pub mod client;
pub mod config;
pub mod conversation;
pub mod projector;
pub mod relay;
pub mod repl;
pub mod session;

pub use agent::{AgentEvent, Message, Part, Role, SessionId};
pub use client::{ClientError, HttpRelayClient, RelayClient, create_client};
pub use config::Config;
pub use conversation::{ConversationController, SubmitOutcome, SubmitState};
pub use projector::project;
pub use relay::{Relay, RelayError, RelayRequest, RelayResponse};
pub use session::{FileSessionStore, SessionManager, SessionStore};
