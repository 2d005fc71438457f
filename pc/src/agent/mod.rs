//! Types exchanged with the planning agent

mod id;
mod types;

pub use id::SessionId;
pub use types::{AgentEvent, EventContent, Message, Part, Role, decode_events};
