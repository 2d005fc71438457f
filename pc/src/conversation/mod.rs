//! Conversation state and submission control

mod controller;
mod state;

pub use controller::{ConversationController, IgnoreReason, SubmitOutcome};
pub use state::SubmitState;
