//! Conversation controller
//!
//! Sends user input through the relay, projects the agent's events and keeps
//! the resulting history. One submission at a time; history is append-only.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use super::state::SubmitState;
use crate::agent::{Message, SessionId, decode_events};
use crate::client::RelayClient;
use crate::config::AgentConfig;
use crate::projector::project;
use crate::relay::{RelayRequest, RelayResponse};

const UNKNOWN_SEND_ERROR: &str = "Unknown error during message sending.";

/// Why a submission was not sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Blank,
    Busy,
}

/// Result of [`ConversationController::submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was sent or appended
    Ignored(IgnoreReason),

    /// The agent answered; these replies were appended (possibly none)
    Replied(Vec<Message>),

    /// The send failed; a model message with this text was appended
    Failed(String),
}

#[derive(Debug, Default)]
struct Inner {
    state: SubmitState,
    messages: Vec<Message>,
}

/// Resets the state if a submission is dropped mid-flight
struct SendingGuard<'a> {
    inner: &'a Mutex<Inner>,
    armed: bool,
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("Submission abandoned while sending");
            lock(self.inner).state.finish(false);
        }
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives one conversation with the agent
pub struct ConversationController {
    relay: Arc<dyn RelayClient>,
    session_id: SessionId,
    app_name: String,
    user_id: String,
    assistant: String,
    inner: Mutex<Inner>,
}

impl ConversationController {
    pub fn new(relay: Arc<dyn RelayClient>, session_id: SessionId, agent: &AgentConfig) -> Self {
        debug!(%session_id, app_name = %agent.app_name, "ConversationController::new: called");
        Self {
            relay,
            session_id,
            app_name: agent.app_name.clone(),
            user_id: agent.user_id.clone(),
            assistant: agent.assistant_author.clone(),
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Snapshot of the conversation so far
    pub fn messages(&self) -> Vec<Message> {
        lock(&self.inner).messages.clone()
    }

    pub fn state(&self) -> SubmitState {
        lock(&self.inner).state
    }

    /// Send one user message
    ///
    /// Blank input and input arriving while another submission is in flight
    /// are dropped. Otherwise the user message is appended immediately and
    /// the agent's replies, or a single error message, follow it. Never fails.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        debug!(text_len = text.len(), "submit: called");
        if text.trim().is_empty() {
            debug!("submit: blank input ignored");
            return SubmitOutcome::Ignored(IgnoreReason::Blank);
        }

        let message = Message::user(text);
        {
            let mut inner = lock(&self.inner);
            if !inner.state.try_begin() {
                debug!("submit: busy, input dropped");
                return SubmitOutcome::Ignored(IgnoreReason::Busy);
            }
            inner.messages.push(message.clone());
        }

        let mut guard = SendingGuard {
            inner: &self.inner,
            armed: true,
        };
        let result = self.exchange(message).await;
        guard.armed = false;

        let mut inner = lock(&self.inner);
        match result {
            Ok(replies) => {
                info!(reply_count = replies.len(), "Agent replied");
                inner.messages.extend(replies.iter().cloned());
                inner.state.finish(true);
                SubmitOutcome::Replied(replies)
            }
            Err(reason) => {
                warn!(%reason, "Error sending message");
                let text = format!("Error sending message: {}", reason);
                inner.messages.push(Message::model(&text));
                inner.state.finish(false);
                SubmitOutcome::Failed(text)
            }
        }
    }

    /// One relay round trip; the error is the reason shown to the user
    async fn exchange(&self, message: Message) -> Result<Vec<Message>, String> {
        let request = RelayRequest::send_message(&self.app_name, &self.user_id, &self.session_id, message);
        let response = self.relay.call(&request).await.map_err(|e| e.to_string())?;

        if !response.is_success() {
            return Err(failure_reason(&response));
        }

        let events = decode_events(&response.body).map_err(|e| e.to_string())?;
        Ok(project(&events, &self.assistant))
    }
}

fn failure_reason(response: &RelayResponse) -> String {
    if !response.body.is_object() {
        return UNKNOWN_SEND_ERROR.to_string();
    }
    response
        .error_message()
        .unwrap_or_else(|| format!("API error: {}", response.status))
}
