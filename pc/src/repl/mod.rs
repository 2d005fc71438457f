//! Interactive chat front end
//!
//! Wires configuration, session identity and the conversation controller
//! together for the `chat` and `send` commands.

mod session;

pub use session::ReplSession;

use std::sync::Arc;

use eyre::{Context, Result};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::client::{RelayClient, create_client};
use crate::config::Config;
use crate::conversation::ConversationController;
use crate::session::{FileSessionStore, Registration, SessionManager};

/// Build the session manager for this configuration
pub fn session_manager(config: &Config, relay: Arc<dyn RelayClient>) -> SessionManager {
    let store = Arc::new(FileSessionStore::new(&config.client.session_file));
    SessionManager::new(store, relay, config.agent.user_id.clone(), config.client.session_ttl())
}

/// Ensure a session and create a controller for it
///
/// The registration handle, if any, is returned untouched: callers must not
/// wait on it before the first submission.
pub fn start_conversation(config: &Config) -> Result<(ConversationController, Option<JoinHandle<Registration>>)> {
    let relay = create_client(config)?;
    let sessions = session_manager(config, Arc::clone(&relay));
    let session = sessions.ensure_session().context("Failed to establish session")?;
    debug!(session_id = %session.id, fresh = session.is_fresh(), "start_conversation: session ready");

    let controller = ConversationController::new(relay, session.id, &config.agent);
    Ok((controller, session.registration))
}

/// Run the interactive chat
///
/// This is the main entry point for `pc chat`.
pub async fn run_interactive(config: &Config, initial_message: Option<String>) -> Result<()> {
    let (controller, _registration) = start_conversation(config)?;
    let mut session = ReplSession::new(controller);
    session.run(initial_message).await
}
