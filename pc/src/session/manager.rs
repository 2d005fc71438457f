//! Session identity management

use std::sync::Arc;

use chrono::Duration;
use eyre::Result;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::store::SessionStore;
use crate::agent::SessionId;
use crate::client::RelayClient;
use crate::relay::RelayRequest;

/// Store key holding the session id
pub const SESSION_KEY: &str = "sessionId";

/// Outcome of the one-time registration call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Registered,
    Failed(String),
}

/// Result of [`SessionManager::ensure_session`]
pub struct EnsuredSession {
    pub id: SessionId,

    /// Pending registration, present only for a freshly generated id
    pub registration: Option<JoinHandle<Registration>>,
}

impl EnsuredSession {
    pub fn is_fresh(&self) -> bool {
        self.registration.is_some()
    }
}

/// Hands out the durable session id and registers new ones with the agent
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    relay: Arc<dyn RelayClient>,
    user_id: String,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, relay: Arc<dyn RelayClient>, user_id: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            relay,
            user_id: user_id.into(),
            ttl,
        }
    }

    /// Return the stored session id, or create, persist and register a new one
    ///
    /// A stored id is returned without contacting the relay. A new id gets
    /// exactly one registration call, spawned in the background; its failure
    /// is logged and never retried. Must be called inside a Tokio runtime.
    pub fn ensure_session(&self) -> Result<EnsuredSession> {
        if let Some(existing) = self.current()? {
            debug!(session_id = %existing, "ensure_session: reusing stored session");
            return Ok(EnsuredSession {
                id: existing,
                registration: None,
            });
        }

        let id = SessionId::generate();
        self.store.set(SESSION_KEY, id.as_str(), self.ttl)?;
        info!(session_id = %id, "Created new session");

        let relay = Arc::clone(&self.relay);
        let user_id = self.user_id.clone();
        let registering = id.clone();
        let registration = tokio::spawn(async move { register(relay.as_ref(), &user_id, &registering).await });

        Ok(EnsuredSession {
            id,
            registration: Some(registration),
        })
    }

    /// Stored session id, if any, without creating one
    pub fn current(&self) -> Result<Option<SessionId>> {
        stored_session(self.store.as_ref())
    }

    /// Forget the stored session id; the next `ensure_session` starts fresh
    pub fn reset(&self) -> Result<bool> {
        forget_session(self.store.as_ref())
    }
}

/// Session id held by `store`, if any
///
/// Needs no relay; used by commands that only inspect the store.
pub fn stored_session(store: &dyn SessionStore) -> Result<Option<SessionId>> {
    Ok(store
        .get(SESSION_KEY)?
        .filter(|id| !id.is_empty())
        .map(SessionId::from_string))
}

/// Remove the session id from `store`; true if one was there
pub fn forget_session(store: &dyn SessionStore) -> Result<bool> {
    let removed = store.remove(SESSION_KEY)?;
    info!(removed, "Session reset");
    Ok(removed)
}

async fn register(relay: &dyn RelayClient, user_id: &str, session_id: &SessionId) -> Registration {
    debug!(%user_id, %session_id, "register: called");
    match relay.call(&RelayRequest::initialize_session(user_id, session_id)).await {
        Ok(response) if response.is_success() => {
            info!(%session_id, "Session initialized");
            Registration::Registered
        }
        Ok(response) => {
            let reason = response
                .error_message()
                .unwrap_or_else(|| format!("API error: {}", response.status));
            warn!(%session_id, status = response.status, %reason, "Session initialization failed");
            Registration::Failed(reason)
        }
        Err(e) => {
            warn!(%session_id, error = %e, "Session initialization failed");
            Registration::Failed(e.to_string())
        }
    }
}
