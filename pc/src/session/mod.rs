//! Session identity
//!
//! A session id is created once per client, persisted with an expiry and
//! registered with the agent at most once.

mod manager;
mod store;

pub use manager::{EnsuredSession, Registration, SESSION_KEY, SessionManager, forget_session, stored_session};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
