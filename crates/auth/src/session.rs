//! Per-connection authentication session state
//!
//! A `ConnectionAuthState` is the container scoping one logical
//! connection-reuse scope; it holds at most one session per scheme. The
//! handshake itself is sequential per connection, so the container's lock
//! only guards bookkeeping, never long-running work.

use crate::context::{SecurityContext, TokenExchange};
use parking_lot::Mutex;
use reqcap_core::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Handshake lifecycle; `Completed` and `Failed` are terminal and always
/// coincide with the session being cleared from its container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

/// One in-flight handshake, exclusively owning its security context
pub(crate) struct AuthSession {
    state: AuthState,
    context: Option<Box<dyn SecurityContext>>,
}

impl AuthSession {
    pub fn new(context: Box<dyn SecurityContext>) -> Self {
        Self {
            state: AuthState::NotStarted,
            context: Some(context),
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Advance the handshake one leg. A context failure is terminal: the
    /// context is released and the session left in `Failed` for the caller
    /// to clear.
    pub fn advance(&mut self, incoming: Option<&[u8]>) -> Result<TokenExchange> {
        let Some(context) = self.context.as_mut() else {
            return Err(reqcap_core::Error::context_failure(
                "advance",
                "session already reached a terminal state",
            ));
        };
        match context.advance(incoming) {
            Ok(exchange) => {
                self.state = AuthState::InProgress;
                Ok(exchange)
            }
            Err(err) => {
                warn!(error = %err, "security context advance failed");
                self.finish(AuthState::Failed);
                Err(err)
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        match &self.context {
            Some(context) => context.is_complete(),
            None => self.state == AuthState::Completed,
        }
    }

    pub fn is_mutually_authenticated(&self) -> bool {
        self.context
            .as_ref()
            .is_some_and(|context| context.is_mutually_authenticated())
    }

    /// Terminal transition; releases the context exactly once
    pub fn finish(&mut self, state: AuthState) {
        debug_assert!(matches!(state, AuthState::Completed | AuthState::Failed));
        self.state = state;
        if let Some(mut context) = self.context.take() {
            context.close();
        }
    }
}

impl Drop for AuthSession {
    fn drop(&mut self) {
        // Backstop only; the owning module closes on the terminal transition
        if let Some(mut context) = self.context.take() {
            context.close();
        }
    }
}

/// Per-connection container for authentication sessions, one logical
/// connection-reuse scope each
#[derive(Default)]
pub struct ConnectionAuthState {
    sessions: Mutex<HashMap<&'static str, AuthSession>>,
    mutually_authenticated: AtomicBool,
}

impl ConnectionAuthState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn sessions(&self) -> parking_lot::MutexGuard<'_, HashMap<&'static str, AuthSession>> {
        self.sessions.lock()
    }

    /// Whether a session exists for the given scheme signature
    #[must_use]
    pub fn has_session(&self, signature: &str) -> bool {
        self.sessions.lock().contains_key(signature)
    }

    /// Lifecycle state of this scheme's session, if one exists
    #[must_use]
    pub fn session_state(&self, signature: &str) -> Option<AuthState> {
        self.sessions.lock().get(signature).map(AuthSession::state)
    }

    /// Remove and close this scheme's session; idempotent
    pub fn clear(&self, signature: &str) {
        if let Some(mut session) = self.sessions.lock().remove(signature) {
            debug!(signature, "clearing authentication session");
            session.finish(if session.is_complete() {
                AuthState::Completed
            } else {
                AuthState::Failed
            });
        }
    }

    pub(crate) fn set_mutually_authenticated(&self, value: bool) {
        self.mutually_authenticated.store(value, Ordering::Relaxed);
    }

    /// Whether the last completed handshake on this connection achieved
    /// mutual authentication
    #[must_use]
    pub fn is_mutually_authenticated(&self) -> bool {
        self.mutually_authenticated.load(Ordering::Relaxed)
    }
}
