//! Security context seam
//!
//! The protocol-specific handshake engine (the challenge/response
//! accumulator) lives behind these traits. A context is exclusively owned
//! by its session and must be closed exactly once; the session enforces
//! that, with `Drop` as a backstop.

use reqcap_core::{Credentials, Result};

/// Outcome of advancing a security context by one leg
#[derive(Debug, Clone)]
pub struct TokenExchange {
    /// Outgoing blob to send back to the peer
    pub token: Vec<u8>,
    /// Whether the underlying context reports the handshake finished
    pub complete: bool,
}

/// Opaque handshake state for one negotiated authentication exchange
pub trait SecurityContext: Send {
    /// Feed the incoming blob (absent on the first leg) and produce the
    /// next outgoing token
    fn advance(&mut self, incoming: Option<&[u8]>) -> Result<TokenExchange>;

    /// Whether the handshake has completed successfully
    fn is_complete(&self) -> bool;

    /// Whether both peers authenticated each other
    fn is_mutually_authenticated(&self) -> bool;

    /// Release the underlying handle. Called exactly once by the owning
    /// session on the terminal transition.
    fn close(&mut self);
}

/// Creates security contexts for a (target, credentials) pair
pub trait SecurityContextFactory: Send + Sync {
    fn create(&self, target: &str, credentials: &Credentials) -> Result<Box<dyn SecurityContext>>;
}
