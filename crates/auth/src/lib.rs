//! Negotiated authentication sessions for reqcap
//!
//! Implements the per-connection challenge/response handshake pattern: an
//! expensive security-context object is created on the first challenge,
//! reused across the legs of a multi-round-trip protocol, and released
//! exactly once when the handshake completes or fails.
//!
//! The handshake is sequential per connection; the owning request layer is
//! responsible for driving one connection from one thread at a time. What
//! this crate guarantees is session/container bookkeeping: at most one
//! session per (connection, scheme) pair, terminal states always clear the
//! session, and refusals (missing credentials, oversized credential
//! material, policy rejection) never touch session state.

pub mod context;
pub mod module;
pub mod policy;
pub mod scheme;
pub mod session;

pub use context::{SecurityContext, SecurityContextFactory, TokenExchange};
pub use module::{AuthRequest, Authorization, NegotiateModule};
pub use policy::{AllowAllCredentials, ConnectionReuse, CredentialPolicy, NoopConnectionReuse};
pub use scheme::{authorization_header, parse_challenge, Challenge, SchemeDescriptor};
pub use session::{AuthState, ConnectionAuthState};
