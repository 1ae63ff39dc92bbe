//! Negotiated authentication module
//!
//! Drives the challenge/response loop for one scheme: refusal checks,
//! session creation on the first challenge, leg-by-leg advancement, and the
//! finalization pass that completes mutual authentication and clears the
//! session.

use crate::context::SecurityContextFactory;
use crate::policy::{ConnectionReuse, CredentialPolicy};
use crate::scheme::{authorization_header, parse_challenge, Challenge, SchemeDescriptor};
use crate::session::{AuthSession, AuthState, ConnectionAuthState};
use reqcap_core::{Credentials, Result, CHALLENGING_STATUS};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Request-scoped inputs to the authentication operations
pub struct AuthRequest {
    /// Authority the credentials would be sent to
    pub target: String,
    /// Connection group this request rides on
    pub connection_group: String,
    /// Per-connection authentication state container
    pub auth_state: Arc<ConnectionAuthState>,
}

/// Outgoing response to a challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    /// Full header value, `<signature> <base64 blob>`
    pub header_value: String,
    /// Whether the underlying context reported handshake completion
    pub complete: bool,
}

/// Authentication module for one negotiated scheme variant
pub struct NegotiateModule {
    descriptor: SchemeDescriptor,
    factory: Arc<dyn SecurityContextFactory>,
    policy: Arc<dyn CredentialPolicy>,
    connections: Arc<dyn ConnectionReuse>,
}

impl NegotiateModule {
    #[must_use]
    pub fn new(
        descriptor: SchemeDescriptor,
        factory: Arc<dyn SecurityContextFactory>,
        policy: Arc<dyn CredentialPolicy>,
        connections: Arc<dyn ConnectionReuse>,
    ) -> Self {
        Self {
            descriptor,
            factory,
            policy,
            connections,
        }
    }

    #[must_use]
    pub fn descriptor(&self) -> &SchemeDescriptor {
        &self.descriptor
    }

    /// Answer a server challenge.
    ///
    /// Returns `Ok(None)` (a refusal, not an error) when credentials are
    /// absent, when their combined length exceeds the scheme's cap, when
    /// the policy hook rejects the target, or when the header does not
    /// offer this scheme. Refusals never create or mutate session state;
    /// the caller tries the next available module.
    pub fn authenticate(
        &self,
        challenge: &str,
        request: &AuthRequest,
        credentials: Option<&Credentials>,
    ) -> Result<Option<Authorization>> {
        let Some(credentials) = self.usable_credentials(request, credentials) else {
            return Ok(None);
        };
        let incoming = match parse_challenge(challenge, self.descriptor.signature)? {
            Challenge::NotOffered => {
                trace!(
                    scheme = self.descriptor.signature,
                    "challenge does not offer this scheme"
                );
                return Ok(None);
            }
            Challenge::Initial => None,
            Challenge::Continuation(blob) => Some(blob),
        };
        self.advance_session(request, credentials, incoming.as_deref())
            .map(Some)
    }

    /// Proactively attach credentials before any server challenge. Only
    /// permitted when the scheme declares the capability.
    pub fn pre_authenticate(
        &self,
        request: &AuthRequest,
        credentials: Option<&Credentials>,
    ) -> Result<Option<Authorization>> {
        if !self.descriptor.supports_preauth {
            return Ok(None);
        }
        let Some(credentials) = self.usable_credentials(request, credentials) else {
            return Ok(None);
        };
        self.advance_session(request, credentials, None).map(Some)
    }

    /// Finish (or continue) the handshake once a response status is known.
    ///
    /// Returns `done=false` while the handshake is incomplete and the
    /// server is still challenging; otherwise performs the final blob
    /// exchange if one is present, records the mutual-authentication flag,
    /// releases the connection group, clears the session, and reports done.
    pub fn update(
        &self,
        final_challenge: Option<&str>,
        request: &AuthRequest,
        status: u16,
    ) -> Result<bool> {
        let signature = self.descriptor.signature;
        let mut sessions = request.auth_state.sessions();
        let Some(session) = sessions.get_mut(signature) else {
            return Ok(true);
        };

        if !session.is_complete() && status == CHALLENGING_STATUS {
            trace!(scheme = signature, "server still challenging");
            return Ok(false);
        }

        if let Some(header) = final_challenge {
            let challenge = match parse_challenge(header, signature) {
                Ok(challenge) => challenge,
                Err(err) => {
                    Self::fail_and_remove(&mut sessions, signature);
                    return Err(err);
                }
            };
            if let Challenge::Continuation(blob) = challenge {
                // Last leg: completes mutual authentication where the
                // variant supports it
                if let Err(err) = session.advance(Some(&blob)) {
                    Self::fail_and_remove(&mut sessions, signature);
                    return Err(err);
                }
            }
        }

        request
            .auth_state
            .set_mutually_authenticated(session.is_mutually_authenticated());
        self.connections.release_group(&request.connection_group);
        if let Some(mut session) = sessions.remove(signature) {
            // A non-challenging failure status ends an unfinished handshake
            let state = if session.is_complete() {
                AuthState::Completed
            } else {
                AuthState::Failed
            };
            session.finish(state);
        }
        debug!(scheme = signature, "handshake finished, session cleared");
        Ok(true)
    }

    /// Unconditionally remove this scheme's session; idempotent
    pub fn clear_session(&self, request: &AuthRequest) {
        request.auth_state.clear(self.descriptor.signature);
    }

    /// Refusal checks; `None` means "do not answer with this module"
    fn usable_credentials<'c>(
        &self,
        request: &AuthRequest,
        credentials: Option<&'c Credentials>,
    ) -> Option<&'c Credentials> {
        let credentials = credentials?;
        if credentials.combined_len() > self.descriptor.max_credential_len {
            warn!(
                scheme = self.descriptor.signature,
                "credential material exceeds scheme cap, refusing"
            );
            return None;
        }
        if !self.policy.should_send_credentials(
            &request.target,
            credentials,
            self.descriptor.signature,
        ) {
            debug!(
                target = %request.target,
                "credential policy rejected target"
            );
            return None;
        }
        Some(credentials)
    }

    fn advance_session(
        &self,
        request: &AuthRequest,
        credentials: &Credentials,
        incoming: Option<&[u8]>,
    ) -> Result<Authorization> {
        let signature = self.descriptor.signature;
        let mut sessions = request.auth_state.sessions();

        if !sessions.contains_key(signature) {
            debug!(scheme = signature, target = %request.target, "creating security context");
            let context = self.factory.create(&request.target, credentials)?;
            sessions.insert(signature, AuthSession::new(context));
        }
        let session = sessions
            .get_mut(signature)
            .ok_or_else(|| reqcap_core::Error::context_failure("lookup", "session vanished"))?;

        let exchange = match session.advance(incoming) {
            Ok(exchange) => exchange,
            Err(err) => {
                Self::fail_and_remove(&mut sessions, signature);
                return Err(err);
            }
        };

        if exchange.complete && !self.descriptor.kerberos_like {
            // The rest of this exchange must ride the same connection
            self.connections.pin_connection(&request.connection_group);
        }

        Ok(Authorization {
            header_value: authorization_header(signature, &exchange.token),
            complete: exchange.complete,
        })
    }

    fn fail_and_remove(
        sessions: &mut std::collections::HashMap<&'static str, AuthSession>,
        signature: &'static str,
    ) {
        if let Some(mut session) = sessions.remove(signature) {
            session.finish(AuthState::Failed);
        }
    }
}
