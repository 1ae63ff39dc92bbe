//! Collaborator hooks: credential policy and connection reuse

use reqcap_core::Credentials;

/// Decides whether credentials may be sent to a target at all. A rejection
/// is a refusal, not an error; the caller tries the next available module.
pub trait CredentialPolicy: Send + Sync {
    fn should_send_credentials(
        &self,
        target: &str,
        credentials: &Credentials,
        scheme: &str,
    ) -> bool;
}

/// Policy that always permits sending credentials
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAllCredentials;

impl CredentialPolicy for AllowAllCredentials {
    fn should_send_credentials(&self, _: &str, _: &Credentials, _: &str) -> bool {
        true
    }
}

/// Connection-reuse controller invoked at defined handshake points: pin the
/// connection immediately after producing a response that must stay on it,
/// release the group once the handshake no longer needs it.
pub trait ConnectionReuse: Send + Sync {
    fn pin_connection(&self, group: &str);
    fn release_group(&self, group: &str);
}

/// No-op controller for callers without connection pooling
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopConnectionReuse;

impl ConnectionReuse for NoopConnectionReuse {
    fn pin_connection(&self, _: &str) {}
    fn release_group(&self, _: &str) {}
}
