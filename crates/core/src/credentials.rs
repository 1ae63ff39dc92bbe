//! Credential material for negotiated authentication
//!
//! The password is zeroized on drop and redacted from `Debug` output.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Username/password/domain triple handed to an authentication module
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    username: String,
    password: String,
    domain: String,
}

impl Credentials {
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            domain: domain.into(),
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Combined length of username, password, and domain, checked against a
    /// module's credential cap before any session state is touched
    #[must_use]
    pub fn combined_len(&self) -> usize {
        self.username.len() + self.password.len() + self.domain.len()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("domain", &self.domain)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_len_sums_all_parts() {
        let creds = Credentials::new("user", "secret", "corp");
        assert_eq!(creds.combined_len(), 4 + 6 + 4);
    }

    #[test]
    fn debug_redacts_password() {
        let creds = Credentials::new("user", "secret", "corp");
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("user"));
    }
}
