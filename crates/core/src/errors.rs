/// Result type alias for reqcap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for reqcap operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors; fatal, surfaced at construction time rather
    /// than per-request
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// A challenge header that could not be parsed into a continuation blob
    /// when one was expected
    #[error("malformed '{scheme}' challenge header: {header}")]
    MalformedChallenge { scheme: String, header: String },

    /// Security context operation failure; transitions the owning session
    /// to `Failed`
    #[error("security context {operation} failed: {message}")]
    ContextFailure {
        operation: &'static str,
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a malformed-challenge error
    #[must_use]
    pub fn malformed_challenge(scheme: impl Into<String>, header: impl Into<String>) -> Self {
        Error::MalformedChallenge {
            scheme: scheme.into(),
            header: header.into(),
        }
    }

    /// Create a security context failure
    #[must_use]
    pub fn context_failure(operation: &'static str, message: impl Into<String>) -> Self {
        Error::ContextFailure {
            operation,
            message: message.into(),
        }
    }
}
