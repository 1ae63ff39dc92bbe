//! Evaluator configuration and validation

use reqcap_core::{Error, Result, DEFAULT_RESULT_TTL};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a `CapabilitiesEvaluator` instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Cache-key namespace unique to this evaluator instance, so nested or
    /// inherited evaluator configurations never collide in a shared cache
    pub key_prefix: String,
    /// Request attribute the optimistic key is derived from
    /// (e.g. `User-Agent`)
    pub primary_attribute: String,
    /// Maximum number of characters of the primary attribute used in the
    /// optimistic key. Required; zero is a configuration error, not a
    /// silent default.
    pub primary_truncation_len: usize,
    /// TTL applied to every cache entry this evaluator writes
    pub result_ttl: Duration,
}

impl EvaluatorConfig {
    #[must_use]
    pub fn new(
        key_prefix: impl Into<String>,
        primary_attribute: impl Into<String>,
        primary_truncation_len: usize,
    ) -> Self {
        Self {
            key_prefix: key_prefix.into(),
            primary_attribute: primary_attribute.into(),
            primary_truncation_len,
            result_ttl: DEFAULT_RESULT_TTL,
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.result_ttl = ttl;
        self
    }

    /// Fail fast on malformed configuration, before any request is seen
    pub fn validate(&self) -> Result<()> {
        if self.primary_truncation_len == 0 {
            return Err(Error::configuration(
                "primary attribute truncation length must be non-zero",
            ));
        }
        Ok(())
    }
}
