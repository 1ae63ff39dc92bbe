//! Classification result accumulator and frozen result
//!
//! The rule engine writes into a `ResultBuilder`; only a finalized
//! `CapabilitiesResult` is ever inserted into a cache, so a cached instance
//! can be shared freely without anyone mutating it in place.

use crate::rules::PRIMARY_ATTRIBUTE;
use reqcap_cache::content_hash;
use std::collections::BTreeMap;

/// Mutable accumulator the rule engine evaluates into
#[derive(Debug, Default)]
pub struct ResultBuilder {
    attributes: BTreeMap<String, String>,
    uses_optimized_key: bool,
    constrained: Option<bool>,
}

impl ResultBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            attributes: BTreeMap::new(),
            // Trust the optimistic key until a non-primary attribute is
            // needed
            uses_optimized_key: true,
            constrained: None,
        }
    }

    /// Seed the sticky constrained flag from a prior partial pass
    #[must_use]
    pub fn with_prior_constrained(mut self, prior: Option<bool>) -> Self {
        self.constrained = prior;
        self
    }

    pub fn assign(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Record that a non-primary attribute influenced (or would influence)
    /// this result; the optimistic key can no longer be trusted for it
    pub fn mark_full_key_required(&mut self) {
        self.uses_optimized_key = false;
    }

    /// Explicit rule write to the constrained-client flag
    pub fn set_constrained(&mut self, constrained: bool) {
        self.constrained = Some(constrained);
    }

    #[must_use]
    pub fn uses_optimized_key(&self) -> bool {
        self.uses_optimized_key
    }

    #[must_use]
    pub fn constrained(&self) -> Option<bool> {
        self.constrained
    }

    /// Record the primary attribute value under its pseudo-key. It is kept
    /// out of the structural content hash so identical classification
    /// outputs share one instance across different client identifiers.
    pub fn record_primary(&mut self, value: &str) {
        self.attributes
            .insert(PRIMARY_ATTRIBUTE.to_string(), value.to_string());
    }

    /// Finalize into an immutable result. A constrained client is never
    /// addressable by the optimistic key alone, whatever the rules reported.
    #[must_use]
    pub fn freeze(self) -> CapabilitiesResult {
        let constrained = self.constrained.unwrap_or(false);
        CapabilitiesResult {
            uses_optimized_key: self.uses_optimized_key && !constrained,
            constrained,
            attributes: self.attributes,
        }
    }
}

/// Immutable classification outcome, shareable across cache entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilitiesResult {
    attributes: BTreeMap<String, String>,
    uses_optimized_key: bool,
    constrained: bool,
}

impl CapabilitiesResult {
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The primary attribute value this result was computed from, if any
    #[must_use]
    pub fn primary_attribute(&self) -> Option<&str> {
        self.attribute(PRIMARY_ATTRIBUTE)
    }

    /// Whether this result is safe to address via the optimistic key alone
    #[must_use]
    pub fn uses_optimized_key(&self) -> bool {
        self.uses_optimized_key
    }

    /// Sticky constrained/mobile-class flag
    #[must_use]
    pub fn is_constrained(&self) -> bool {
        self.constrained
    }

    #[must_use]
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Structural hash for de-duplication; ignores the primary attribute's
    /// pseudo-key and folds in the special flags so results differing only
    /// in them never collapse together
    #[must_use]
    pub fn structural_hash(&self) -> String {
        let constrained = if self.constrained { "1" } else { "0" };
        let optimized = if self.uses_optimized_key { "1" } else { "0" };
        let pairs = self
            .attributes
            .iter()
            .filter(|(name, _)| name.as_str() != PRIMARY_ATTRIBUTE)
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .chain([
                ("\u{0}constrained", constrained),
                ("\u{0}uses_optimized_key", optimized),
            ]);
        content_hash(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freeze_defaults_to_optimizable_unconstrained() {
        let result = ResultBuilder::new().freeze();
        assert!(result.uses_optimized_key());
        assert!(!result.is_constrained());
    }

    #[test]
    fn constrained_true_forces_full_key_path() {
        let mut builder = ResultBuilder::new();
        builder.set_constrained(true);
        let result = builder.freeze();
        assert!(result.is_constrained());
        assert!(!result.uses_optimized_key());
    }

    #[test]
    fn prior_constrained_is_preserved_when_not_rewritten() {
        let builder = ResultBuilder::new().with_prior_constrained(Some(true));
        let result = builder.freeze();
        assert!(result.is_constrained());
    }

    #[test]
    fn prior_constrained_is_overridden_by_explicit_write() {
        let mut builder = ResultBuilder::new().with_prior_constrained(Some(true));
        builder.set_constrained(false);
        let result = builder.freeze();
        assert!(!result.is_constrained());
    }

    #[test]
    fn structural_hash_ignores_primary_attribute() {
        let mut a = ResultBuilder::new();
        a.assign("mobile", "true");
        a.record_primary("UA-X");
        let a = a.freeze();

        let mut b = ResultBuilder::new();
        b.assign("mobile", "true");
        b.record_primary("UA-Y");
        let b = b.freeze();

        assert_eq!(a.structural_hash(), b.structural_hash());
    }

    #[test]
    fn structural_hash_separates_flag_differences() {
        let plain = ResultBuilder::new().freeze();
        let mut constrained = ResultBuilder::new();
        constrained.set_constrained(true);
        let constrained = constrained.freeze();
        assert_ne!(plain.structural_hash(), constrained.structural_hash());
    }
}
