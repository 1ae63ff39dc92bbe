//! Two-phase keyed capabilities evaluation
//!
//! The evaluator owns its key cache and de-duplication pool. The optimistic
//! path costs one attribute read and one map lookup; the full path reads
//! every dependency attribute, builds the full key, and runs the complete
//! rule list.

use crate::config::EvaluatorConfig;
use crate::result::{CapabilitiesResult, ResultBuilder};
use crate::rules::{dependency_set, Rule, PRIMARY_ATTRIBUTE};
use reqcap_cache::{CacheSlot, CacheStats, KeyedResultCache, ResultPool};
use reqcap_core::{Clock, RequestAttributes, Result};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, trace};

/// Which attributes a rule pass is allowed to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EvalMode {
    /// Optimistic pass: rules needing any non-primary attribute are
    /// indeterminate and treated as non-matching
    PrimaryOnly,
    Full,
}

/// Classifies requests into shared, immutable `CapabilitiesResult`s
#[derive(Debug)]
pub struct CapabilitiesEvaluator {
    config: EvaluatorConfig,
    rules: Vec<Rule>,
    /// Non-primary attribute names the rule tree can read, fixed at
    /// construction
    dependencies: BTreeSet<String>,
    cache: KeyedResultCache<CapabilitiesResult>,
    pool: ResultPool<CapabilitiesResult>,
}

impl CapabilitiesEvaluator {
    /// Build an evaluator; fails fast on malformed configuration
    pub fn new(config: EvaluatorConfig, rules: Vec<Rule>, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let dependencies = dependency_set(&rules);
        let cache = KeyedResultCache::new(clock.clone());
        let pool = ResultPool::new(clock, config.result_ttl);
        Ok(Self {
            config,
            rules,
            dependencies,
            cache,
            pool,
        })
    }

    /// Classify a request.
    ///
    /// Tries the optimistic key first; falls back to the full key when the
    /// optimistic phase is inconclusive or disabled for this input shape.
    /// Concurrent misses for the same key may compute twice; the result is
    /// a pure function of the keyed attributes, so last-writer-wins is safe.
    pub fn evaluate<R: RequestAttributes + ?Sized>(&self, request: &R) -> Arc<CapabilitiesResult> {
        let primary = request.attribute(&self.config.primary_attribute);
        let mut prior_constrained = None;

        if let Some(primary) = primary {
            let optimistic_key = self.optimistic_key(primary);
            match self.cache.get(&optimistic_key) {
                Some(CacheSlot::Value(result)) => {
                    debug!(key = %optimistic_key, "optimistic cache hit");
                    return result;
                }
                Some(CacheSlot::DisableSentinel) => {
                    trace!(key = %optimistic_key, "optimistic path disabled for this key");
                }
                None => {
                    let mut builder = ResultBuilder::new();
                    self.run_rules(request, EvalMode::PrimaryOnly, &mut builder);
                    prior_constrained = builder.constrained();

                    if builder.uses_optimized_key() && builder.constrained() != Some(true) {
                        builder.record_primary(primary);
                        let result = builder.freeze();
                        let interned =
                            self.pool.intern(&result.structural_hash(), Arc::new(result));
                        self.cache.put(
                            optimistic_key,
                            Arc::clone(&interned),
                            self.config.result_ttl,
                        );
                        return interned;
                    }

                    // Classification genuinely depends on other attributes;
                    // future requests with this primary value go straight to
                    // the full path.
                    debug!(key = %optimistic_key, "disabling optimistic path");
                    self.cache
                        .put_sentinel(optimistic_key, self.config.result_ttl);
                }
            }
        }

        let full_key = self.full_key(request, primary);
        // The full-key lookup is skipped when the primary attribute is
        // absent; such requests always run full evaluation.
        if primary.is_some() {
            if let Some(CacheSlot::Value(result)) = self.cache.get(&full_key) {
                debug!(key = %full_key, "full-key cache hit");
                return result;
            }
        }

        let mut builder = ResultBuilder::new().with_prior_constrained(prior_constrained);
        self.run_rules(request, EvalMode::Full, &mut builder);
        if let Some(primary) = primary {
            builder.record_primary(primary);
        }
        let result = builder.freeze();
        let interned = self.pool.intern(&result.structural_hash(), Arc::new(result));
        self.cache
            .put(full_key, Arc::clone(&interned), self.config.result_ttl);
        interned
    }

    /// Cheap key: namespace prefix plus the truncated primary attribute.
    ///
    /// The `o:`/`f:` markers keep the optimistic and full key spaces
    /// disjoint: a truncated primary could otherwise spell out another
    /// request's full key, and a full-path (non-optimizable) result must
    /// never be reachable through an optimistic lookup.
    fn optimistic_key(&self, primary: &str) -> String {
        let mut key = String::with_capacity(
            self.config.key_prefix.len()
                + 2
                + self.config.primary_truncation_len.min(primary.len()),
        );
        key.push_str(&self.config.key_prefix);
        key.push_str("o:");
        key.extend(primary.chars().take(self.config.primary_truncation_len));
        key
    }

    /// Expensive key: prefix, untruncated primary attribute, and every
    /// dependency attribute value, concatenated deterministically
    fn full_key<R: RequestAttributes + ?Sized>(
        &self,
        request: &R,
        primary: Option<&str>,
    ) -> String {
        let mut key = String::new();
        key.push_str(&self.config.key_prefix);
        key.push_str("f:");
        key.push_str(primary.unwrap_or(""));
        for dependency in &self.dependencies {
            key.push('\n');
            key.push_str(dependency);
            key.push('=');
            key.push_str(request.attribute(dependency).unwrap_or(""));
        }
        key
    }

    fn run_rules<R: RequestAttributes + ?Sized>(
        &self,
        request: &R,
        mode: EvalMode,
        builder: &mut ResultBuilder,
    ) {
        for rule in &self.rules {
            self.apply_rule(rule, request, mode, builder);
        }
    }

    /// Apply one rule; the return value drives first-match semantics inside
    /// filter rules
    fn apply_rule<R: RequestAttributes + ?Sized>(
        &self,
        rule: &Rule,
        request: &R,
        mode: EvalMode,
        builder: &mut ResultBuilder,
    ) -> bool {
        match rule {
            Rule::Match {
                attribute,
                predicate,
                assignments,
                set_constrained,
            } => {
                let name = if attribute == PRIMARY_ATTRIBUTE {
                    &self.config.primary_attribute
                } else {
                    builder.mark_full_key_required();
                    if mode == EvalMode::PrimaryOnly {
                        // Indeterminate in this pass: the attribute may not
                        // be read, so the rule cannot match
                        return false;
                    }
                    attribute
                };
                let value = request.attribute(name).unwrap_or("");
                if !predicate.matches(value) {
                    return false;
                }
                for assignment in assignments {
                    builder.assign(assignment.name.clone(), assignment.value.clone());
                }
                if let Some(constrained) = set_constrained {
                    builder.set_constrained(*constrained);
                }
                true
            }
            Rule::Filter(rules) => {
                for sub_rule in rules {
                    if self.apply_rule(sub_rule, request, mode, builder) {
                        return true;
                    }
                }
                false
            }
        }
    }

    /// Non-primary attributes that participate in the full key
    #[must_use]
    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.dependencies
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
