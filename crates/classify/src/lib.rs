//! Request capabilities classification for reqcap
//!
//! Classifies an incoming request into a frozen `CapabilitiesResult` by
//! running an ordered rule list over named request attributes, minimizing
//! both cache-key construction cost and rule-evaluation cost on the common
//! path:
//!
//! 1. An **optimistic key** built from just the (truncated) primary
//!    attribute is tried first.
//! 2. When the classification turns out to depend on other attributes, a
//!    disable sentinel is recorded under the optimistic key and the
//!    expensive **full key** (primary attribute plus every rule dependency)
//!    takes over for that input shape.
//!
//! Rule grammar parsing is out of scope; rule trees are constructed
//! programmatically.

pub mod config;
pub mod evaluator;
pub mod result;
pub mod rules;

pub use config::EvaluatorConfig;
pub use evaluator::CapabilitiesEvaluator;
pub use result::{CapabilitiesResult, ResultBuilder};
pub use rules::{Assignment, Predicate, Rule, PRIMARY_ATTRIBUTE};
