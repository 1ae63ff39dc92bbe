//! Rule model for capabilities classification
//!
//! Rules form an ordered list. A `Match` rule tests a predicate against one
//! named attribute and, on match, writes its assignments into the result
//! accumulator. A `Filter` rule is a container whose sub-rules run in order
//! with only the first match taking effect; a later rule in the outer list
//! may still override individual fields.
//!
//! An empty attribute name is the sentinel for the primary classification
//! attribute (the client identifier string).

use std::collections::BTreeSet;

/// Attribute-name sentinel meaning "the primary classification attribute"
pub const PRIMARY_ATTRIBUTE: &str = "";

/// Predicate over a single attribute value. Absent attributes are matched
/// against the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Always matches, including on absent attributes
    Any,
    Equals(String),
    Prefix(String),
    Contains(String),
}

impl Predicate {
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Predicate::Any => true,
            Predicate::Equals(expected) => value == expected,
            Predicate::Prefix(prefix) => value.starts_with(prefix.as_str()),
            Predicate::Contains(needle) => value.contains(needle.as_str()),
        }
    }
}

/// One attribute written into the result accumulator when a rule matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub name: String,
    pub value: String,
}

impl Assignment {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A node in the classification rule tree
#[derive(Debug, Clone)]
pub enum Rule {
    Match {
        /// Attribute the predicate reads; [`PRIMARY_ATTRIBUTE`] for the
        /// primary classification attribute
        attribute: String,
        predicate: Predicate,
        assignments: Vec<Assignment>,
        /// Explicit write to the sticky constrained-client flag
        set_constrained: Option<bool>,
    },
    /// Ordered sub-rules; the first matching sub-rule's assignments apply
    Filter(Vec<Rule>),
}

impl Rule {
    /// Convenience constructor for a plain match rule
    #[must_use]
    pub fn matching(
        attribute: impl Into<String>,
        predicate: Predicate,
        assignments: Vec<Assignment>,
    ) -> Self {
        Rule::Match {
            attribute: attribute.into(),
            predicate,
            assignments,
            set_constrained: None,
        }
    }

    /// Collect the non-primary attribute names this rule tree can read.
    ///
    /// This is the static dependency set: the attributes that must be
    /// concatenated into the full cache key for it to disambiguate every
    /// result the rules can produce.
    pub fn collect_dependencies(&self, deps: &mut BTreeSet<String>) {
        match self {
            Rule::Match { attribute, .. } => {
                if attribute != PRIMARY_ATTRIBUTE {
                    deps.insert(attribute.clone());
                }
            }
            Rule::Filter(rules) => {
                for rule in rules {
                    rule.collect_dependencies(deps);
                }
            }
        }
    }
}

/// Dependency set of an ordered rule list
#[must_use]
pub fn dependency_set(rules: &[Rule]) -> BTreeSet<String> {
    let mut deps = BTreeSet::new();
    for rule in rules {
        rule.collect_dependencies(&mut deps);
    }
    deps
}
