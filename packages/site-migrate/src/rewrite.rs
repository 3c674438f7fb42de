//! URL rewrite rules applied to the destination database after import.
//!
//! Host derivation produces four pairs, always in this order:
//!
//! 1. bare host: `example.com` → `example.test`
//! 2. protocol-relative: `//example.com` → `//example.test`
//! 3. escaped protocol-relative, as found in JSON and serialized strings:
//!    `\/\/example.com` → `\/\/example.test`
//! 4. scheme fix-up for URLs that already point at the destination host but
//!    still carry the origin's scheme: `https://example.test` → `http://example.test`
//!
//! Each pair runs against the result of the previous ones. Identical hosts
//! produce identity pairs, which the search-replace step treats as no-ops.

use std::fmt;

use crate::environment::{scheme, Environment};

/// One literal search/replace pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RewriteRule {
    search: String,
    replace: String,
}

impl RewriteRule {
    pub fn new(search: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            replace: replace.into(),
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn replace(&self) -> &str {
        &self.replace
    }

    /// True when applying the rule cannot change anything
    pub fn is_identity(&self) -> bool {
        self.search == self.replace
    }
}

impl fmt::Display for RewriteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' -> '{}'", self.search, self.replace)
    }
}

/// How a run obtains its rewrite rules.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RewriteStrategy {
    /// Derive the four host rules from origin and destination
    #[default]
    HostDerived,
    /// Use configured pairs verbatim, in order
    Explicit(Vec<RewriteRule>),
}

impl RewriteStrategy {
    pub fn rules(&self, origin: &Environment, destination: &Environment) -> Vec<RewriteRule> {
        match self {
            RewriteStrategy::HostDerived => host_rules(origin, destination).to_vec(),
            RewriteStrategy::Explicit(rules) => rules.clone(),
        }
    }
}

/// Derive the host-normalization rules for an origin/destination pair.
pub fn host_rules(origin: &Environment, destination: &Environment) -> [RewriteRule; 4] {
    let from = origin.host();
    let to = destination.host();

    [
        RewriteRule::new(from, to),
        RewriteRule::new(format!("//{from}"), format!("//{to}")),
        RewriteRule::new(format!(r"\/\/{from}"), format!(r"\/\/{to}")),
        RewriteRule::new(
            format!("{}://{to}", scheme(origin.secure())),
            format!("{}://{to}", scheme(destination.secure())),
        ),
    ]
}
