//! Environment identities and the per-run migration context.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{ContextError, Result};
use crate::rewrite::{RewriteRule, RewriteStrategy};

/// Which side of the migration an environment sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Origin,
    Destination,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Origin => "origin",
            Role::Destination => "destination",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side of the migration: a wp-cli alias plus the host its URLs use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    alias: String,
    host: String,
    secure: bool,
}

impl Environment {
    pub fn new(alias: impl Into<String>, host: impl Into<String>, secure: bool) -> Self {
        Self {
            alias: alias.into(),
            host: host.into(),
            secure,
        }
    }

    /// Alias handed to the command executor to select this environment
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Canonical hostname stored in this environment's URLs
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Whether the environment is served over https
    pub fn secure(&self) -> bool {
        self.secure
    }

    pub fn scheme(&self) -> &'static str {
        scheme(self.secure)
    }

    fn validate(&self, role: Role) -> Result<()> {
        if self.alias.trim().is_empty() {
            return Err(ContextError::EmptyAlias { role });
        }
        if self.host.trim().is_empty() {
            return Err(ContextError::EmptyHost {
                role,
                alias: self.alias.clone(),
            });
        }
        Ok(())
    }
}

/// URL scheme token for a transport-security flag.
pub fn scheme(secure: bool) -> &'static str {
    if secure {
        "https"
    } else {
        "http"
    }
}

/// Everything a single pipeline run needs, resolved up front.
#[derive(Debug, Clone)]
pub struct MigrationContext {
    origin: Environment,
    destination: Environment,
    work_dir: PathBuf,
    strategy: RewriteStrategy,
}

impl MigrationContext {
    /// Build a context that derives its rewrite rules from the two hosts.
    pub fn new(
        origin: Environment,
        destination: Environment,
        work_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let work_dir = work_dir.into();
        origin.validate(Role::Origin)?;
        destination.validate(Role::Destination)?;
        if work_dir.as_os_str().is_empty() {
            return Err(ContextError::EmptyWorkDir);
        }

        Ok(Self {
            origin,
            destination,
            work_dir,
            strategy: RewriteStrategy::HostDerived,
        })
    }

    /// Replace host derivation with an explicit, ordered list of pairs.
    pub fn with_explicit_rules(mut self, rules: Vec<RewriteRule>) -> Result<Self> {
        if let Some(index) = rules.iter().position(|r| r.search().is_empty()) {
            return Err(ContextError::EmptySearch { index: index + 1 });
        }
        self.strategy = RewriteStrategy::Explicit(rules);
        Ok(self)
    }

    pub fn origin(&self) -> &Environment {
        &self.origin
    }

    pub fn destination(&self) -> &Environment {
        &self.destination
    }

    pub fn environment(&self, role: Role) -> &Environment {
        match role {
            Role::Origin => &self.origin,
            Role::Destination => &self.destination,
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn strategy(&self) -> &RewriteStrategy {
        &self.strategy
    }

    /// Rewrite rules for this run, in application order.
    pub fn rewrite_rules(&self) -> Vec<RewriteRule> {
        self.strategy.rules(&self.origin, &self.destination)
    }
}
