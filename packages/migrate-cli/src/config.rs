//! Configuration for the migrate CLI.
//!
//! Environments live in `migrations.config.toml` at the site root:
//!
//! ```toml
//! [wp]
//! binary = "wp"
//!
//! [environments.production]
//! ssl = true
//! host = "example.com"
//!
//! [environments.development]
//! ssl = false
//! host = "example.test"
//! ```
//!
//! Table names are the names passed to `--from`/`--to` and, unless `alias`
//! overrides it, the wp-cli alias the commands target.

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use site_migrate::{Environment, MigrationContext, RewriteRule};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory
pub const CONFIG_FILE: &str = "migrations.config.toml";

/// Bundled starting point written by `generate-config`
pub const TEMPLATE: &str = include_str!("../templates/migrations.config.toml");

// =============================================================================
// File Format
// =============================================================================

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct MigrationsConfig {
    pub wp: WpConfig,
    pub environments: BTreeMap<String, EnvironmentEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WpConfig {
    /// wp-cli executable name or path
    #[serde(default = "default_wp_binary")]
    pub binary: String,
}

impl Default for WpConfig {
    fn default() -> Self {
        Self {
            binary: default_wp_binary(),
        }
    }
}

fn default_wp_binary() -> String {
    site_migrate::wp_cli::DEFAULT_BINARY.to_string()
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EnvironmentEntry {
    pub host: String,
    #[serde(default)]
    pub ssl: bool,
    /// wp-cli alias, defaults to the table name
    #[serde(default)]
    pub alias: Option<String>,
    /// Explicit rewrite pairs used when this environment is the destination
    #[serde(default)]
    pub replace: Vec<ReplacePair>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ReplacePair {
    pub search: String,
    pub replace: String,
}

// =============================================================================
// Loading
// =============================================================================

/// Resolve the config path: explicit flag first, then the working directory.
pub fn config_path(work_dir: &Path, explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(p) if p.is_absolute() => p.to_path_buf(),
        Some(p) => work_dir.join(p),
        None => work_dir.join(CONFIG_FILE),
    }
}

impl MigrationsConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!(
                "No config found at {}. Run `site-migrate generate-config` first.",
                path.display()
            );
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Build the origin/destination context for one run.
    ///
    /// Every missing entry is reported, not just the first.
    pub fn resolve(
        &self,
        from: &str,
        to: &str,
        work_dir: &Path,
        source: &Path,
    ) -> Result<MigrationContext> {
        let missing: Vec<String> = [to, from]
            .iter()
            .filter(|name| !self.environments.contains_key(**name))
            .map(|name| format!("No config entry for @{} found in {}", name, source.display()))
            .collect();

        if !missing.is_empty() {
            return Err(anyhow!(
                "{}\nAvailable environments: {}",
                missing.join("\n"),
                self.names().join(", ")
            ));
        }

        let origin_entry = &self.environments[from];
        let destination_entry = &self.environments[to];

        let ctx = MigrationContext::new(
            origin_entry.environment(from),
            destination_entry.environment(to),
            work_dir,
        )?;

        if destination_entry.replace.is_empty() {
            return Ok(ctx);
        }

        let rules = destination_entry
            .replace
            .iter()
            .map(|p| RewriteRule::new(p.search.clone(), p.replace.clone()))
            .collect();
        Ok(ctx.with_explicit_rules(rules)?)
    }

    /// Configured environment names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.environments.keys().map(String::as_str).collect()
    }
}

impl EnvironmentEntry {
    fn environment(&self, name: &str) -> Environment {
        let alias = self.alias.as_deref().unwrap_or(name);
        Environment::new(alias, self.host.trim(), self.ssl)
    }
}

// =============================================================================
// Generation
// =============================================================================

/// Write the bundled template to `path`.
pub fn generate(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists. Pass --force to overwrite it.",
            path.display()
        );
    }

    fs::write(path, TEMPLATE).with_context(|| format!("Failed to write {}", path.display()))
}
