//! Command implementations

pub mod generate;
pub mod plan;
pub mod run;

use anyhow::Result;
use clap::Args;
use site_migrate::MigrationContext;
use std::path::{Path, PathBuf};

use crate::config::{config_path, MigrationsConfig};
use crate::context::AppContext;

/// Origin and destination selection shared by `run` and `plan`
#[derive(Args, Debug, Clone)]
pub struct EnvPair {
    /// Environment to pull the database from
    #[arg(short, long, default_value = "production")]
    pub from: String,

    /// Environment whose database is replaced
    #[arg(short, long, default_value = "development")]
    pub to: String,
}

/// Load the config file and resolve the migration context for `pair`.
pub fn load_migration(
    ctx: &AppContext,
    config: Option<&Path>,
    pair: &EnvPair,
) -> Result<(MigrationsConfig, MigrationContext)> {
    let path: PathBuf = config_path(&ctx.work_dir, config);
    let loaded = MigrationsConfig::load(&path)?;
    let migration = loaded.resolve(&pair.from, &pair.to, &ctx.work_dir, &path)?;
    Ok((loaded, migration))
}
