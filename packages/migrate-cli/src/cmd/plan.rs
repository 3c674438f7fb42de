//! `plan`: show what a run would do without touching anything

use anyhow::Result;
use console::style;
use site_migrate::{pipeline, Environment, MigrationContext};
use std::path::Path;

use super::{load_migration, EnvPair};
use crate::context::AppContext;
use crate::progress::describe;

pub fn run(ctx: &AppContext, config: Option<&Path>, pair: &EnvPair) -> Result<()> {
    let (_, migration) = load_migration(ctx, config, pair)?;
    print_plan(&migration);
    Ok(())
}

fn environment_line(label: &str, env: &Environment) -> String {
    format!(
        "{:<12} @{} ({}://{})",
        label,
        env.alias(),
        env.scheme(),
        env.host()
    )
}

pub fn print_plan(migration: &MigrationContext) {
    println!("{}", style("Migration plan").bold());
    println!("{}", environment_line("Origin:", migration.origin()));
    println!("{}", environment_line("Destination:", migration.destination()));
    println!("{:<12} {}", "Directory:", migration.work_dir().display());
    println!();

    for (i, step) in pipeline::plan(migration).iter().enumerate() {
        let marker = if step.is_destructive() {
            style("*").red().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "{:>3}. {} {}  {}",
            i + 1,
            marker,
            describe(step, migration),
            style(format!("({step})")).dim()
        );
    }

    println!();
    println!("{}", style("* modifies the destination database").dim());
}
