//! `run`: execute the full migration pipeline

use anyhow::Result;
use chrono::Local;
use site_migrate::{
    pipeline, CommandExecutor, MigrationContext, MigrationFailed, RunResult, Step, WpCli,
};
use std::path::Path;
use tracing::info;

use super::{load_migration, EnvPair};
use crate::context::AppContext;
use crate::progress::ConsoleProgress;
use crate::utils::ensure_wp_cli;

pub fn run(ctx: &AppContext, config: Option<&Path>, pair: &EnvPair, yes: bool) -> Result<()> {
    let (loaded, migration) = load_migration(ctx, config, pair)?;
    ensure_wp_cli(&loaded.wp.binary, migration.work_dir())?;

    let prompt = format!(
        "This will RESET the @{} database and replace it with @{}. Continue?",
        migration.destination().alias(),
        migration.origin().alias()
    );
    let proceed = yes || ctx.confirm_destructive(&prompt)?;
    if !proceed {
        println!("Cancelled.");
        return Ok(());
    }

    let mut executor = WpCli::new(loaded.wp.binary.clone());
    execute(ctx, &migration, &mut executor)
}

/// Run the pipeline with console progress and turn a failure into an error.
pub fn execute<E>(ctx: &AppContext, migration: &MigrationContext, executor: &mut E) -> Result<()>
where
    E: CommandExecutor + ?Sized,
{
    let started = Local::now();
    ctx.print_header(&format!(
        "Migrating @{} -> @{} (started {})",
        migration.origin().alias(),
        migration.destination().alias(),
        started.format("%Y-%m-%d %H:%M:%S")
    ));

    let mut progress = ConsoleProgress::new(ctx, migration);
    let result = pipeline::run_with_observer(migration, executor, &mut progress);
    let elapsed = Local::now().signed_duration_since(started);
    info!(elapsed_secs = elapsed.num_seconds(), success = result.is_success(), "run finished");

    match result {
        RunResult::Success => {
            println!();
            ctx.print_success(&format!(
                "Migration complete in {}s.",
                elapsed.num_seconds()
            ));
            ctx.print_info(&format!(
                "The pre-reset export of @{} is in {}.",
                migration.destination().alias(),
                migration.work_dir().display()
            ));
            Ok(())
        }
        RunResult::Failure { step, status } => {
            if matches!(
                step,
                Step::CheckWorkDirAvailable | Step::CheckAliasAvailable(_) | Step::ExportDatabase(_)
            ) {
                ctx.print_warning("The destination database was not modified.");
            }
            Err(MigrationFailed { step, status }.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_migrate::testing::ScriptedExecutor;
    use site_migrate::{Environment, Role};
    use std::path::PathBuf;

    fn quiet() -> AppContext {
        AppContext {
            work_dir: PathBuf::from("/srv/site"),
            quiet: true,
        }
    }

    fn migration() -> MigrationContext {
        MigrationContext::new(
            Environment::new("production", "example.com", true),
            Environment::new("development", "example.test", false),
            "/srv/site",
        )
        .unwrap()
    }

    #[test]
    fn test_success_is_ok() {
        let mut exec = ScriptedExecutor::new();
        execute(&quiet(), &migration(), &mut exec).unwrap();
        assert_eq!(exec.calls().len(), 16);
    }

    #[test]
    fn test_failure_becomes_error_naming_step() {
        let mut exec = ScriptedExecutor::new().fail_on("@development --info", 1);

        let err = execute(&quiet(), &migration(), &mut exec).unwrap_err();

        let failed = err.downcast_ref::<MigrationFailed>().unwrap();
        assert_eq!(failed.step, Step::CheckAliasAvailable(Role::Destination));
        assert_eq!(failed.status, 1);
        assert_eq!(
            err.to_string(),
            "step checkAliasAvailable:destination failed with exit code 1"
        );
    }
}
