//! Human-readable progress for pipeline runs.

use console::style;
use site_migrate::{MigrationContext, PipelineObserver, Step, StepOutcome};

use crate::context::AppContext;

/// Describe a step the way an operator reads it.
pub fn describe(step: &Step, migration: &MigrationContext) -> String {
    let at = |role| format!("@{}", migration.environment(role).alias());

    match step {
        Step::CheckWorkDirAvailable => {
            format!("Using site directory {}", migration.work_dir().display())
        }
        Step::CheckAliasAvailable(role) => format!("Checking {} is reachable", at(*role)),
        Step::ExportDatabase(role) => format!("Exporting {} database.", at(*role)),
        Step::ResetDatabase(role) => format!("Resetting {} database.", at(*role)),
        Step::ImportDatabase { from, to } => {
            format!("Importing {} database to {}.", at(*from), at(*to))
        }
        Step::CleanSpamComments(role) => {
            format!("Purging spam comments from {} database", at(*role))
        }
        Step::ApplyRewriteRule { role, rule, .. } => format!(
            "Replacing '{}' with '{}' on {}",
            rule.search(),
            rule.replace(),
            at(*role)
        ),
        Step::OptimizeDatabase(role) => format!("Optimizing the {} database", at(*role)),
        Step::FlushCache(role) => format!("Flushing cache on {}", at(*role)),
        Step::HealthCheck(role) => format!("Running a health-check on {} database", at(*role)),
        Step::ReportSize(role) => format!("Final state of the {} database:", at(*role)),
    }
}

/// Prints a numbered header before each step and the status of failures.
pub struct ConsoleProgress<'a> {
    app: &'a AppContext,
    migration: &'a MigrationContext,
}

impl<'a> ConsoleProgress<'a> {
    pub fn new(app: &'a AppContext, migration: &'a MigrationContext) -> Self {
        Self { app, migration }
    }
}

impl PipelineObserver for ConsoleProgress<'_> {
    fn step_started(&mut self, position: usize, total: usize, step: &Step) {
        if self.app.quiet {
            return;
        }
        println!();
        println!(
            "{} {}",
            style(format!("[{position}/{total}]")).dim(),
            style(describe(step, self.migration)).bold()
        );
    }

    fn step_finished(&mut self, step: &Step, outcome: &StepOutcome) {
        if outcome.is_success() {
            return;
        }
        self.app.print_error(&format!(
            "{} exited with code {}",
            step, outcome.status
        ));
        if let Some(output) = outcome.output.as_deref().map(str::trim) {
            if !output.is_empty() {
                self.app.print_error(output);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_migrate::pipeline;
    use site_migrate::testing::ScriptedExecutor;
    use site_migrate::{Environment, RunResult};
    use std::path::PathBuf;

    fn migration() -> MigrationContext {
        MigrationContext::new(
            Environment::new("production", "example.com", true),
            Environment::new("development", "example.test", false),
            "/var/www/site",
        )
        .unwrap()
    }

    #[test]
    fn test_descriptions_name_the_alias() {
        let migration = migration();
        let lines: Vec<String> = pipeline::plan(&migration)
            .iter()
            .map(|s| describe(s, &migration))
            .collect();

        assert_eq!(lines[0], "Using site directory /var/www/site");
        assert_eq!(lines[5], "Importing @production database to @development.");
        assert_eq!(
            lines[10],
            "Replacing 'https://example.test' with 'http://example.test' on @development"
        );
        assert_eq!(lines[15], "Final state of the @development database:");
    }

    #[test]
    fn test_quiet_progress_runs_pipeline() {
        let app = AppContext {
            work_dir: PathBuf::from("/var/www/site"),
            quiet: true,
        };
        let migration = migration();
        let mut exec = ScriptedExecutor::new().fail_on("@development db check", 4);
        let mut progress = ConsoleProgress::new(&app, &migration);

        let result = pipeline::run_with_observer(&migration, &mut exec, &mut progress);

        assert_eq!(
            result,
            RunResult::Failure {
                step: Step::HealthCheck(site_migrate::Role::Destination),
                status: 4
            }
        );
    }
}
