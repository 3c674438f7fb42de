//! The fixed migration sequence and its fail-fast runner.
//!
//! ```text
//! checkWorkDirAvailable
//! → checkAliasAvailable(origin) → checkAliasAvailable(destination)
//! → exportDatabase(destination) → resetDatabase(destination)
//! → importDatabase(origin → destination) → cleanSpamComments(destination)
//! → applyRewriteRule × N (destination)
//! → optimizeDatabase(destination) → flushCache(destination) → healthCheck(destination)
//! → reportSize(origin) → reportSize(destination)
//! ```
//!
//! The first non-zero status ends the run. Nothing after it is attempted,
//! the two size reports included.

use std::fmt;

use tracing::info;

use crate::environment::{MigrationContext, Role};
use crate::error::MigrationFailed;
use crate::executor::{CommandExecutor, StepOutcome};
use crate::rewrite::RewriteRule;
use crate::steps;

/// One entry of the migration plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    CheckWorkDirAvailable,
    CheckAliasAvailable(Role),
    ExportDatabase(Role),
    ResetDatabase(Role),
    ImportDatabase { from: Role, to: Role },
    CleanSpamComments(Role),
    /// `index` is 1-based within the run's rule list
    ApplyRewriteRule {
        index: usize,
        role: Role,
        rule: RewriteRule,
    },
    OptimizeDatabase(Role),
    FlushCache(Role),
    HealthCheck(Role),
    ReportSize(Role),
}

impl Step {
    /// Operation name without its target, e.g. `exportDatabase`
    pub fn operation(&self) -> &'static str {
        match self {
            Step::CheckWorkDirAvailable => "checkWorkDirAvailable",
            Step::CheckAliasAvailable(_) => "checkAliasAvailable",
            Step::ExportDatabase(_) => "exportDatabase",
            Step::ResetDatabase(_) => "resetDatabase",
            Step::ImportDatabase { .. } => "importDatabase",
            Step::CleanSpamComments(_) => "cleanSpamComments",
            Step::ApplyRewriteRule { .. } => "applyRewriteRule",
            Step::OptimizeDatabase(_) => "optimizeDatabase",
            Step::FlushCache(_) => "flushCache",
            Step::HealthCheck(_) => "healthCheck",
            Step::ReportSize(_) => "reportSize",
        }
    }

    /// Whether the step changes the destination's stored data
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            Step::ResetDatabase(_)
                | Step::ImportDatabase { .. }
                | Step::CleanSpamComments(_)
                | Step::ApplyRewriteRule { .. }
                | Step::OptimizeDatabase(_)
        )
    }

    /// Run this step against the context's environments.
    pub fn execute<E>(&self, ctx: &MigrationContext, executor: &mut E) -> StepOutcome
    where
        E: CommandExecutor + ?Sized,
    {
        let alias = |role: Role| ctx.environment(role).alias();

        match self {
            Step::CheckWorkDirAvailable => steps::check_work_dir_available(executor, ctx.work_dir()),
            Step::CheckAliasAvailable(role) => steps::check_alias_available(executor, alias(*role)),
            Step::ExportDatabase(role) => steps::export_database(executor, alias(*role)),
            Step::ResetDatabase(role) => steps::reset_database(executor, alias(*role)),
            Step::ImportDatabase { from, to } => {
                steps::import_database(executor, alias(*from), alias(*to))
            }
            Step::CleanSpamComments(role) => steps::clean_spam_comments(executor, alias(*role)),
            Step::ApplyRewriteRule { role, rule, .. } => {
                steps::apply_rewrite_rule(executor, alias(*role), rule)
            }
            Step::OptimizeDatabase(role) => steps::optimize_database(executor, alias(*role)),
            Step::FlushCache(role) => steps::flush_cache(executor, alias(*role)),
            Step::HealthCheck(role) => steps::health_check(executor, alias(*role)),
            Step::ReportSize(role) => steps::report_size(executor, alias(*role)),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::CheckWorkDirAvailable => f.write_str(self.operation()),
            Step::ImportDatabase { from, to } => {
                write!(f, "{}:{from}->{to}", self.operation())
            }
            Step::ApplyRewriteRule { index, role, .. } => {
                write!(f, "{}#{index}:{role}", self.operation())
            }
            Step::CheckAliasAvailable(role)
            | Step::ExportDatabase(role)
            | Step::ResetDatabase(role)
            | Step::CleanSpamComments(role)
            | Step::OptimizeDatabase(role)
            | Step::FlushCache(role)
            | Step::HealthCheck(role)
            | Step::ReportSize(role) => write!(f, "{}:{role}", self.operation()),
        }
    }
}

/// Terminal state of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunResult {
    Success,
    Failure { step: Step, status: i32 },
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        matches!(self, RunResult::Success)
    }

    pub fn into_result(self) -> Result<(), MigrationFailed> {
        match self {
            RunResult::Success => Ok(()),
            RunResult::Failure { step, status } => Err(MigrationFailed { step, status }),
        }
    }
}

/// Receives progress notifications while a pipeline runs.
pub trait PipelineObserver {
    fn step_started(&mut self, _position: usize, _total: usize, _step: &Step) {}

    fn step_finished(&mut self, _step: &Step, _outcome: &StepOutcome) {}
}

/// Observer that ignores everything.
impl PipelineObserver for () {}

/// Build the ordered step list for a context.
pub fn plan(ctx: &MigrationContext) -> Vec<Step> {
    use Role::{Destination, Origin};

    let mut plan = vec![
        Step::CheckWorkDirAvailable,
        Step::CheckAliasAvailable(Origin),
        Step::CheckAliasAvailable(Destination),
        Step::ExportDatabase(Destination),
        Step::ResetDatabase(Destination),
        Step::ImportDatabase {
            from: Origin,
            to: Destination,
        },
        Step::CleanSpamComments(Destination),
    ];

    plan.extend(
        ctx.rewrite_rules()
            .into_iter()
            .enumerate()
            .map(|(i, rule)| Step::ApplyRewriteRule {
                index: i + 1,
                role: Destination,
                rule,
            }),
    );

    plan.extend([
        Step::OptimizeDatabase(Destination),
        Step::FlushCache(Destination),
        Step::HealthCheck(Destination),
        Step::ReportSize(Origin),
        Step::ReportSize(Destination),
    ]);

    plan
}

/// Run the full migration without progress reporting.
pub fn run<E>(ctx: &MigrationContext, executor: &mut E) -> RunResult
where
    E: CommandExecutor + ?Sized,
{
    run_with_observer(ctx, executor, &mut ())
}

/// Run the full migration, stopping at the first failing step.
pub fn run_with_observer<E, O>(ctx: &MigrationContext, executor: &mut E, observer: &mut O) -> RunResult
where
    E: CommandExecutor + ?Sized,
    O: PipelineObserver + ?Sized,
{
    let steps = plan(ctx);
    let total = steps.len();

    info!(
        origin = ctx.origin().alias(),
        destination = ctx.destination().alias(),
        steps = total,
        "starting migration"
    );

    for (i, step) in steps.into_iter().enumerate() {
        observer.step_started(i + 1, total, &step);
        info!(step = %step, "running step");

        let outcome = step.execute(ctx, executor);
        observer.step_finished(&step, &outcome);

        if !outcome.is_success() {
            info!(step = %step, status = outcome.status, "step failed, aborting migration");
            return RunResult::Failure {
                step,
                status: outcome.status,
            };
        }
    }

    info!("migration complete");
    RunResult::Success
}
