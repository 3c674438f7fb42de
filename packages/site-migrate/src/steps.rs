//! Step library: one wp-cli operation per function.
//!
//! Every function hands a single invocation to the executor (spam cleanup
//! issues one delete per comment) and returns the outcome untouched. Nothing
//! here retries or downgrades a failure.

use std::path::Path;

use tracing::debug;

use crate::executor::{CommandExecutor, ExecOptions, Invocation, StepOutcome};
use crate::rewrite::RewriteRule;

/// Flags passed to every `search-replace` run.
pub const SEARCH_REPLACE_FLAGS: [&str; 4] = [
    "--recurse-objects",
    "--all-tables",
    "--precise",
    "--report-changed-only",
];

fn exec<E>(executor: &mut E, invocation: Invocation, options: ExecOptions) -> StepOutcome
where
    E: CommandExecutor + ?Sized,
{
    debug!(command = %invocation, silent = options.silent, "executing");
    executor.execute(&invocation, &options)
}

/// Point the executor at the site root.
pub fn check_work_dir_available<E>(executor: &mut E, work_dir: &Path) -> StepOutcome
where
    E: CommandExecutor + ?Sized,
{
    debug!(work_dir = %work_dir.display(), "switching working directory");
    executor.set_working_directory(work_dir)
}

pub fn check_alias_available<E>(executor: &mut E, alias: &str) -> StepOutcome
where
    E: CommandExecutor + ?Sized,
{
    exec(
        executor,
        Invocation::new(alias, ["--info"]),
        ExecOptions::silent(),
    )
}

/// Dump the database to a file in the working directory.
pub fn export_database<E>(executor: &mut E, alias: &str) -> StepOutcome
where
    E: CommandExecutor + ?Sized,
{
    exec(
        executor,
        Invocation::new(alias, ["db", "export"]),
        ExecOptions::visible(),
    )
}

/// Drop every table. Irreversible without the export taken beforehand.
pub fn reset_database<E>(executor: &mut E, alias: &str) -> StepOutcome
where
    E: CommandExecutor + ?Sized,
{
    exec(
        executor,
        Invocation::new(alias, ["db", "reset", "--yes"]),
        ExecOptions::visible(),
    )
}

/// Stream `from`'s export straight into `to`'s import.
pub fn import_database<E>(executor: &mut E, from: &str, to: &str) -> StepOutcome
where
    E: CommandExecutor + ?Sized,
{
    let source = Invocation::new(from, ["db", "export", "-"]);
    exec(
        executor,
        Invocation::new(to, ["db", "import", "-"]),
        ExecOptions::piped_from(source),
    )
}

/// List spam comment ids, then delete them one at a time.
pub fn clean_spam_comments<E>(executor: &mut E, alias: &str) -> StepOutcome
where
    E: CommandExecutor + ?Sized,
{
    let listed = exec(
        executor,
        Invocation::new(alias, ["comment", "list", "--format=ids", "--status=spam"]),
        ExecOptions::captured(),
    );
    if !listed.is_success() {
        return listed;
    }

    let ids: Vec<String> = listed
        .output_tokens()
        .into_iter()
        .map(str::to_string)
        .collect();
    debug!(alias, count = ids.len(), "spam comments found");

    for id in &ids {
        let deleted = exec(
            executor,
            Invocation::new(alias, ["comment", "delete", id.as_str()]),
            ExecOptions::visible(),
        );
        if !deleted.is_success() {
            return deleted;
        }
    }

    StepOutcome::success()
}

/// Literal search-replace across every table, including serialized data.
pub fn apply_rewrite_rule<E>(executor: &mut E, alias: &str, rule: &RewriteRule) -> StepOutcome
where
    E: CommandExecutor + ?Sized,
{
    let mut args = vec![
        "search-replace".to_string(),
        rule.search().to_string(),
        rule.replace().to_string(),
    ];
    args.extend(SEARCH_REPLACE_FLAGS.iter().map(|f| f.to_string()));

    exec(
        executor,
        Invocation::new(alias, args),
        ExecOptions::visible(),
    )
}

pub fn optimize_database<E>(executor: &mut E, alias: &str) -> StepOutcome
where
    E: CommandExecutor + ?Sized,
{
    exec(
        executor,
        Invocation::new(alias, ["db", "optimize", "--quiet"]),
        ExecOptions::silent(),
    )
}

pub fn flush_cache<E>(executor: &mut E, alias: &str) -> StepOutcome
where
    E: CommandExecutor + ?Sized,
{
    exec(
        executor,
        Invocation::new(alias, ["cache", "flush"]),
        ExecOptions::visible(),
    )
}

/// Consistency check only; `db check` never repairs.
pub fn health_check<E>(executor: &mut E, alias: &str) -> StepOutcome
where
    E: CommandExecutor + ?Sized,
{
    exec(
        executor,
        Invocation::new(alias, ["db", "check"]),
        ExecOptions::silent(),
    )
}

pub fn report_size<E>(executor: &mut E, alias: &str) -> StepOutcome
where
    E: CommandExecutor + ?Sized,
{
    exec(
        executor,
        Invocation::new(alias, ["db", "size", "--all-tables"]),
        ExecOptions::visible(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::MockCommandExecutor;
    use mockall::predicate::eq;
    use mockall::Sequence;

    #[test]
    fn test_check_work_dir_sets_directory() {
        let mut exec = MockCommandExecutor::new();
        exec.expect_set_working_directory()
            .withf(|p| p == Path::new("/srv/site"))
            .times(1)
            .returning(|_| StepOutcome::success());

        let outcome = check_work_dir_available(&mut exec, Path::new("/srv/site"));
        assert!(outcome.is_success());
    }

    #[test]
    fn test_check_alias_is_silent_info() {
        let mut exec = MockCommandExecutor::new();
        exec.expect_execute()
            .with(
                eq(Invocation::new("prod", ["--info"])),
                eq(ExecOptions::silent()),
            )
            .times(1)
            .returning(|_, _| StepOutcome::status(1));

        assert_eq!(check_alias_available(&mut exec, "prod").status, 1);
    }

    #[test]
    fn test_reset_is_non_interactive() {
        let mut exec = MockCommandExecutor::new();
        exec.expect_execute()
            .withf(|inv, _| inv.args == ["db", "reset", "--yes"])
            .times(1)
            .returning(|_, _| StepOutcome::success());

        assert!(reset_database(&mut exec, "dev").is_success());
    }

    #[test]
    fn test_import_pipes_export_into_import() {
        let mut exec = MockCommandExecutor::new();
        exec.expect_execute()
            .with(
                eq(Invocation::new("dev", ["db", "import", "-"])),
                eq(ExecOptions::piped_from(Invocation::new(
                    "prod",
                    ["db", "export", "-"],
                ))),
            )
            .times(1)
            .returning(|_, _| StepOutcome::success());

        assert!(import_database(&mut exec, "prod", "dev").is_success());
    }

    #[test]
    fn test_rewrite_rule_passes_literal_pair_and_flags() {
        let mut exec = MockCommandExecutor::new();
        exec.expect_execute()
            .withf(|inv, opts| {
                inv.alias == "dev"
                    && inv.args
                        == [
                            "search-replace",
                            r"\/\/example.com",
                            r"\/\/example.test",
                            "--recurse-objects",
                            "--all-tables",
                            "--precise",
                            "--report-changed-only",
                        ]
                    && opts.pipe_from.is_none()
            })
            .times(1)
            .returning(|_, _| StepOutcome::success());

        let rule = RewriteRule::new(r"\/\/example.com", r"\/\/example.test");
        assert!(apply_rewrite_rule(&mut exec, "dev", &rule).is_success());
    }

    #[test]
    fn test_clean_spam_deletes_each_id() {
        let mut exec = MockCommandExecutor::new();
        let mut seq = Sequence::new();
        exec.expect_execute()
            .withf(|inv, opts| inv.starts_with(&["comment", "list"]) && opts.capture)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| StepOutcome::success().with_output("11 12\n"));
        for id in ["11", "12"] {
            exec.expect_execute()
                .withf(move |inv, _| inv.args == ["comment", "delete", id])
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _| StepOutcome::success());
        }

        assert!(clean_spam_comments(&mut exec, "dev").is_success());
    }

    #[test]
    fn test_clean_spam_with_no_spam_is_success() {
        let mut exec = MockCommandExecutor::new();
        exec.expect_execute()
            .times(1)
            .returning(|_, _| StepOutcome::success().with_output(""));

        assert!(clean_spam_comments(&mut exec, "dev").is_success());
    }

    #[test]
    fn test_clean_spam_stops_at_first_failed_delete() {
        let mut exec = MockCommandExecutor::new();
        exec.expect_execute()
            .withf(|inv, _| inv.starts_with(&["comment", "list"]))
            .times(1)
            .returning(|_, _| StepOutcome::success().with_output("1 2 3"));
        exec.expect_execute()
            .withf(|inv, _| inv.args == ["comment", "delete", "1"])
            .times(1)
            .returning(|_, _| StepOutcome::success());
        exec.expect_execute()
            .withf(|inv, _| inv.args == ["comment", "delete", "2"])
            .times(1)
            .returning(|_, _| StepOutcome::status(3));
        exec.expect_execute()
            .withf(|inv, _| inv.args == ["comment", "delete", "3"])
            .never();

        assert_eq!(clean_spam_comments(&mut exec, "dev").status, 3);
    }

    #[test]
    fn test_clean_spam_propagates_list_failure() {
        let mut exec = MockCommandExecutor::new();
        exec.expect_execute()
            .times(1)
            .returning(|_, _| StepOutcome::status(255));

        assert_eq!(clean_spam_comments(&mut exec, "dev").status, 255);
    }

    #[test]
    fn test_report_size_propagates_status_unchanged() {
        let mut exec = MockCommandExecutor::new();
        exec.expect_execute()
            .withf(|inv, opts| inv.args == ["db", "size", "--all-tables"] && !opts.silent)
            .times(1)
            .returning(|_, _| StepOutcome::status(42));

        assert_eq!(report_size(&mut exec, "prod").status, 42);
    }
}
