//! Scripted executor for exercising the pipeline without spawning processes.
//!
//! Every call is rendered to a line (`cd <dir>`, `@alias args...`, or
//! `@from args... | @to args...` for piped imports) and recorded in order.
//! Calls succeed unless a failure was scripted for that line or call index.

use std::collections::HashMap;
use std::path::Path;

use crate::executor::{CommandExecutor, ExecOptions, Invocation, StepOutcome};

#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    calls: Vec<String>,
    failures: HashMap<String, i32>,
    fail_at: Option<(usize, i32)>,
    outputs: HashMap<String, String>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `status` whenever the rendered call equals `line`.
    pub fn fail_on(mut self, line: impl Into<String>, status: i32) -> Self {
        self.failures.insert(line.into(), status);
        self
    }

    /// Return `status` for the call at zero-based position `index`.
    pub fn fail_at_call(mut self, index: usize, status: i32) -> Self {
        self.fail_at = Some((index, status));
        self
    }

    /// Attach captured output to a successful call.
    pub fn output_for(mut self, line: impl Into<String>, output: impl Into<String>) -> Self {
        self.outputs.insert(line.into(), output.into());
        self
    }

    /// Rendered calls in the order they were made
    pub fn calls(&self) -> Vec<String> {
        self.calls.clone()
    }

    fn record(&mut self, line: String) -> StepOutcome {
        let index = self.calls.len();
        self.calls.push(line.clone());

        if let Some((at, status)) = self.fail_at {
            if at == index {
                return StepOutcome::status(status);
            }
        }
        if let Some(status) = self.failures.get(&line) {
            return StepOutcome::status(*status);
        }
        match self.outputs.get(&line) {
            Some(output) => StepOutcome::success().with_output(output.clone()),
            None => StepOutcome::success(),
        }
    }
}

impl CommandExecutor for ScriptedExecutor {
    fn set_working_directory(&mut self, path: &Path) -> StepOutcome {
        self.record(format!("cd {}", path.display()))
    }

    fn execute(&mut self, invocation: &Invocation, options: &ExecOptions) -> StepOutcome {
        let line = match &options.pipe_from {
            Some(source) => format!("{source} | {invocation}"),
            None => invocation.to_string(),
        };
        self.record(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{Environment, MigrationContext};
    use crate::pipeline::{run, RunResult};

    fn context() -> MigrationContext {
        MigrationContext::new(
            Environment::new("production", "example.com", true),
            Environment::new("development", "example.test", false),
            "/var/www/site",
        )
        .unwrap()
    }

    #[test]
    fn test_full_run_transcript() {
        let mut exec = ScriptedExecutor::new()
            .output_for("@development comment list --format=ids --status=spam", "31 32");

        assert!(run(&context(), &mut exec).is_success());

        let flags = "--recurse-objects --all-tables --precise --report-changed-only";
        let expected = vec![
            "cd /var/www/site".to_string(),
            "@production --info".to_string(),
            "@development --info".to_string(),
            "@development db export".to_string(),
            "@development db reset --yes".to_string(),
            "@production db export - | @development db import -".to_string(),
            "@development comment list --format=ids --status=spam".to_string(),
            "@development comment delete 31".to_string(),
            "@development comment delete 32".to_string(),
            format!("@development search-replace example.com example.test {flags}"),
            format!("@development search-replace //example.com //example.test {flags}"),
            format!(r"@development search-replace \/\/example.com \/\/example.test {flags}"),
            format!("@development search-replace https://example.test http://example.test {flags}"),
            "@development db optimize --quiet".to_string(),
            "@development cache flush".to_string(),
            "@development db check".to_string(),
            "@production db size --all-tables".to_string(),
            "@development db size --all-tables".to_string(),
        ];
        assert_eq!(exec.calls(), expected);
    }

    #[test]
    fn test_failed_spam_delete_fails_cleanup_step() {
        let mut exec = ScriptedExecutor::new()
            .output_for("@development comment list --format=ids --status=spam", "9")
            .fail_on("@development comment delete 9", 1);

        let result = run(&context(), &mut exec);

        match result {
            RunResult::Failure { step, status } => {
                assert_eq!(step.to_string(), "cleanSpamComments:destination");
                assert_eq!(status, 1);
            }
            RunResult::Success => panic!("expected failure"),
        }
        assert_eq!(
            exec.calls().last().map(String::as_str),
            Some("@development comment delete 9")
        );
    }
}
