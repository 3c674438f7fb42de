//! The seam between migration steps and the processes that do the work.

use std::fmt;
use std::path::Path;

/// Exit status reported when the executor could not start a process at all.
pub const SPAWN_FAILED: i32 = 127;

/// Result of one external operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StepOutcome {
    pub status: i32,
    pub output: Option<String>,
}

impl StepOutcome {
    pub fn success() -> Self {
        Self::default()
    }

    pub fn status(status: i32) -> Self {
        Self {
            status,
            output: None,
        }
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == 0
    }

    /// Captured output split on whitespace, empty when nothing was captured
    pub fn output_tokens(&self) -> Vec<&str> {
        self.output
            .as_deref()
            .map(|o| o.split_whitespace().collect())
            .unwrap_or_default()
    }
}

/// One command aimed at an environment alias, e.g. `@dev db export`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub alias: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(alias: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            alias: alias.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// True when the argument list starts with the given words
    pub fn starts_with(&self, prefix: &[&str]) -> bool {
        self.args.len() >= prefix.len() && self.args.iter().zip(prefix).all(|(a, p)| a == p)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.alias)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// How an invocation's output is handled.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecOptions {
    /// Suppress the command's own output
    pub silent: bool,
    /// Capture stdout into [`StepOutcome::output`]
    pub capture: bool,
    /// Feed this invocation's stdout into the command's stdin
    pub pipe_from: Option<Invocation>,
}

impl ExecOptions {
    pub fn visible() -> Self {
        Self::default()
    }

    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Self::default()
        }
    }

    pub fn captured() -> Self {
        Self {
            silent: true,
            capture: true,
            ..Self::default()
        }
    }

    pub fn piped_from(source: Invocation) -> Self {
        Self {
            pipe_from: Some(source),
            ..Self::default()
        }
    }
}

/// Runs external operations for the step library.
///
/// Implementations never fail with an error: anything that goes wrong is a
/// non-zero status on the returned outcome.
#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor {
    /// Use `path` as the working directory for every later invocation.
    fn set_working_directory(&mut self, path: &Path) -> StepOutcome;

    fn execute(&mut self, invocation: &Invocation, options: &ExecOptions) -> StepOutcome;
}
