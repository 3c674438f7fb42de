//! Error types for the migration core.

use thiserror::Error;

use crate::environment::Role;
use crate::pipeline::Step;

/// Result type for context construction.
pub type Result<T> = std::result::Result<T, ContextError>;

/// Errors raised while assembling a [`MigrationContext`](crate::MigrationContext).
///
/// These are configuration problems caught before any step runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    /// Environment alias was empty or whitespace
    #[error("{role} environment has an empty alias")]
    EmptyAlias { role: Role },

    /// Environment host was empty or whitespace
    #[error("{role} environment @{alias} has an empty host")]
    EmptyHost { role: Role, alias: String },

    /// Working directory path was empty
    #[error("working directory is empty")]
    EmptyWorkDir,

    /// An explicit rewrite pair had an empty search string
    #[error("rewrite pair #{index} has an empty search string")]
    EmptySearch { index: usize },
}

/// A run that halted at a failing step.
///
/// Produced by [`RunResult::into_result`](crate::RunResult::into_result) so
/// callers can use `?` on a pipeline run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("step {step} failed with exit code {status}")]
pub struct MigrationFailed {
    pub step: Step,
    pub status: i32,
}
