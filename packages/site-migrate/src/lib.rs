//! Pull a site database from one wp-cli alias into another.
//!
//! A run exports the destination as a backup, resets it, streams the origin's
//! database into it, then cleans and rewrites the imported content so stored
//! URLs point at the destination host:
//!
//! ```ignore
//! use site_migrate::{pipeline, Environment, MigrationContext, RunResult, WpCli};
//!
//! let ctx = MigrationContext::new(
//!     Environment::new("production", "example.com", true),
//!     Environment::new("development", "example.test", false),
//!     "/var/www/site",
//! )?;
//!
//! match pipeline::run(&ctx, &mut WpCli::default()) {
//!     RunResult::Success => println!("done"),
//!     RunResult::Failure { step, status } => eprintln!("{step} exited {status}"),
//! }
//! ```
//!
//! The step sequence is fixed and fails fast: the first non-zero exit status
//! ends the run and nothing after it is attempted.

pub mod environment;
pub mod error;
pub mod executor;
pub mod pipeline;
pub mod rewrite;
pub mod steps;
pub mod wp_cli;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[cfg(test)]
mod test_log;

pub use environment::{Environment, MigrationContext, Role};
pub use error::{ContextError, MigrationFailed};
pub use executor::{CommandExecutor, ExecOptions, Invocation, StepOutcome};
pub use pipeline::{PipelineObserver, RunResult, Step};
pub use rewrite::{host_rules, RewriteRule, RewriteStrategy};
pub use wp_cli::WpCli;
