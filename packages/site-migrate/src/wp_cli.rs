//! Process-backed executor that drives the `wp` command line.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

use tracing::error;

use crate::executor::{CommandExecutor, ExecOptions, Invocation, StepOutcome, SPAWN_FAILED};

pub const DEFAULT_BINARY: &str = "wp";

/// Runs invocations as `wp @<alias> <args...>` from a fixed working directory.
#[derive(Debug, Clone)]
pub struct WpCli {
    binary: String,
    cwd: Option<PathBuf>,
}

impl Default for WpCli {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY)
    }
}

impl WpCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            cwd: None,
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Working directory applied to spawned processes, once set
    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    fn build_command(&self, invocation: &Invocation) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(format!("@{}", invocation.alias));
        cmd.args(&invocation.args);
        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }

    fn spawn(&self, invocation: &Invocation, options: &ExecOptions) -> io::Result<Child> {
        let mut cmd = self.build_command(invocation);
        if options.capture {
            // wp-cli must never sit waiting on a prompt while we read its stdout
            cmd.stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());
        } else if options.silent {
            cmd.stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null());
        } else {
            cmd.stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());
        }
        cmd.spawn()
    }

    fn run_piped(&self, source: &Invocation, target: &Invocation) -> io::Result<StepOutcome> {
        let mut producer = self
            .build_command(source)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        let pipe = producer
            .stdout
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "export stdout unavailable"))?;

        let consumer = self
            .build_command(target)
            .stdin(Stdio::from(pipe))
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn();

        let mut consumer = match consumer {
            Ok(child) => child,
            Err(e) => {
                let _ = producer.kill();
                let _ = producer.wait();
                return Err(e);
            }
        };

        let consumed = match consumer.wait() {
            Ok(status) => status,
            Err(e) => {
                let _ = producer.kill();
                let _ = producer.wait();
                return Err(e);
            }
        };
        let produced = producer.wait()?;

        // A failed export leaves the import with a truncated stream; report it first.
        if !produced.success() {
            return Ok(StepOutcome::status(exit_code(produced)));
        }
        Ok(StepOutcome::status(exit_code(consumed)))
    }

    fn run(&self, invocation: &Invocation, options: &ExecOptions) -> io::Result<StepOutcome> {
        if let Some(ref source) = options.pipe_from {
            return self.run_piped(source, invocation);
        }

        let mut child = self.spawn(invocation, options)?;
        if options.capture {
            let output = child.wait_with_output()?;
            let status = exit_code(output.status);
            // A failed listing reports wp-cli's stderr instead of its partial stdout
            let text = if status != 0 && !output.stderr.is_empty() {
                &output.stderr
            } else {
                &output.stdout
            };
            let text = String::from_utf8_lossy(text).to_string();
            return Ok(StepOutcome::status(status).with_output(text));
        }

        let status = child.wait()?;
        Ok(StepOutcome::status(exit_code(status)))
    }
}

/// Signal-terminated processes have no exit code; treat them as failures.
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

impl CommandExecutor for WpCli {
    fn set_working_directory(&mut self, path: &Path) -> StepOutcome {
        match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => {
                self.cwd = Some(path.to_path_buf());
                StepOutcome::success()
            }
            Ok(_) => StepOutcome::status(1)
                .with_output(format!("{} is not a directory", path.display())),
            Err(e) => StepOutcome::status(1).with_output(format!("{}: {e}", path.display())),
        }
    }

    fn execute(&mut self, invocation: &Invocation, options: &ExecOptions) -> StepOutcome {
        match self.run(invocation, options) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(binary = %self.binary, command = %invocation, error = %e, "failed to start");
                StepOutcome::status(SPAWN_FAILED)
                    .with_output(format!("failed to start: {} {invocation}: {e}", self.binary))
            }
        }
    }
}
