//! Application context with shared state and output helpers

use anyhow::{bail, Context, Result};
use console::{style, StyledObject};
use dialoguer::{theme::ColorfulTheme, Confirm};
use std::env;
use std::path::PathBuf;

/// How a status line is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Header,
    Success,
    Warning,
    Info,
    Error,
}

impl Tone {
    fn paint(self, msg: &str) -> StyledObject<&str> {
        match self {
            Tone::Header => style(msg).bold(),
            Tone::Success => style(msg).green(),
            Tone::Warning => style(msg).yellow(),
            Tone::Info => style(msg).cyan(),
            Tone::Error => style(msg).red().bold(),
        }
    }

    /// Warnings and errors go to stderr
    fn to_stderr(self) -> bool {
        matches!(self, Tone::Warning | Tone::Error)
    }
}

/// Application context passed to all commands
pub struct AppContext {
    /// Site root every wp-cli call runs from
    pub work_dir: PathBuf,
    pub quiet: bool,
}

impl AppContext {
    pub fn new(work_dir: Option<PathBuf>, quiet: bool) -> Result<Self> {
        let work_dir = match work_dir {
            Some(dir) => dir,
            None => env::current_dir().context("Failed to get current directory")?,
        };
        Ok(Self { work_dir, quiet })
    }

    /// Ask before a destructive action, defaulting to no.
    ///
    /// Quiet runs proceed unprompted; without a terminal this is an error.
    pub fn confirm_destructive(&self, prompt: &str) -> Result<bool> {
        if self.quiet {
            return Ok(true);
        }
        if !console::user_attended() {
            bail!("Refusing to prompt without a terminal. Pass --yes to skip confirmation.");
        }
        Ok(Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }

    pub fn say(&self, tone: Tone, msg: &str) {
        if self.quiet && tone != Tone::Error {
            return;
        }
        if tone == Tone::Header {
            println!();
        }
        if tone.to_stderr() {
            eprintln!("{}", tone.paint(msg));
        } else {
            println!("{}", tone.paint(msg));
        }
    }

    pub fn print_header(&self, msg: &str) {
        self.say(Tone::Header, msg);
    }

    pub fn print_success(&self, msg: &str) {
        self.say(Tone::Success, msg);
    }

    pub fn print_warning(&self, msg: &str) {
        self.say(Tone::Warning, msg);
    }

    pub fn print_info(&self, msg: &str) {
        self.say(Tone::Info, msg);
    }

    /// Shown even with --quiet
    pub fn print_error(&self, msg: &str) {
        self.say(Tone::Error, msg);
    }
}
