//! Runs command lines through the host shell interpreter.
//!
//! The child inherits the terminal (stdin, stdout and stderr), so pagers,
//! editors and other full-screen programs work as they would in a normal
//! shell. Nothing is captured; the executor only reports whether the command
//! succeeded.

use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, info};

#[cfg(windows)]
const FALLBACK_SHELL: &str = "cmd";
#[cfg(not(windows))]
const FALLBACK_SHELL: &str = "sh";

/// Error for a command that started but did not succeed.
///
/// Callers can tell it apart from a spawn failure with
/// `anyhow::Error::downcast_ref`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonZeroExit(pub ExitStatus);

impl fmt::Display for NonZeroExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command exited with {}", self.0)
    }
}

impl std::error::Error for NonZeroExit {}

// =============================================================================
// Traits for Dependency Injection
// =============================================================================

/// Trait for running system processes.
///
/// This abstraction enables testing without spawning real processes.
pub trait ProcessRunner: Send + Sync {
    /// Runs `program` with `args` attached to the current terminal and waits
    /// for it to exit.
    fn run_attached(&self, program: &str, args: &[&str]) -> Result<ExitStatus>;
}

/// Default process runner using std::process::Command.
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run_attached(&self, program: &str, args: &[&str]) -> Result<ExitStatus> {
        Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to start {}", program))
    }
}

// =============================================================================
// Executor Implementation
// =============================================================================

/// Executes command lines as `<shell> -c <line>` (or `cmd /C <line>`).
///
/// # Example
///
/// ```ignore
/// let executor = Executor::new(Executor::detect_shell(None));
/// executor.execute("ls -la")?;
/// ```
pub struct Executor {
    shell: String,
    runner: Box<dyn ProcessRunner>,
}

impl Executor {
    /// Creates an executor that spawns real processes through `shell`.
    pub fn new(shell: impl Into<String>) -> Self {
        Self::with_runner(shell, Box::new(SystemProcessRunner))
    }

    /// Creates an executor with a custom process runner (for testing).
    pub fn with_runner(shell: impl Into<String>, runner: Box<dyn ProcessRunner>) -> Self {
        Self {
            shell: shell.into(),
            runner,
        }
    }

    /// Picks the interpreter: `preferred` if set, else `bash` when it is on
    /// `PATH`, else the platform fallback.
    pub fn detect_shell(preferred: Option<&str>) -> String {
        if let Some(shell) = preferred.map(str::trim).filter(|s| !s.is_empty()) {
            return shell.to_string();
        }
        if cfg!(not(windows)) && which::which("bash").is_ok() {
            return "bash".to_string();
        }
        FALLBACK_SHELL.to_string()
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    fn command_flag(&self) -> &'static str {
        let name = self
            .shell
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.shell)
            .to_ascii_lowercase();
        if name == "cmd" || name == "cmd.exe" {
            "/C"
        } else {
            "-c"
        }
    }

    /// Runs `command_line` and waits for it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The command line is blank
    /// - The interpreter cannot be started
    /// - The command exits with a non-zero status
    pub fn execute(&self, command_line: &str) -> Result<()> {
        if command_line.trim().is_empty() {
            return Err(anyhow!("No command provided"));
        }

        info!("Executing via {}: {}", self.shell, command_line);
        let status = self
            .runner
            .run_attached(&self.shell, &[self.command_flag(), command_line])?;

        if status.success() {
            Ok(())
        } else {
            debug!("Command failed with status: {}", status);
            Err(NonZeroExit(status).into())
        }
    }
}
