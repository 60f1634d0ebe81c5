//! User interface for confirming model-suggested commands.
//!
//! This module shows the suggested command and collects the user's decision:
//! run it once, run it and stop asking, or cancel.

use crate::line_source::LineSource;
use anyhow::Result;
use std::io::Write;
use tracing::{info, warn};

/// The user's answer to a suggested command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationDecision {
    /// Run this command, keep asking next time.
    AcceptOnce,
    /// Run this command and switch the session to auto-execute.
    AcceptAlways,
    /// Do not run anything.
    Reject,
}

impl ConfirmationDecision {
    /// Interprets a reply; `s`/`y` accept once, `x` accepts always, anything
    /// else (including an empty reply) rejects.
    pub fn from_reply(reply: &str) -> Self {
        match reply.trim().to_lowercase().as_str() {
            "s" | "y" => ConfirmationDecision::AcceptOnce,
            "x" => ConfirmationDecision::AcceptAlways,
            _ => ConfirmationDecision::Reject,
        }
    }

    pub fn runs_command(self) -> bool {
        !matches!(self, ConfirmationDecision::Reject)
    }
}

/// Handles user interaction for command confirmation.
///
/// Invalid replies are not re-prompted; they count as a rejection.
///
/// # Example
///
/// ```no_run
/// use ia_shell::confirmation_ui::ConfirmationUI;
/// use ia_shell::line_source::ReaderLineSource;
/// use std::io::{self, Cursor};
///
/// let ui = ConfirmationUI::new();
/// let mut input = ReaderLineSource::new(Cursor::new(b"x\n".to_vec()));
/// let decision = ui.prompt_for_decision_with_io(
///     "ls -la",
///     &mut input,
///     &mut io::stdout(),
///     &mut io::stderr(),
/// )?;
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct ConfirmationUI;

impl ConfirmationUI {
    pub fn new() -> Self {
        Self
    }

    /// Displays `command` and reads the user's decision from `input`.
    ///
    /// End of input and read failures count as [`ConfirmationDecision::Reject`];
    /// a read failure is also reported on `errors`.
    ///
    /// # Errors
    ///
    /// Returns an error only if writing to `output` or `errors` fails.
    pub fn prompt_for_decision_with_io<L: LineSource + ?Sized, W: Write, E: Write>(
        &self,
        command: &str,
        input: &mut L,
        output: &mut W,
        errors: &mut E,
    ) -> Result<ConfirmationDecision> {
        self.display_suggestion_with_io(command, output)?;

        let decision = match input.read_line("IA> Run it? [s/N/x (always)]: ", output) {
            Ok(None) => ConfirmationDecision::Reject,
            Ok(Some(line)) => ConfirmationDecision::from_reply(&line),
            Err(e) => {
                warn!("Failed to read confirmation: {:#}", e);
                writeln!(errors, "Error reading confirmation: {:#}", e)?;
                ConfirmationDecision::Reject
            }
        };

        info!("User decision for '{}': {:?}", command, decision);
        Ok(decision)
    }

    fn display_suggestion_with_io<W: Write>(&self, command: &str, output: &mut W) -> Result<()> {
        writeln!(output, "---")?;
        writeln!(output, "IA> Suggested command:")?;
        writeln!(output)?;
        writeln!(output, "{}", command)?;
        writeln!(output)?;
        writeln!(output, "---")?;
        Ok(())
    }

    /// Announces the command that is about to run.
    pub fn show_running_with_io<W: Write>(
        &self,
        command: &str,
        decision: ConfirmationDecision,
        output: &mut W,
    ) -> Result<()> {
        if decision == ConfirmationDecision::AcceptAlways {
            writeln!(output, "IA> Running and switching to auto mode...")?;
        } else {
            writeln!(output, "IA> Running...")?;
        }
        writeln!(output)?;
        writeln!(output, "running:")?;
        writeln!(output, "{}", command)?;
        writeln!(output)?;
        output.flush()?;
        Ok(())
    }

    pub fn show_cancelled_with_io<W: Write>(&self, output: &mut W) -> Result<()> {
        writeln!(output, "IA> Cancelled.")?;
        writeln!(output)?;
        Ok(())
    }

    pub fn show_auto_enabled_with_io<W: Write>(&self, output: &mut W) -> Result<()> {
        writeln!(
            output,
            "IA> Auto-execute mode enabled. Type '//ask' to turn it off."
        )?;
        writeln!(output)?;
        Ok(())
    }
}
