//! Per-run session state and the execution-mode state machine.

use crate::confirmation_ui::ConfirmationDecision;
use std::path::{Path, PathBuf};

/// Whether suggested commands need confirmation.
///
/// `Ask --AcceptAlways--> Auto`, `Auto --//ask--> Ask`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    #[default]
    Ask,
    Auto,
}

#[derive(Debug, Clone)]
pub struct Session {
    model: String,
    working_dir: PathBuf,
    mode: ExecutionMode,
    first_prompt: bool,
}

impl Session {
    pub fn new(model: impl Into<String>, working_dir: PathBuf) -> Self {
        Self {
            model: model.into(),
            working_dir,
            mode: ExecutionMode::Ask,
            first_prompt: true,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Switches model; the next prompt renders as a first prompt again.
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
        self.first_prompt = true;
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn set_working_dir(&mut self, dir: PathBuf) {
        self.working_dir = dir;
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn is_auto(&self) -> bool {
        self.mode == ExecutionMode::Auto
    }

    /// Applies a confirmation answer; only `AcceptAlways` changes the mode.
    pub fn apply_decision(&mut self, decision: ConfirmationDecision) {
        if decision == ConfirmationDecision::AcceptAlways {
            self.mode = ExecutionMode::Auto;
        }
    }

    pub fn disable_auto_execute(&mut self) {
        self.mode = ExecutionMode::Ask;
    }

    /// Returns true exactly once after creation or a model switch.
    pub fn take_first_prompt(&mut self) -> bool {
        std::mem::replace(&mut self.first_prompt, false)
    }

    pub fn prompt(&self, home: Option<&Path>) -> String {
        let label = match self.mode {
            ExecutionMode::Auto => "ia (auto)",
            ExecutionMode::Ask => "ia",
        };
        format!(
            "{} [{}]> {} >>> ",
            label,
            self.model,
            abbreviate_home(&self.working_dir, home)
        )
    }
}

/// Shows `path` with a leading home directory replaced by `~`.
pub fn abbreviate_home(path: &Path, home: Option<&Path>) -> String {
    if let Some(rest) = home.and_then(|h| path.strip_prefix(h).ok()) {
        if rest.as_os_str().is_empty() {
            return "~".to_string();
        }
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}
