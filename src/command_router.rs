//! Classifies each line the user types before anything is executed.
//!
//! [`classify_input`] is pure: it maps a line to an [`InputAction`] and the
//! controller then dispatches on the variant.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};

/// Re-runs model selection.
pub const MODEL_MARKER: &str = "//model";
/// Leaves auto-execute mode.
pub const ASK_MARKER: &str = "//ask";
/// Starts a natural-language request.
pub const TRANSLATE_PREFIX: &str = "//";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryTarget {
    Home,
    Path(String),
}

impl DirectoryTarget {
    /// Resolves the target against `home`; `~/x` expands to `home/x`.
    pub fn resolve(&self, home: Option<&Path>) -> Result<PathBuf> {
        let home_or_err = || home.map(Path::to_path_buf).ok_or_else(|| anyhow!("Could not find home directory"));
        match self {
            DirectoryTarget::Home => home_or_err(),
            DirectoryTarget::Path(path) => match path.strip_prefix("~/") {
                Some(rest) => Ok(home_or_err()?.join(rest)),
                None => Ok(PathBuf::from(path)),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Blank line.
    Ignore,
    ChangeDirectory(DirectoryTarget),
    ReselectModel,
    DisableAutoExecute,
    /// `//` with nothing after it.
    EmptyTranslation,
    Translate(String),
    /// Anything else, passed verbatim to the shell.
    Execute(String),
}

/// Maps one line of input to the action the shell should take.
///
/// Rules are checked in order: `cd`, `//model`, `//ask`, `//<request>`,
/// then plain execution.
pub fn classify_input(line: &str) -> InputAction {
    let input = line.trim();
    if input.is_empty() {
        return InputAction::Ignore;
    }

    if input == "cd" || input.starts_with("cd ") {
        let argument = input[2..].trim();
        let target = if argument.is_empty() || argument == "~" {
            DirectoryTarget::Home
        } else {
            DirectoryTarget::Path(argument.to_string())
        };
        return InputAction::ChangeDirectory(target);
    }

    if input == MODEL_MARKER {
        return InputAction::ReselectModel;
    }

    if input == ASK_MARKER {
        return InputAction::DisableAutoExecute;
    }

    if let Some(request) = input.strip_prefix(TRANSLATE_PREFIX) {
        let request = request.trim();
        if request.is_empty() {
            return InputAction::EmptyTranslation;
        }
        return InputAction::Translate(request.to_string());
    }

    InputAction::Execute(input.to_string())
}
