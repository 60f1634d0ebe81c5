//! Where typed lines come from.
//!
//! The terminal uses [`EditorLineSource`] (line editing and history through
//! rustyline). Anything else, scripted sessions included, can wrap a
//! `BufRead` in [`ReaderLineSource`].

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use std::io::{BufRead, Write};
use tracing::debug;

/// A source of prompted input lines.
pub trait LineSource {
    /// Shows `prompt` and reads one line without its line terminator.
    ///
    /// Returns `Ok(None)` when the user is done: end of input, or an
    /// interrupt at the prompt.
    ///
    /// # Errors
    ///
    /// Any other failure to read.
    fn read_line(&mut self, prompt: &str, output: &mut dyn Write) -> Result<Option<String>>;

    /// Records a line in the history, for sources that keep one.
    fn remember(&mut self, _line: &str) {}
}

/// Interactive line editor on the controlling terminal.
pub struct EditorLineSource {
    editor: DefaultEditor,
}

impl EditorLineSource {
    pub fn new() -> Result<Self> {
        let config = Config::builder().history_ignore_space(true).build();
        let editor = DefaultEditor::with_config(config).context("Failed to initialize line editor")?;
        Ok(Self { editor })
    }
}

impl LineSource for EditorLineSource {
    fn read_line(&mut self, prompt: &str, output: &mut dyn Write) -> Result<Option<String>> {
        // The editor draws the prompt itself; anything pending must land first.
        output.flush()?;
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(None),
            Err(e) => Err(e).context("Failed to read line"),
        }
    }

    fn remember(&mut self, line: &str) {
        if let Err(e) = self.editor.add_history_entry(line) {
            debug!("Could not add history entry: {}", e);
        }
    }
}

/// Line source over any buffered reader; the prompt goes to `output`.
pub struct ReaderLineSource<R> {
    reader: R,
}

impl<R: BufRead> ReaderLineSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderLineSource<R> {
    fn read_line(&mut self, prompt: &str, output: &mut dyn Write) -> Result<Option<String>> {
        write!(output, "{}", prompt)?;
        output.flush()?;

        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .context("Failed to read line")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }
}
