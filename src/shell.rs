//! The interactive read-eval loop.
//!
//! [`Shell`] owns the [`Session`] and wires the router, the model gateway,
//! the confirmation UI and the executor together. Every step reads from and
//! writes to injected streams so whole sessions can be scripted in tests.

use crate::command_router::{classify_input, DirectoryTarget, InputAction, TRANSLATE_PREFIX};
use crate::confirmation_ui::{ConfirmationDecision, ConfirmationUI};
use crate::executor::{Executor, NonZeroExit};
use crate::line_source::LineSource;
use crate::logo::Presenter;
use crate::model_gateway::ModelGateway;
use crate::model_selection::choose_model_with_io;
use crate::session::{ExecutionMode, Session};
use anyhow::{Context, Result};
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info, warn};

const SEPARATOR_WIDTH: usize = 50;

pub struct Shell {
    gateway: ModelGateway,
    executor: Executor,
    confirmation: ConfirmationUI,
    presenter: Box<dyn Presenter>,
    session: Session,
    home: Option<PathBuf>,
}

impl Shell {
    /// Runs model selection and warm-up, then returns a shell ready to loop.
    ///
    /// # Errors
    ///
    /// Fails when no model can be selected (backend down, no models, input
    /// exhausted) or the working directory is unavailable.
    pub async fn start_with_io<L: LineSource + ?Sized, W: Write, E: Write>(
        gateway: ModelGateway,
        executor: Executor,
        presenter: Box<dyn Presenter>,
        input: &mut L,
        output: &mut W,
        errors: &mut E,
    ) -> Result<Self> {
        let model = choose_model_with_io(&gateway, input, output).await?;
        let working_dir = env::current_dir().context("Could not determine the working directory")?;

        let mut shell = Self::with_session(gateway, executor, presenter, Session::new(model, working_dir));
        shell.load_model(output, errors).await?;
        Ok(shell)
    }

    /// Builds a shell around an existing session, skipping model selection.
    pub fn with_session(
        gateway: ModelGateway,
        executor: Executor,
        presenter: Box<dyn Presenter>,
        session: Session,
    ) -> Self {
        Self {
            gateway,
            executor,
            confirmation: ConfirmationUI::new(),
            presenter,
            session,
            home: dirs::home_dir(),
        }
    }

    /// Overrides the home directory used for `cd` and prompt abbreviation.
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Reads and handles lines until `input` is exhausted or interrupted.
    ///
    /// A read failure is reported on `errors` and then ends the loop like end
    /// of input does. Only a failed `//model` reselection or a broken output
    /// stream returns an error.
    pub async fn run_with_io<L: LineSource + ?Sized, W: Write, E: Write>(
        &mut self,
        input: &mut L,
        output: &mut W,
        errors: &mut E,
    ) -> Result<()> {
        loop {
            self.show_separator(output)?;

            let prompt = self.session.prompt(self.home.as_deref());
            let line = match input.read_line(&prompt, output) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    writeln!(errors, "Error reading input: {:#}", e)?;
                    break;
                }
            };

            let action = classify_input(&line);
            debug!("Input classified as {:?}", action);
            if action != InputAction::Ignore {
                input.remember(line.trim());
            }
            self.dispatch(action, input, output, errors).await?;
        }

        writeln!(output)?;
        writeln!(output, "Goodbye!")?;
        output.flush()?;
        Ok(())
    }

    /// Performs one classified action against the session.
    pub async fn dispatch<L: LineSource + ?Sized, W: Write, E: Write>(
        &mut self,
        action: InputAction,
        input: &mut L,
        output: &mut W,
        errors: &mut E,
    ) -> Result<()> {
        match action {
            InputAction::Ignore => {}
            InputAction::ChangeDirectory(target) => self.change_directory(&target, errors)?,
            InputAction::ReselectModel => self.reselect_model(input, output, errors).await?,
            InputAction::DisableAutoExecute => {
                self.session.disable_auto_execute();
                writeln!(
                    output,
                    "IA> Auto-execute mode off. Suggested commands will ask for confirmation."
                )?;
                writeln!(output)?;
            }
            InputAction::EmptyTranslation => {
                writeln!(
                    output,
                    "IA> Empty request. Type {} followed by what you want to do.",
                    TRANSLATE_PREFIX
                )?;
                writeln!(output)?;
            }
            InputAction::Translate(request) => match self.session.mode() {
                ExecutionMode::Auto => self.translate_auto(&request, output, errors).await?,
                ExecutionMode::Ask => {
                    self.translate_confirm(&request, input, output, errors)
                        .await?
                }
            },
            InputAction::Execute(command_line) => {
                writeln!(output)?;
                output.flush()?;
                if let Err(e) = self.executor.execute(&command_line) {
                    if e.downcast_ref::<NonZeroExit>().is_some() {
                        debug!("'{}' failed: {}", command_line, e);
                    } else {
                        writeln!(errors, "IA> Could not run the command: {:#}", e)?;
                    }
                }
                writeln!(output)?;
            }
        }
        Ok(())
    }

    fn show_separator<W: Write>(&mut self, output: &mut W) -> Result<()> {
        if self.session.take_first_prompt() {
            writeln!(output)?;
        } else {
            writeln!(output, "{}", "─".repeat(SEPARATOR_WIDTH))?;
        }
        Ok(())
    }

    fn change_directory<E: Write>(&mut self, target: &DirectoryTarget, errors: &mut E) -> Result<()> {
        let path = match target.resolve(self.home.as_deref()) {
            Ok(path) => path,
            Err(e) => {
                writeln!(errors, "cd: {}", e)?;
                return Ok(());
            }
        };

        if let Err(e) = env::set_current_dir(&path) {
            writeln!(errors, "cd: {}: {}", path.display(), e)?;
            return Ok(());
        }

        let cwd = env::current_dir().unwrap_or(path);
        info!("Working directory is now {}", cwd.display());
        self.session.set_working_dir(cwd);
        Ok(())
    }

    async fn reselect_model<L: LineSource + ?Sized, W: Write, E: Write>(
        &mut self,
        input: &mut L,
        output: &mut W,
        errors: &mut E,
    ) -> Result<()> {
        let model = choose_model_with_io(&self.gateway, input, output).await?;
        self.session.set_model(model);
        self.load_model(output, errors).await
    }

    /// Shows loading feedback, warms the model up, then draws its logo.
    async fn load_model<W: Write, E: Write>(&mut self, output: &mut W, errors: &mut E) -> Result<()> {
        let model = self.session.model().to_string();

        self.presenter.clear_screen(output)?;
        writeln!(output, "Loading model \"{}\" into memory...", model)?;
        writeln!(output, "(This can take a few seconds)")?;
        output.flush()?;

        if let Err(e) = self.gateway.warm_up(&model).await {
            warn!("Warm-up of '{}' failed: {:#}", model, e);
            writeln!(errors, "Warning: failed to warm up the model: {:#}", e)?;
        }

        self.presenter.clear_screen(output)?;
        self.presenter.render(&model, output)?;
        Ok(())
    }

    async fn translate_auto<W: Write, E: Write>(
        &mut self,
        request: &str,
        output: &mut W,
        errors: &mut E,
    ) -> Result<()> {
        writeln!(output, "IA> Processing (auto)...")?;
        output.flush()?;

        let suggestion = match self.gateway.suggest_command(self.session.model(), request).await {
            Ok(suggestion) => suggestion,
            Err(e) => return Self::report_backend_error(&e, errors),
        };

        writeln!(output)?;
        writeln!(output, "running (auto):")?;
        writeln!(output, "{}", suggestion.sanitized_text)?;
        writeln!(output)?;
        output.flush()?;

        self.run_suggested(&suggestion.sanitized_text, errors)?;
        writeln!(output)?;
        Ok(())
    }

    async fn translate_confirm<L: LineSource + ?Sized, W: Write, E: Write>(
        &mut self,
        request: &str,
        input: &mut L,
        output: &mut W,
        errors: &mut E,
    ) -> Result<()> {
        writeln!(output, "IA> Processing... (contacting Ollama)")?;
        output.flush()?;

        let suggestion = match self.gateway.suggest_command(self.session.model(), request).await {
            Ok(suggestion) => suggestion,
            Err(e) => return Self::report_backend_error(&e, errors),
        };
        let command = suggestion.sanitized_text;

        let decision = self
            .confirmation
            .prompt_for_decision_with_io(&command, input, output, errors)?;
        if !decision.runs_command() {
            return self.confirmation.show_cancelled_with_io(output);
        }

        self.confirmation.show_running_with_io(&command, decision, output)?;
        self.run_suggested(&command, errors)?;
        writeln!(output)?;

        self.session.apply_decision(decision);
        if decision == ConfirmationDecision::AcceptAlways {
            self.confirmation.show_auto_enabled_with_io(output)?;
        }
        Ok(())
    }

    fn run_suggested<E: Write>(&self, command: &str, errors: &mut E) -> Result<()> {
        if let Err(e) = self.executor.execute(command) {
            writeln!(errors, "IA> The command failed: {:#}", e)?;
        }
        Ok(())
    }

    fn report_backend_error<E: Write>(error: &anyhow::Error, errors: &mut E) -> Result<()> {
        warn!("Translation failed: {:#}", error);
        writeln!(errors, "Error contacting Ollama: {:#}", error)?;
        Ok(())
    }
}
