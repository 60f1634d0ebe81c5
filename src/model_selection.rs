//! Interactive choice of the model used for translations.

use crate::line_source::LineSource;
use crate::model_gateway::ModelGateway;
use anyhow::{bail, Context, Result};
use std::io::Write;
use tracing::info;

/// Lists the backend's models on `output` and reads a 1-based choice from
/// `input`, re-prompting until it is valid.
///
/// # Errors
///
/// All failures here are fatal to the session:
/// - The backend cannot be reached
/// - The backend has no models
/// - Input ends or fails before a valid choice is made
pub async fn choose_model_with_io<L: LineSource + ?Sized, W: Write>(
    gateway: &ModelGateway,
    input: &mut L,
    output: &mut W,
) -> Result<String> {
    writeln!(output, "Querying available Ollama models...")?;
    let models = gateway
        .list_models()
        .await
        .context("Could not list Ollama models. Is Ollama running?")?;

    if models.is_empty() {
        bail!("No Ollama models are installed (use 'ollama pull <model>')");
    }

    writeln!(output, "--- Choose an AI model ---")?;
    for (i, model) in models.iter().enumerate() {
        writeln!(output, "{}: {}", i + 1, model)?;
    }
    writeln!(output, "------------------------------")?;

    loop {
        let Some(line) = input
            .read_line("Enter the model number: ", output)
            .context("Failed to read model selection")?
        else {
            bail!("No model selected: input ended");
        };

        match parse_selection(&line, models.len()) {
            Some(index) => {
                info!("Selected model '{}'", models[index]);
                return Ok(models[index].clone());
            }
            None => writeln!(output, "Invalid selection. Enter a number from the list.")?,
        }
    }
}

/// Converts a 1-based reply into an index below `count`.
pub fn parse_selection(reply: &str, count: usize) -> Option<usize> {
    match reply.trim().parse::<usize>() {
        Ok(choice) if (1..=count).contains(&choice) => Some(choice - 1),
        _ => None,
    }
}
