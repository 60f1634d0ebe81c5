use clap::Command;
use ia_shell::config::Config;
use ia_shell::executor::Executor;
use ia_shell::line_source::EditorLineSource;
use ia_shell::logo::LogoBook;
use ia_shell::model_gateway::{ModelGateway, OllamaBackend};
use ia_shell::shell::Shell;
use std::io;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    Command::new("ia")
        .about("Interactive shell that turns //requests into commands via Ollama")
        .long_about(
            "ia runs ordinary command lines through your shell. Lines starting with // are \
             sent to a local Ollama model, and the suggested command is shown for confirmation \
             (s = run once, x = run and stop asking, anything else = cancel). \
             Use //model to switch models and //ask to turn auto-execute off.",
        )
        .version(env!("CARGO_PKG_VERSION"))
        .get_matches();

    let config = Config::load()?;
    info!("Using Ollama at {}", config.ollama_host);

    let (logos, warning) = LogoBook::load_or_empty(&config.logos_path());
    if let Some(warning) = warning {
        eprintln!("{}", warning);
    }

    let gateway = ModelGateway::new(Box::new(OllamaBackend::from_config(&config)?));
    let executor = Executor::new(Executor::detect_shell(config.shell.as_deref()));
    info!("Commands run through {}", executor.shell());

    let mut input = EditorLineSource::new()?;
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();

    let mut shell = Shell::start_with_io(
        gateway,
        executor,
        Box::new(logos),
        &mut input,
        &mut stdout,
        &mut stderr,
    )
    .await?;
    shell.run_with_io(&mut input, &mut stdout, &mut stderr).await
}
