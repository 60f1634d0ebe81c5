//! ia-shell - an interactive shell that turns plain-language requests into
//! shell commands using a local Ollama model.
//!
//! Lines typed at the prompt run through the host shell as usual. A line
//! starting with `//` is sent to the model instead, and the single command it
//! suggests is cleaned up and shown for confirmation:
//!
//! - `s` (or `y`) runs it once
//! - `x` runs it and switches the session to auto-execute
//! - anything else cancels
//!
//! `//ask` turns auto-execute back off and `//model` picks another model.
//!
//! # Architecture
//!
//! - [`shell`] - The read-eval loop and session controller
//! - [`session`] - Session state and the execution-mode state machine
//! - [`command_router`] - Classifies each input line
//! - [`model_gateway`] - Talks to the Ollama HTTP API
//! - [`model_selection`] - Interactive model choice
//! - [`line_source`] - Line editing and scripted input
//! - [`sanitizer`] - Strips markdown decoration from model replies
//! - [`confirmation_ui`] - Run / cancel / always prompt
//! - [`executor`] - Runs command lines through the host shell
//! - [`logo`] - Screen clearing and per-model logos
//! - [`config`] - Configuration file and environment overrides
//! - [`http_client`] - HTTP client abstraction
//!
//! # Example
//!
//! ```ignore
//! use ia_shell::{config::Config, executor::Executor, logo::PlainPresenter};
//! use ia_shell::line_source::EditorLineSource;
//! use ia_shell::model_gateway::{ModelGateway, OllamaBackend};
//! use ia_shell::shell::Shell;
//! use std::io;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let gateway = ModelGateway::new(Box::new(OllamaBackend::from_config(&config)?));
//!     let executor = Executor::new(Executor::detect_shell(None));
//!
//!     let mut input = EditorLineSource::new()?;
//!     let mut shell = Shell::start_with_io(
//!         gateway,
//!         executor,
//!         Box::new(PlainPresenter),
//!         &mut input,
//!         &mut io::stdout(),
//!         &mut io::stderr(),
//!     )
//!     .await?;
//!     shell.run_with_io(&mut input, &mut io::stdout(), &mut io::stderr()).await
//! }
//! ```

pub mod command_router;
pub mod config;
pub mod confirmation_ui;
pub mod executor;
pub mod http_client;
pub mod line_source;
pub mod logo;
pub mod model_gateway;
pub mod model_selection;
pub mod sanitizer;
pub mod session;
pub mod shell;
