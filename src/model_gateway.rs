//! Access to the generative-model backend.
//!
//! [`ModelBackend`] is the raw request/response capability (list models,
//! generate a completion). [`OllamaBackend`] implements it over the Ollama
//! HTTP API. [`ModelGateway`] layers the shell's use cases on top: turning a
//! natural-language request into a sanitized [`SuggestedCommand`] and
//! warming a model up.

use crate::config::Config;
use crate::http_client::{HttpClient, HttpResponse, ReqwestHttpClient};
use crate::sanitizer::sanitize_command;
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Instruction sent ahead of every natural-language request.
pub const TRANSLATION_PREAMBLE: &str = "You are an expert in the Linux terminal and shell.
Translate the following natural-language request into a SINGLE shell command.
Reply ONLY with the command and nothing else. Do not use markdown or explanations.
Request: ";

/// Prompt used to get a model loaded into memory.
pub const WARM_UP_PROMPT: &str = "hello";

#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Names of the models available locally.
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Full (non-streamed) completion of `prompt` by `model`.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// [`ModelBackend`] speaking the Ollama REST API.
pub struct OllamaBackend<H: HttpClient = ReqwestHttpClient> {
    base_url: String,
    http: H,
}

impl OllamaBackend<ReqwestHttpClient> {
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = ReqwestHttpClient::new(Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self::with_client(&config.ollama_host, http))
    }
}

impl<H: HttpClient> OllamaBackend<H> {
    pub fn with_client(base_url: &str, http: H) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn check_status(response: &HttpResponse) -> Result<()> {
        if response.is_success() {
            return Ok(());
        }
        let detail = serde_json::from_str::<ErrorResponse>(&response.body)
            .map(|e| e.error)
            .unwrap_or_else(|_| response.body.trim().to_string());
        Err(anyhow!("Ollama returned HTTP {}: {}", response.status, detail))
    }
}

#[async_trait]
impl<H: HttpClient> ModelBackend for OllamaBackend<H> {
    async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .http
            .get(&url)
            .await
            .with_context(|| format!("Failed to connect to Ollama at {}", self.base_url))?;
        Self::check_status(&response)?;

        let tags: TagsResponse =
            serde_json::from_str(&response.body).context("Failed to parse Ollama model list")?;
        debug!("Ollama reported {} models", tags.models.len());
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let body = serde_json::to_value(GenerateRequest {
            model,
            prompt,
            stream: false,
        })?;

        let response = self
            .http
            .post_json(&url, &body)
            .await
            .with_context(|| format!("Failed to contact Ollama at {}", self.base_url))?;
        Self::check_status(&response)?;

        let generated: GenerateResponse =
            serde_json::from_str(&response.body).context("Failed to parse Ollama response")?;
        Ok(generated.response)
    }
}

/// A backend answer to a natural-language request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedCommand {
    /// Verbatim model output.
    pub raw_text: String,
    /// `raw_text` with code decoration removed; this is what gets executed.
    pub sanitized_text: String,
}

impl SuggestedCommand {
    pub fn from_raw(raw_text: String) -> Self {
        let sanitized_text = sanitize_command(&raw_text);
        Self {
            raw_text,
            sanitized_text,
        }
    }
}

pub fn build_translation_prompt(user_prompt: &str) -> String {
    format!("{}{}", TRANSLATION_PREAMBLE, user_prompt)
}

/// Shell-facing operations over a [`ModelBackend`].
pub struct ModelGateway {
    backend: Box<dyn ModelBackend>,
}

impl ModelGateway {
    pub fn new(backend: Box<dyn ModelBackend>) -> Self {
        Self { backend }
    }

    pub async fn list_models(&self) -> Result<Vec<String>> {
        self.backend.list_models().await
    }

    /// Asks `model` to translate `user_prompt` into one shell command.
    ///
    /// # Errors
    ///
    /// Fails when the backend call fails or the answer is empty once
    /// sanitized.
    pub async fn suggest_command(&self, model: &str, user_prompt: &str) -> Result<SuggestedCommand> {
        info!("Translating request with model '{}': {}", model, user_prompt);
        let prompt = build_translation_prompt(user_prompt);
        let raw = self.backend.generate(model, &prompt).await?;
        debug!("Raw model output: {:?}", raw);

        let suggestion = SuggestedCommand::from_raw(raw);
        if suggestion.sanitized_text.is_empty() {
            bail!("The model returned an empty command");
        }
        Ok(suggestion)
    }

    /// Sends a throwaway prompt so the model is resident before real use.
    pub async fn warm_up(&self, model: &str) -> Result<()> {
        info!("Warming up model '{}'", model);
        self.backend.generate(model, WARM_UP_PROMPT).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::tests::MockHttpClient;
    use std::sync::{Arc, Mutex};

    struct ScriptedBackend {
        reply: Result<String, String>,
        prompts: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl ScriptedBackend {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                prompts: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl ModelBackend for ScriptedBackend {
        async fn list_models(&self) -> Result<Vec<String>> {
            Ok(vec!["llama3:latest".to_string()])
        }

        async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
            self.prompts
                .lock()
                .unwrap()
                .push((model.to_string(), prompt.to_string()));
            self.reply.clone().map_err(|e| anyhow!(e))
        }
    }

    // =========================================================================
    // OllamaBackend
    // =========================================================================

    #[tokio::test]
    async fn test_list_models_parses_tags() {
        let http = MockHttpClient::new(
            200,
            r#"{"models":[{"name":"llama3:latest","size":1},{"name":"qwen2:7b"}]}"#,
        );
        let backend = OllamaBackend::with_client("http://127.0.0.1:11434/", http);

        let models = backend.list_models().await.unwrap();

        assert_eq!(models, vec!["llama3:latest", "qwen2:7b"]);
        let requests = backend.http.requests.lock().unwrap();
        assert_eq!(requests[0].0, "http://127.0.0.1:11434/api/tags");
    }

    #[tokio::test]
    async fn test_list_models_with_no_models_is_empty() {
        let backend = OllamaBackend::with_client("http://h:1", MockHttpClient::new(200, "{}"));
        assert!(backend.list_models().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_models_unreachable_mentions_host() {
        let backend = OllamaBackend::with_client("http://h:1", MockHttpClient::unreachable());
        let err = backend.list_models().await.unwrap_err();
        assert!(err.to_string().contains("http://h:1"));
    }

    #[tokio::test]
    async fn test_generate_sends_non_streaming_request() {
        let http = MockHttpClient::new(200, r#"{"model":"m","response":"ls -la","done":true}"#);
        let backend = OllamaBackend::with_client("http://h:1", http);

        let text = backend.generate("m", "list files").await.unwrap();

        assert_eq!(text, "ls -la");
        let requests = backend.http.requests.lock().unwrap();
        assert_eq!(requests[0].0, "http://h:1/api/generate");
        let body = requests[0].1.as_ref().unwrap();
        assert_eq!(body["model"], "m");
        assert_eq!(body["prompt"], "list files");
        assert_eq!(body["stream"], false);
    }

    #[tokio::test]
    async fn test_generate_surfaces_backend_error_message() {
        let http = MockHttpClient::new(404, r#"{"error":"model 'nope' not found"}"#);
        let backend = OllamaBackend::with_client("http://h:1", http);

        let err = backend.generate("nope", "hi").await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("404"));
        assert!(message.contains("model 'nope' not found"));
    }

    #[tokio::test]
    async fn test_generate_with_plain_error_body() {
        let http = MockHttpClient::new(500, "internal failure\n");
        let backend = OllamaBackend::with_client("http://h:1", http);

        let err = backend.generate("m", "hi").await.unwrap_err();
        assert!(err.to_string().ends_with("internal failure"));
    }

    #[tokio::test]
    async fn test_generate_rejects_malformed_body() {
        let backend = OllamaBackend::with_client("http://h:1", MockHttpClient::new(200, "not json"));
        assert!(backend.generate("m", "hi").await.is_err());
    }

    // =========================================================================
    // ModelGateway
    // =========================================================================

    #[test]
    fn test_translation_prompt_appends_request_to_preamble() {
        let prompt = build_translation_prompt("show disk usage");
        assert!(prompt.starts_with(TRANSLATION_PREAMBLE));
        assert!(prompt.ends_with("Request: show disk usage"));
    }

    #[tokio::test]
    async fn test_suggest_command_sanitizes_reply() {
        let gateway = ModelGateway::new(Box::new(ScriptedBackend::replying("`ls -la`")));

        let suggestion = gateway.suggest_command("llama3", "list files").await.unwrap();

        assert_eq!(suggestion.raw_text, "`ls -la`");
        assert_eq!(suggestion.sanitized_text, "ls -la");
    }

    #[tokio::test]
    async fn test_suggest_command_sends_preamble_and_model() {
        let backend = ScriptedBackend::replying("date");
        let prompts = Arc::clone(&backend.prompts);
        let gateway = ModelGateway::new(Box::new(backend));

        gateway.suggest_command("qwen2", "show date").await.unwrap();

        let prompts = prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].0, "qwen2");
        assert_eq!(prompts[0].1, build_translation_prompt("show date"));
    }

    #[tokio::test]
    async fn test_suggest_command_rejects_empty_reply() {
        let gateway = ModelGateway::new(Box::new(ScriptedBackend::replying("```bash\n```")));
        let err = gateway.suggest_command("m", "nothing").await.unwrap_err();
        assert!(err.to_string().contains("empty command"));
    }

    #[tokio::test]
    async fn test_suggest_command_propagates_backend_failure() {
        let gateway = ModelGateway::new(Box::new(ScriptedBackend::failing("connection refused")));
        let err = gateway.suggest_command("m", "list files").await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_warm_up_ignores_reply_content() {
        let gateway = ModelGateway::new(Box::new(ScriptedBackend::replying("Hi there!")));
        assert!(gateway.warm_up("m").await.is_ok());
    }

    #[tokio::test]
    async fn test_warm_up_reports_failure() {
        let gateway = ModelGateway::new(Box::new(ScriptedBackend::failing("timeout")));
        assert!(gateway.warm_up("m").await.is_err());
    }
}
