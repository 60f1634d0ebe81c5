use anyhow::{anyhow, Context, Result};
use dirs::home_dir;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use url::Url;

pub const DEFAULT_OLLAMA_PORT: u16 = 11434;
pub const DEFAULT_OLLAMA_HOST: &str = "http://127.0.0.1:11434";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_LOGOS_FILE: &str = "logos.json";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_ollama_host")]
    pub ollama_host: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Interpreter used for `-c` execution; detected when unset.
    #[serde(default)]
    pub shell: Option<String>,
    #[serde(default)]
    pub logos_path: Option<PathBuf>,
}

fn default_ollama_host() -> String {
    DEFAULT_OLLAMA_HOST.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama_host: default_ollama_host(),
            request_timeout_secs: default_request_timeout_secs(),
            shell: None,
            logos_path: None,
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables, or use defaults
    pub fn load() -> Result<Self> {
        let mut config = Self::get_config_path()
            .and_then(|path| Self::load_from_file(&path))
            .unwrap_or_else(|e| {
                info!("No usable config file ({}), using defaults", e);
                Self::default()
            });

        // Environment variables override config file
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.ollama_host = normalize_host(&config.ollama_host)?;

        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow!("Config file not found"));
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        info!("Loaded config from: {}", path.display());
        Ok(config)
    }

    /// Applies `OLLAMA_HOST` and the `IA_SHELL_*` variables using `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("OLLAMA_HOST").filter(|h| !h.trim().is_empty()) {
            self.ollama_host = host;
        }

        if let Some(raw) = lookup("IA_SHELL_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.request_timeout_secs = secs,
                _ => warn!("Ignoring invalid IA_SHELL_TIMEOUT_SECS value: {}", raw),
            }
        }

        if let Some(shell) = lookup("IA_SHELL_SHELL").filter(|s| !s.trim().is_empty()) {
            self.shell = Some(shell);
        }

        if let Some(logos) = lookup("IA_SHELL_LOGOS").filter(|l| !l.trim().is_empty()) {
            self.logos_path = Some(PathBuf::from(logos));
        }
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("config.toml"))
    }

    pub fn get_config_dir() -> Result<PathBuf> {
        let home = home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(home.join(".ia-shell"))
    }

    pub fn logos_path(&self) -> PathBuf {
        self.logos_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOGOS_FILE))
    }
}

/// Turns an `OLLAMA_HOST`-style value into a base URL.
///
/// Accepts `host`, `host:port`, `:port` and full URLs. A missing scheme means
/// `http`. A plain `http` URL without a port gets 11434; `https` keeps its
/// default port.
pub fn normalize_host(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(anyhow!("Ollama host is empty"));
    }

    let with_scheme = if raw.starts_with(':') {
        format!("http://127.0.0.1{}", raw)
    } else if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };

    let mut url = Url::parse(&with_scheme)
        .with_context(|| format!("Invalid Ollama host: {}", raw))?;

    if url.port().is_none() && url.scheme() == "http" {
        url.set_port(Some(DEFAULT_OLLAMA_PORT))
            .map_err(|_| anyhow!("Invalid Ollama host: {}", raw))?;
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}
