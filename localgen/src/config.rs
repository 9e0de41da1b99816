//! Connection settings for the local server.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "gemma3:27b";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Which server flavor the endpoint speaks.
///
/// Only [`ProviderKind::Ollama`] has an implementation today; the others
/// are recognized in configuration and rejected when a call is made.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Ollama,
    Vllm,
    Custom,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::Vllm => "vllm",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for a [`LocalGenerator`](crate::LocalGenerator).
///
/// Immutable once the generator is constructed; build a new generator to
/// change them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Base URL of the server, e.g. `http://localhost:11434`.
    pub endpoint: String,
    /// Model identifier passed through to the server.
    pub model: String,
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,
    /// Per-call deadline in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> ProviderKind {
    ProviderKind::Ollama
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT, DEFAULT_MODEL)
    }
}

impl LocalConfig {
    /// Settings for an Ollama server at `endpoint` running `model`.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            provider: ProviderKind::Ollama,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Read settings from `LOCALGEN_ENDPOINT`, `LOCALGEN_MODEL` and
    /// `LOCALGEN_PROVIDER`, falling back to the defaults.
    pub fn from_env() -> Self {
        let endpoint =
            std::env::var("LOCALGEN_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let model = std::env::var("LOCALGEN_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let provider = std::env::var("LOCALGEN_PROVIDER")
            .map(|name| provider_from_name(&name))
            .unwrap_or(ProviderKind::Ollama);
        Self {
            endpoint,
            model,
            provider,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// The per-call deadline as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn provider_from_name(name: &str) -> ProviderKind {
    match name.to_ascii_lowercase().as_str() {
        "vllm" => ProviderKind::Vllm,
        "custom" => ProviderKind::Custom,
        _ => ProviderKind::Ollama,
    }
}
