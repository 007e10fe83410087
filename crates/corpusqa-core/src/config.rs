//! Configuration loading and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `CORPUSQA_*`
//! env vars into a typed [`Settings`] struct. Provides a helper to expand `~`
//! and `${VAR}` in user-supplied paths.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// All recognized options with their documented defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory scanned for source documents at startup.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Upper bound on chunk size in characters. Only the hard-split pieces of
    /// a single oversize sentence may reach it exactly.
    #[serde(default = "default_chunk_max_chars")]
    pub chunk_max_chars: usize,

    /// Characters of trailing context carried over into the next chunk.
    #[serde(default = "default_chunk_overlap_chars")]
    pub chunk_overlap_chars: usize,

    /// Number of chunk texts sent per remote embedding call.
    #[serde(default = "default_embed_batch_size")]
    pub embed_batch_size: usize,

    /// Number of chunks retrieved as grounding context per question.
    #[serde(default = "default_retrieval_k")]
    pub retrieval_k: usize,

    /// Per-request timeout for remote embedding and completion calls.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retry attempts for transient remote failures (on top of the first try).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// When set, sessions keep only the most recent N turns. Unset means
    /// history grows without bound.
    #[serde(default)]
    pub max_session_turns: Option<usize>,

    /// Remote embedding model name.
    #[serde(default = "default_embed_model")]
    pub embed_model: String,

    /// Remote completion model name.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Environment variable holding the API credential.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Listen address for the HTTP server.
    #[serde(default = "default_address")]
    pub address: String,
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_chunk_max_chars() -> usize {
    1200
}

fn default_chunk_overlap_chars() -> usize {
    200
}

fn default_embed_batch_size() -> usize {
    32
}

fn default_retrieval_k() -> usize {
    3
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_embed_model() -> String {
    "text-embedding-004".to_string()
}

fn default_chat_model() -> String {
    "gemini-flash-lite-latest".to_string()
}

fn default_api_key_env() -> String {
    "GOOGLE_API_KEY".to_string()
}

fn default_address() -> String {
    "0.0.0.0:8000".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            chunk_max_chars: default_chunk_max_chars(),
            chunk_overlap_chars: default_chunk_overlap_chars(),
            embed_batch_size: default_embed_batch_size(),
            retrieval_k: default_retrieval_k(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            max_session_turns: None,
            embed_model: default_embed_model(),
            chat_model: default_chat_model(),
            api_key_env: default_api_key_env(),
            address: default_address(),
        }
    }
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("CORPUSQA_"));

        let settings: Settings = figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.chunk_max_chars == 0 {
            anyhow::bail!("chunk_max_chars must be positive");
        }
        if self.chunk_overlap_chars >= self.chunk_max_chars {
            anyhow::bail!("chunk_overlap_chars must be smaller than chunk_max_chars");
        }
        if self.embed_batch_size == 0 || self.retrieval_k == 0 {
            anyhow::bail!("embed_batch_size and retrieval_k must be positive");
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
