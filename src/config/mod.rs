//! Configuration: `mentora.toml` plus environment overrides.
//!
//! Secrets (vendor API keys) are never written back to disk; they are read
//! from the config file if present but environment variables win.

use crate::error::{ConfigError, Result};
use anyhow::Context;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path to the loaded config file - computed, not serialized
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub speech: SpeechConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,
}

// ── LLM provider selection ───────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider id: "openrouter" or "gemini"
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model identifier in the provider's namespace
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// API key for the selected provider; env vars override
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub gemini_api_key: Option<String>,
}

fn default_provider() -> String {
    "openrouter".into()
}

fn default_model() -> String {
    "meta-llama/llama-3.3-70b-instruct".into()
}

fn default_temperature() -> f64 {
    0.7
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            api_key: None,
            gemini_api_key: None,
        }
    }
}

// ── Speech (STT / TTS) ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Deepgram transcription model
    #[serde(default = "default_stt_model")]
    pub stt_model: String,
    /// Fallback TTS voice when a persona has none configured
    #[serde(default = "default_tts_voice")]
    pub tts_voice: String,
    /// Deepgram API key; `DEEPGRAM_API_KEY` env var overrides
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_stt_model() -> String {
    "nova-2".into()
}

fn default_tts_voice() -> String {
    "aura-2-celeste-es".into()
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            stt_model: default_stt_model(),
            tts_voice: default_tts_voice(),
            api_key: None,
        }
    }
}

// ── Session store bounds ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Turns retained per session; oldest dropped first (default: 40)
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
    /// Idle seconds before a session expires (default: 1800)
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Background sweep interval in seconds (default: 300)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Live session cap; least-recently-active evicted past it (default: 4096)
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_max_turns() -> usize {
    40
}

fn default_ttl_secs() -> u64 {
    1800
}

/// One year of idle time. Anything above this is a typo, and huge values
/// would overflow the signed duration math in the store.
const MAX_TTL_SECS: u64 = 60 * 60 * 24 * 365;

fn default_sweep_interval_secs() -> u64 {
    300
}

fn default_max_sessions() -> usize {
    4096
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            ttl_secs: default_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            max_sessions: default_max_sessions(),
        }
    }
}

// ── Gateway ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway port (default: 8080)
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Gateway host (default: 0.0.0.0 — the SPA is served elsewhere)
    #[serde(default = "default_gateway_host")]
    pub host: String,
    /// Max request body in bytes; sized for browser audio uploads (default: 8 MiB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Per-request timeout in seconds (default: 60 — covers slow completions)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_gateway_port() -> u16 {
    8080
}

fn default_gateway_host() -> String {
    "0.0.0.0".into()
}

fn default_max_body_bytes() -> usize {
    8 * 1024 * 1024
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            host: default_gateway_host(),
            max_body_bytes: default_max_body_bytes(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl Config {
    /// Load configuration.
    ///
    /// Resolution order: explicit `--config` path, `./mentora.toml`,
    /// `~/.config/mentora/config.toml`, built-in defaults. Environment
    /// overrides are applied after the file, and the result is validated.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match Self::resolve_path(explicit_path) {
            Some(path) => {
                let contents = fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                let mut config: Config = toml::from_str(&contents)
                    .with_context(|| format!("failed to parse config file {}", path.display()))?;
                config.config_path = Some(path);
                config
            }
            None => {
                if explicit_path.is_some() {
                    return Err(ConfigError::Load(
                        "config file not found at the path given with --config".into(),
                    )
                    .into());
                }
                Self::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn resolve_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit_path {
            return path.exists().then(|| path.to_path_buf());
        }

        let local = PathBuf::from("mentora.toml");
        if local.exists() {
            return Some(local);
        }

        let home_config = UserDirs::new()
            .map(|dirs| dirs.home_dir().join(".config").join("mentora").join("config.toml"))?;
        home_config.exists().then_some(home_config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("OPENROUTER_API_KEY")
            && !key.is_empty()
        {
            self.llm.api_key = Some(key);
        }

        if let Ok(key) = std::env::var("GEMINI_API_KEY")
            && !key.is_empty()
        {
            self.llm.gemini_api_key = Some(key);
        }

        if let Ok(key) = std::env::var("DEEPGRAM_API_KEY")
            && !key.is_empty()
        {
            self.speech.api_key = Some(key);
        }

        if let Ok(provider) = std::env::var("MENTORA_PROVIDER")
            && !provider.is_empty()
        {
            self.llm.provider = provider;
        }

        if let Ok(model) = std::env::var("MENTORA_MODEL")
            && !model.is_empty()
        {
            self.llm.model = model;
        }

        if let Ok(port_str) = std::env::var("MENTORA_PORT").or_else(|_| std::env::var("PORT"))
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }

        if let Ok(host) = std::env::var("MENTORA_HOST")
            && !host.is_empty()
        {
            self.gateway.host = host;
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Validation(format!(
                "llm.temperature must be within 0.0..=2.0 (got {})",
                self.llm.temperature
            )));
        }
        if self.session.max_turns == 0 {
            return Err(ConfigError::Validation(
                "session.max_turns must be at least 1".into(),
            ));
        }
        if self.session.max_sessions == 0 {
            return Err(ConfigError::Validation(
                "session.max_sessions must be at least 1".into(),
            ));
        }
        if !(1..=MAX_TTL_SECS).contains(&self.session.ttl_secs) {
            return Err(ConfigError::Validation(format!(
                "session.ttl_secs must be between 1 and {MAX_TTL_SECS}"
            )));
        }
        if self.gateway.max_body_bytes < 1024 {
            return Err(ConfigError::Validation(
                "gateway.max_body_bytes is too small to carry a request".into(),
            ));
        }
        Ok(())
    }

    /// API key for the configured LLM provider, if any.
    pub fn llm_api_key(&self) -> Option<&str> {
        match self.llm.provider.as_str() {
            "gemini" => self.llm.gemini_api_key.as_deref(),
            _ => self.llm.api_key.as_deref(),
        }
    }
}
