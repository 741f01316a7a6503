use super::gemini::GeminiProvider;
use super::openrouter::OpenRouterProvider;
use super::traits::Provider;
use crate::config::Config;
use crate::error::LlmError;
use std::sync::Arc;

/// Build the configured chat provider.
///
/// Keys come from the config after env overrides (`Config::llm_api_key`), so
/// `OPENROUTER_API_KEY` / `GEMINI_API_KEY` have already won over the file.
pub fn create_provider(config: &Config) -> Result<Arc<dyn Provider>, LlmError> {
    let api_key = config.llm_api_key();
    match config.llm.provider.as_str() {
        "openrouter" => Ok(Arc::new(OpenRouterProvider::new(api_key))),
        "gemini" | "google" => Ok(Arc::new(GeminiProvider::new(api_key))),
        other => Err(LlmError::UnknownProvider(other.to_string())),
    }
}
