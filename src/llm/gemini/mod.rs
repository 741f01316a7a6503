//! Google Gemini provider (`generateContent` REST API, direct API key).

use crate::error::LlmError;
use crate::llm::{
    http_client::build_vendor_client,
    scrub::sanitize_api_error,
    traits::Provider,
    types::{ChatTurn, TurnRole},
};
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;

mod types;
use types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const GEMINI_MAX_OUTPUT_TOKENS: u32 = 8192;

#[derive(Debug)]
pub struct GeminiProvider {
    api_key: Option<String>,
    base_url: String,
    client: Client,
}

impl GeminiProvider {
    pub fn new(api_key: Option<&str>) -> Self {
        Self::with_base_url(api_key, GEMINI_BASE_URL)
    }

    /// Point the provider at a non-default endpoint (mock servers in tests).
    pub fn with_base_url(api_key: Option<&str>, base_url: &str) -> Self {
        Self {
            api_key: api_key.map(String::from),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_vendor_client(),
        }
    }

    fn api_key(&self) -> anyhow::Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "Gemini API key not found. Set GEMINI_API_KEY or [llm] gemini_api_key in mentora.toml."
            )
        })
    }

    fn model_path(model: &str) -> String {
        if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        }
    }

    fn build_request(
        system_prompt: Option<&str>,
        history: &[ChatTurn],
        temperature: f64,
    ) -> GenerateContentRequest {
        let system_instruction = system_prompt.map(|sys| Content {
            role: None,
            parts: vec![Part {
                text: sys.to_string(),
            }],
        });

        let contents = history
            .iter()
            .map(|turn| Content {
                role: Some(
                    match turn.role {
                        TurnRole::User => "user",
                        TurnRole::Assistant => "model",
                    }
                    .to_string(),
                ),
                parts: vec![Part {
                    text: turn.content.clone(),
                }],
            })
            .collect();

        GenerateContentRequest {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens: GEMINI_MAX_OUTPUT_TOKENS,
            },
        }
    }

    async fn ensure_success_status(
        response: reqwest::Response,
    ) -> anyhow::Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(LlmError::Auth {
                provider: "Gemini".into(),
            }
            .into());
        }
        Err(LlmError::Request {
            provider: "Gemini".into(),
            message: format!("{status}: {}", sanitize_api_error(&error_text)),
        }
        .into())
    }

    fn extract_text(result: &GenerateContentResponse) -> anyhow::Result<String> {
        let text = result
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .map(|candidate| {
                let mut out = String::new();
                for part in &candidate.content.parts {
                    if let Some(t) = &part.text {
                        if !out.is_empty() {
                            out.push('\n');
                        }
                        out.push_str(t);
                    }
                }
                out
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(LlmError::EmptyCompletion {
                provider: "Gemini".into(),
            }
            .into());
        }

        Ok(text)
    }

    async fn call_api(
        &self,
        system_prompt: Option<&str>,
        history: &[ChatTurn],
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<String> {
        let api_key = self.api_key()?;
        let url = format!(
            "{}/v1beta/{}:generateContent?key={api_key}",
            self.base_url,
            Self::model_path(model)
        );
        let request = Self::build_request(system_prompt, history, temperature);

        let response = self.client.post(url).json(&request).send().await?;
        let response = Self::ensure_success_status(response).await?;
        let result: GenerateContentResponse = response.json().await?;
        Self::extract_text(&result)
    }
}

impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn chat_with_history<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        history: &'a [ChatTurn],
        model: &'a str,
        temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            self.call_api(system_prompt, history, model, temperature)
                .await
        })
    }
}
