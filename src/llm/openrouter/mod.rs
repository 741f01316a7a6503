use super::openai::{
    compat as openai_compat,
    types::{ChatRequest, ChatResponse},
};
use crate::llm::{
    http_client::build_vendor_client,
    traits::Provider,
    types::ChatTurn,
};
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;

#[derive(Debug)]
pub struct OpenRouterProvider {
    /// Pre-computed `"Bearer <key>"` header value (avoids `format!` per request).
    cached_auth_header: Option<String>,
    base_url: String,
    client: Client,
}

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const OPENROUTER_MISSING_API_KEY_MESSAGE: &str =
    "OpenRouter API key not set. Set OPENROUTER_API_KEY or [llm] api_key in mentora.toml.";
const OPENROUTER_EXTRA_HEADERS: [(&str, &str); 2] = [
    ("HTTP-Referer", "https://mentora.app"),
    ("X-Title", "Mentora"),
];

impl OpenRouterProvider {
    pub fn new(api_key: Option<&str>) -> Self {
        Self::with_base_url(api_key, OPENROUTER_BASE_URL)
    }

    /// Point the provider at a non-default endpoint (mock servers in tests).
    pub fn with_base_url(api_key: Option<&str>, base_url: &str) -> Self {
        Self {
            cached_auth_header: api_key.map(|k| format!("Bearer {k}")),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_vendor_client(),
        }
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn call_api(&self, request: &ChatRequest) -> anyhow::Result<ChatResponse> {
        openai_compat::send_chat_completions(
            &self.client,
            self.cached_auth_header.as_ref(),
            request,
            openai_compat::ChatCompletionsEndpoint {
                provider_name: "OpenRouter",
                url: &self.chat_completions_url(),
                missing_api_key_message: OPENROUTER_MISSING_API_KEY_MESSAGE,
                extra_headers: &OPENROUTER_EXTRA_HEADERS,
            },
        )
        .await
    }
}

impl Provider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    fn warmup(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move {
            // Hit a lightweight endpoint to establish TLS + HTTP/2 connection pool.
            // This prevents the first real chat request from timing out on cold start.
            if let Some(auth_header) = self.cached_auth_header.as_ref() {
                self.client
                    .get(format!("{}/auth/key", self.base_url))
                    .header("Authorization", auth_header)
                    .send()
                    .await?
                    .error_for_status()?;
            }
            Ok(())
        })
    }

    fn chat_with_history<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        history: &'a [ChatTurn],
        model: &'a str,
        temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let request = openai_compat::build_request(system_prompt, history, model, temperature);
            let chat_response = self.call_api(&request).await?;
            openai_compat::extract_text(&chat_response, "OpenRouter")
        })
    }
}
