//! Shared helpers for providers speaking the OpenAI chat-completions wire
//! format (currently OpenRouter; any compatible endpoint slots in the same
//! way).

use super::types::{ChatRequest, ChatResponse, Message};
use crate::error::LlmError;
use crate::llm::scrub::sanitize_api_error;
use crate::llm::types::{ChatTurn, TurnRole};
use anyhow::Context;
use reqwest::StatusCode;

pub(in crate::llm) fn build_request(
    system_prompt: Option<&str>,
    history: &[ChatTurn],
    model: &str,
    temperature: f64,
) -> ChatRequest {
    let capacity = history.len() + usize::from(system_prompt.is_some());
    let mut messages = Vec::with_capacity(capacity);

    if let Some(sys) = system_prompt {
        messages.push(Message {
            role: "system",
            content: sys.to_string(),
        });
    }

    for turn in history {
        messages.push(Message {
            role: match turn.role {
                TurnRole::User => "user",
                TurnRole::Assistant => "assistant",
            },
            content: turn.content.clone(),
        });
    }

    ChatRequest {
        model: model.to_string(),
        messages,
        temperature,
    }
}

pub(in crate::llm) fn extract_text(
    chat_response: &ChatResponse,
    provider_name: &str,
) -> anyhow::Result<String> {
    chat_response
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| {
            LlmError::EmptyCompletion {
                provider: provider_name.to_string(),
            }
            .into()
        })
}

pub(in crate::llm) struct ChatCompletionsEndpoint<'a> {
    pub(in crate::llm) provider_name: &'a str,
    pub(in crate::llm) url: &'a str,
    pub(in crate::llm) missing_api_key_message: &'a str,
    pub(in crate::llm) extra_headers: &'a [(&'a str, &'a str)],
}

pub(in crate::llm) async fn send_chat_completions(
    client: &reqwest::Client,
    cached_auth_header: Option<&String>,
    request: &ChatRequest,
    endpoint: ChatCompletionsEndpoint<'_>,
) -> anyhow::Result<ChatResponse> {
    let auth_header = cached_auth_header
        .ok_or_else(|| anyhow::anyhow!("{}", endpoint.missing_api_key_message))?;

    let mut request_builder = client
        .post(endpoint.url)
        .header("Authorization", auth_header)
        .json(request);

    for (name, value) in endpoint.extra_headers {
        request_builder = request_builder.header(*name, *value);
    }

    let response = request_builder.send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        let provider = endpoint.provider_name.to_string();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(LlmError::Auth { provider }.into());
        }
        return Err(LlmError::Request {
            provider,
            message: format!("{status}: {}", sanitize_api_error(&error_text)),
        }
        .into());
    }

    response
        .json::<ChatResponse>()
        .await
        .with_context(|| format!("{} returned malformed JSON", endpoint.provider_name))
}
