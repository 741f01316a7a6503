use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(in crate::llm) struct ChatRequest {
    pub(in crate::llm) model: String,
    pub(in crate::llm) messages: Vec<Message>,
    pub(in crate::llm) temperature: f64,
}

#[derive(Debug, Serialize)]
pub(in crate::llm) struct Message {
    pub(in crate::llm) role: &'static str,
    pub(in crate::llm) content: String,
}

#[derive(Debug, Deserialize)]
pub(in crate::llm) struct ChatResponse {
    pub(in crate::llm) choices: Vec<Choice>,
    pub(in crate::llm) usage: Option<Usage>,
    pub(in crate::llm) model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(in crate::llm) struct Usage {
    pub(in crate::llm) prompt_tokens: u64,
    pub(in crate::llm) completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
pub(in crate::llm) struct Choice {
    pub(in crate::llm) message: ResponseMessage,
    pub(in crate::llm) finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(in crate::llm) struct ResponseMessage {
    pub(in crate::llm) content: Option<String>,
}
