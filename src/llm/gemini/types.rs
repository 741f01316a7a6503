use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::llm) struct GenerateContentRequest {
    pub(in crate::llm) contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(in crate::llm) system_instruction: Option<Content>,
    pub(in crate::llm) generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub(in crate::llm) struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(in crate::llm) role: Option<String>,
    pub(in crate::llm) parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
pub(in crate::llm) struct Part {
    pub(in crate::llm) text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::llm) struct GenerationConfig {
    pub(in crate::llm) temperature: f64,
    pub(in crate::llm) max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub(in crate::llm) struct GenerateContentResponse {
    pub(in crate::llm) candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
pub(in crate::llm) struct Candidate {
    pub(in crate::llm) content: ResponseContent,
}

#[derive(Debug, Deserialize)]
pub(in crate::llm) struct ResponseContent {
    #[serde(default)]
    pub(in crate::llm) parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub(in crate::llm) struct ResponsePart {
    pub(in crate::llm) text: Option<String>,
}
