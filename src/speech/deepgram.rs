//! Deepgram client covering both speech directions: `/v1/listen` for
//! transcription and `/v1/speak` for synthesis.

use super::{Synthesizer, Transcriber};
use crate::error::SpeechError;
use crate::llm::http_client::build_vendor_client;
use crate::llm::scrub::sanitize_api_error;
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;

const DEEPGRAM_BASE_URL: &str = "https://api.deepgram.com";
const DEEPGRAM_MISSING_API_KEY_MESSAGE: &str =
    "Deepgram API key not set. Set DEEPGRAM_API_KEY or [speech] api_key in mentora.toml.";
const FALLBACK_AUDIO_CONTENT_TYPE: &str = "audio/webm";

pub struct DeepgramSpeech {
    /// Pre-computed `"Token <key>"` header value.
    cached_auth_header: Option<String>,
    base_url: String,
    stt_model: String,
    client: Client,
}

// ── /v1/listen response (the slice of it we read) ───────────────────────────

#[derive(Debug, Deserialize)]
struct ListenResponse {
    results: Option<ListenResults>,
}

#[derive(Debug, Deserialize)]
struct ListenResults {
    #[serde(default)]
    channels: Vec<ListenChannel>,
}

#[derive(Debug, Deserialize)]
struct ListenChannel {
    #[serde(default)]
    alternatives: Vec<ListenAlternative>,
}

#[derive(Debug, Deserialize)]
struct ListenAlternative {
    transcript: String,
}

impl DeepgramSpeech {
    pub fn new(api_key: Option<&str>, stt_model: &str) -> Self {
        Self::with_base_url(api_key, stt_model, DEEPGRAM_BASE_URL)
    }

    /// Point the client at a non-default endpoint (mock servers in tests).
    pub fn with_base_url(api_key: Option<&str>, stt_model: &str, base_url: &str) -> Self {
        Self {
            cached_auth_header: api_key.map(|k| format!("Token {k}")),
            base_url: base_url.trim_end_matches('/').to_string(),
            stt_model: stt_model.to_string(),
            client: build_vendor_client(),
        }
    }

    fn auth_header(&self) -> anyhow::Result<&str> {
        self.cached_auth_header
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!(DEEPGRAM_MISSING_API_KEY_MESSAGE))
    }

    async fn vendor_error(vendor_call: &str, response: reqwest::Response) -> String {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        format!(
            "Deepgram {vendor_call} error ({status}): {}",
            sanitize_api_error(&error_text)
        )
    }

    fn extract_transcript(response: &ListenResponse) -> String {
        response
            .results
            .as_ref()
            .and_then(|r| r.channels.first())
            .and_then(|c| c.alternatives.first())
            .map(|a| a.transcript.trim().to_string())
            .unwrap_or_default()
    }

    async fn listen(&self, audio: Vec<u8>, content_type: Option<&str>) -> anyhow::Result<String> {
        let auth_header = self.auth_header()?.to_string();
        let url = format!(
            "{}/v1/listen?model={}&smart_format=true",
            self.base_url, self.stt_model
        );

        let response = self
            .client
            .post(url)
            .header("Authorization", auth_header)
            .header(
                "Content-Type",
                content_type.unwrap_or(FALLBACK_AUDIO_CONTENT_TYPE),
            )
            .body(audio)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(
                SpeechError::Transcription(Self::vendor_error("listen", response).await).into(),
            );
        }

        let parsed: ListenResponse = response.json().await?;
        Ok(Self::extract_transcript(&parsed))
    }

    async fn speak(&self, text: &str, voice: &str) -> anyhow::Result<Vec<u8>> {
        let auth_header = self.auth_header()?.to_string();
        let url = format!("{}/v1/speak?model={voice}", self.base_url);

        let response = self
            .client
            .post(url)
            .header("Authorization", auth_header)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(
                SpeechError::Synthesis(Self::vendor_error("speak", response).await).into(),
            );
        }

        Ok(response.bytes().await?.to_vec())
    }
}

impl Transcriber for DeepgramSpeech {
    fn name(&self) -> &str {
        "deepgram"
    }

    fn transcribe<'a>(
        &'a self,
        audio: Vec<u8>,
        content_type: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move { self.listen(audio, content_type).await })
    }
}

impl Synthesizer for DeepgramSpeech {
    fn name(&self) -> &str {
        "deepgram"
    }

    fn synthesize<'a>(
        &'a self,
        text: &'a str,
        voice: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<u8>>> + Send + 'a>> {
        Box::pin(async move { self.speak(text, voice).await })
    }
}
