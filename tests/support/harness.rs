//! Boots the real gateway router on a port-0 listener, with wiremock servers
//! standing in for the LLM and speech vendors.

use mentora::config::Config;
use mentora::gateway::{self, AppState};
use mentora::llm::OpenRouterProvider;
use mentora::session::SessionStore;
use mentora::speech::DeepgramSpeech;
use std::sync::Arc;

pub const TEST_MODEL: &str = "test-model";
pub const LLM_KEY: &str = "sk-or-test-key";
pub const SPEECH_KEY: &str = "dg-test-key";

pub struct TestGateway {
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Spawn the gateway against mock vendor endpoints and return its base URL.
pub async fn spawn_gateway(llm_base_url: &str, speech_base_url: &str) -> TestGateway {
    let mut config = Config::default();
    config.session.max_turns = 8;
    config.session.sweep_interval_secs = 3600;

    let speech = Arc::new(DeepgramSpeech::with_base_url(
        Some(SPEECH_KEY),
        &config.speech.stt_model,
        speech_base_url,
    ));
    let state = AppState {
        provider: Arc::new(OpenRouterProvider::with_base_url(
            Some(LLM_KEY),
            llm_base_url,
        )),
        transcriber: speech.clone(),
        synthesizer: speech,
        sessions: Arc::new(SessionStore::new(config.session)),
        model: TEST_MODEL.into(),
        temperature: 0.7,
        fallback_voice: config.speech.tts_voice.clone(),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");

    tokio::spawn(async move {
        gateway::run_gateway_with_listener(listener, state, &config)
            .await
            .expect("gateway run");
    });

    TestGateway {
        base_url: format!("http://{addr}"),
        client: reqwest::Client::new(),
    }
}

/// `/init_session` body in the shape the SPA sends.
pub fn init_body(session_id: &str, mentor_id: &str, topic: &str) -> serde_json::Value {
    serde_json::json!({
        "session_id": session_id,
        "mentor_id": mentor_id,
        "user_data": {"nombre": "Lucía", "meta": "Aprobar el examen"},
        "current_topic": topic,
    })
}

/// `/chat` body in the shape the SPA sends.
pub fn chat_body(session_id: &str, mentor_id: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "session_id": session_id,
        "message": message,
        "mentor_id": mentor_id,
        "user_context": {"nombre": "Lucía"},
        "current_topic": "Fundamentos Algebraicos",
    })
}

/// OpenAI-compatible completion response with the given reply text.
pub fn completion_json(reply: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "gen-test",
        "model": TEST_MODEL,
        "choices": [
            {"message": {"role": "assistant", "content": reply}, "finish_reason": "stop"}
        ],
        "usage": {"prompt_tokens": 20, "completion_tokens": 5, "total_tokens": 25}
    })
}
