//! Axum HTTP gateway for the SPA.
//!
//! Keeps the original frontend's wire contract (`/init_session`, `/chat`,
//! `/listen`, `/talk`) and adds what the prototype backends lacked: body
//! limits, request timeouts, a bounded session store with a background
//! sweeper, and CORS suitable for a separately-hosted SPA.

mod handlers;

use handlers::{handle_chat, handle_health, handle_init_session, handle_listen, handle_talk};

use crate::config::Config;
use crate::error::GatewayError;
use crate::llm::{self, Provider};
use crate::session::{SessionStore, StudentProfile};
use crate::speech::{DeepgramSpeech, Synthesizer, Transcriber};
use anyhow::Result;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn Provider>,
    pub transcriber: Arc<dyn Transcriber>,
    pub synthesizer: Arc<dyn Synthesizer>,
    pub sessions: Arc<SessionStore>,
    pub model: String,
    pub temperature: f64,
    /// Voice used when a persona has no TTS voice configured.
    pub fallback_voice: String,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = llm::create_provider(config)?;
        let speech = Arc::new(DeepgramSpeech::new(
            config.speech.api_key.as_deref(),
            &config.speech.stt_model,
        ));

        Ok(Self {
            provider,
            transcriber: speech.clone(),
            synthesizer: speech,
            sessions: Arc::new(SessionStore::new(config.session)),
            model: config.llm.model.clone(),
            temperature: config.llm.temperature,
            fallback_voice: config.speech.tts_voice.clone(),
        })
    }
}

/// `/init_session` request body
#[derive(serde::Deserialize)]
pub struct InitSessionBody {
    pub session_id: String,
    #[serde(default)]
    pub mentor_id: String,
    #[serde(default)]
    pub user_data: StudentProfile,
    #[serde(default)]
    pub current_topic: String,
}

/// `/chat` request body
#[derive(serde::Deserialize)]
pub struct ChatBody {
    pub session_id: String,
    pub message: String,
    #[serde(default)]
    pub mentor_id: String,
    #[serde(default)]
    pub user_context: StudentProfile,
    #[serde(default)]
    pub current_topic: String,
}

/// `/talk` request body
#[derive(serde::Deserialize)]
pub struct TalkBody {
    pub text: String,
    #[serde(default)]
    pub mentor_id: String,
}

/// Run the HTTP gateway.
pub async fn run_gateway(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.gateway.host, config.gateway.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| GatewayError::Bind {
            addr: addr.to_string(),
            message: e.to_string(),
        })?;

    let state = AppState::from_config(&config)?;
    run_gateway_with_listener(listener, state, &config).await
}

/// Run the HTTP gateway from a pre-bound listener (port 0 in tests).
pub async fn run_gateway_with_listener(
    listener: tokio::net::TcpListener,
    state: AppState,
    config: &Config,
) -> Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, provider = state.provider.name(), model = %state.model, "gateway listening");

    // Expired sessions are also rejected lazily on access; the sweeper just
    // keeps idle entries from accumulating.
    let sweeper_sessions = state.sessions.clone();
    let sweep_interval = Duration::from_secs(config.session.sweep_interval_secs.max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let removed = sweeper_sessions.prune_expired();
            if removed > 0 {
                tracing::debug!(removed, "session sweep");
            }
        }
    });

    if let Err(e) = state.provider.warmup().await {
        tracing::warn!("provider warmup failed: {e:#}");
    }

    let app = build_router(state, config);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        return;
    }
    tracing::info!("shutdown signal received");
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/init_session", post(handle_init_session))
        .route("/chat", post(handle_chat))
        .route("/listen", post(handle_listen))
        .route("/talk", post(handle_talk))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.gateway.max_body_bytes))
        .layer(RequestBodyLimitLayer::new(config.gateway.max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.gateway.request_timeout_secs),
        ))
        // The SPA is served from a different origin and sends no credentials.
        .layer(CorsLayer::permissive())
}
