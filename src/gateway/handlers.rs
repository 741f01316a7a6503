use super::{AppState, ChatBody, InitSessionBody, TalkBody};
use crate::error::SessionError;
use crate::llm::{ChatTurn, sanitize_api_error};
use crate::persona;
use axum::{
    extract::{Multipart, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};

/// GET /health — always public (no secrets leaked)
pub(super) async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let body = serde_json::json!({
        "status": "ok",
        "provider": state.provider.name(),
        "model": state.model,
        "sessions": state.sessions.len(),
    });
    Json(body)
}

/// POST /init_session — create or reset a mentor session
pub(super) async fn handle_init_session(
    State(state): State<AppState>,
    body: Result<Json<InitSessionBody>, axum::extract::rejection::JsonRejection>,
) -> Response {
    let Json(init) = match body {
        Ok(b) => b,
        Err(e) => return bad_request(&format!("Invalid JSON: {e}")),
    };

    let mentor = persona::find(&init.mentor_id);
    match state
        .sessions
        .init_session(&init.session_id, mentor.id, init.user_data, &init.current_topic)
    {
        Ok(session) => {
            tracing::info!(
                session_id = %session.id,
                mentor = mentor.id,
                "session initialized"
            );
            let body = serde_json::json!({
                "status": "ok",
                "session_id": session.id,
                "welcome": mentor.welcome,
            });
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(SessionError::InvalidId(reason)) => bad_request(&reason),
        Err(e) => {
            tracing::error!("session init failed: {e}");
            internal_error("Could not initialize the session")
        }
    }
}

/// POST /chat — one mentor turn
pub(super) async fn handle_chat(
    State(state): State<AppState>,
    body: Result<Json<ChatBody>, axum::extract::rejection::JsonRejection>,
) -> Response {
    let Json(chat) = match body {
        Ok(b) => b,
        Err(e) => return bad_request(&format!("Invalid JSON: {e}")),
    };

    let message = chat.message.trim();
    if message.is_empty() {
        return bad_request("message must not be empty");
    }

    let mentor = persona::find(&chat.mentor_id);
    let session = match state.sessions.touch_for_chat(
        &chat.session_id,
        mentor.id,
        &chat.user_context,
        &chat.current_topic,
    ) {
        Ok(session) => session,
        Err(SessionError::InvalidId(reason)) => return bad_request(&reason),
        Err(e) => {
            tracing::error!("session lookup failed: {e}");
            return internal_error("Could not load the session");
        }
    };

    // The user turn is appended before the provider call so a failed turn is
    // not lost; the SPA retries against the same history.
    if let Err(e) = state
        .sessions
        .append_turn(&chat.session_id, ChatTurn::user(message))
    {
        tracing::error!("append failed: {e}");
        return internal_error("Could not record the message");
    }
    let history = state
        .sessions
        .history(&chat.session_id)
        .unwrap_or_else(|_| vec![ChatTurn::user(message)]);

    let system_prompt = persona::build_system_prompt(mentor, &session.profile, &session.topic);

    match state
        .provider
        .chat_with_history(Some(&system_prompt), &history, &state.model, state.temperature)
        .await
    {
        Ok(reply) => {
            if let Err(e) = state
                .sessions
                .append_turn(&chat.session_id, ChatTurn::assistant(&reply))
            {
                // Session evicted mid-turn: the reply is still delivered.
                tracing::warn!("could not record assistant turn: {e}");
            }
            (StatusCode::OK, Json(serde_json::json!({ "reply": reply }))).into_response()
        }
        Err(e) => {
            tracing::error!(
                provider = state.provider.name(),
                "chat completion failed: {}",
                sanitize_api_error(&format!("{e:#}"))
            );
            bad_gateway("The mentor is unavailable right now. Please try again.")
        }
    }
}

/// POST /listen — transcribe one recording (multipart field "audio")
pub(super) async fn handle_listen(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let mut audio: Option<(Vec<u8>, Option<String>)> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("audio") {
                    continue;
                }
                let content_type = field.content_type().map(str::to_owned);
                match field.bytes().await {
                    Ok(bytes) => audio = Some((bytes.to_vec(), content_type)),
                    Err(e) => return bad_request(&format!("could not read audio part: {e}")),
                }
            }
            Ok(None) => break,
            Err(e) => return bad_request(&format!("invalid multipart body: {e}")),
        }
    }

    let Some((bytes, content_type)) = audio else {
        return bad_request("missing multipart field \"audio\"");
    };
    if bytes.is_empty() {
        return bad_request("audio recording is empty");
    }

    match state
        .transcriber
        .transcribe(bytes, content_type.as_deref())
        .await
    {
        Ok(text) => (StatusCode::OK, Json(serde_json::json!({ "text": text }))).into_response(),
        Err(e) => {
            tracing::error!(
                vendor = state.transcriber.name(),
                "transcription failed: {}",
                sanitize_api_error(&format!("{e:#}"))
            );
            bad_gateway("Could not transcribe the recording")
        }
    }
}

/// POST /talk — synthesize a reply with the persona's voice
pub(super) async fn handle_talk(
    State(state): State<AppState>,
    body: Result<Json<TalkBody>, axum::extract::rejection::JsonRejection>,
) -> Response {
    let Json(talk) = match body {
        Ok(b) => b,
        Err(e) => return bad_request(&format!("Invalid JSON: {e}")),
    };

    let text = talk.text.trim();
    if text.is_empty() {
        return bad_request("text must not be empty");
    }

    let mentor = persona::find(&talk.mentor_id);
    let voice = if mentor.voice.is_empty() {
        state.fallback_voice.as_str()
    } else {
        mentor.voice
    };

    match state.synthesizer.synthesize(text, voice).await {
        Ok(audio) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "audio/mpeg")],
            audio,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(
                vendor = state.synthesizer.name(),
                voice,
                "synthesis failed: {}",
                sanitize_api_error(&format!("{e:#}"))
            );
            bad_gateway("Could not generate audio")
        }
    }
}

// ── Error response helpers ──────────────────────────────────────────────────

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

fn bad_gateway(message: &str) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

fn internal_error(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}
