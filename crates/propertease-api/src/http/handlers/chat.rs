//! Demo chat endpoints over the server-held transcript.
//!
//! - `POST /api/chat` `{ "message": "..." }` - one exchange, returns the reply and transcript
//! - `GET /api/chat` - the transcript so far
//!
//! Model failures never surface here: the controller answers with its
//! fallback reply instead. The exchange runs on its own task, so the bot
//! turn is committed even when the client disconnects mid-request.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use propertease_types::chat::ChatMessage;
use propertease_types::error::GatewayError;

use crate::http::error::AppError;
use crate::http::extractors::json::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: ChatMessage,
    pub transcript: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub transcript: Vec<ChatMessage>,
}

/// POST /api/chat
pub async fn send_message(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = body.message.unwrap_or_default();
    let exchange = state.chat.append_user_turn(&message)?;
    let reply = tokio::spawn(exchange.resolve())
        .await
        .map_err(|e| GatewayError::Upstream(format!("chat exchange task failed: {e}")))?;
    Ok(Json(ChatResponse {
        reply,
        transcript: state.chat.transcript(),
    }))
}

/// GET /api/chat
pub async fn get_transcript(State(state): State<AppState>) -> Json<TranscriptResponse> {
    Json(TranscriptResponse {
        transcript: state.chat.transcript(),
    })
}
