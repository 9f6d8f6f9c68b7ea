use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::auth;
use crate::commands;
use crate::config::TelegramConfig;
use crate::platform::telegram::{extract_message, Update};
use crate::platform::{OutboundMessage, ReplySender};

const LIVENESS_MESSAGE: &str =
    "Telegram bot webhook endpoint is alive. Use POST with Telegram updates.";

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("{0}")]
    Configuration(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Malformed update payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
    #[error("{0:#}")]
    Dispatch(anyhow::Error),
}

impl WebhookError {
    fn status(&self) -> StatusCode {
        match self {
            WebhookError::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

impl ApiResponse {
    fn ok() -> Self {
        Self {
            ok: true,
            description: None,
            message: None,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let body = ApiResponse {
            ok: false,
            description: Some(self.to_string()),
            message: None,
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Shared, read-only state for the webhook routes
pub struct AppState {
    pub telegram: TelegramConfig,
    pub sender: Arc<dyn ReplySender>,
}

impl AppState {
    pub fn new(telegram: TelegramConfig, sender: Arc<dyn ReplySender>) -> Self {
        Self { telegram, sender }
    }
}

pub fn router(state: Arc<AppState>, path: &str) -> Router {
    Router::new()
        .route(path, get(liveness).post(handle_update))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn liveness() -> Json<ApiResponse> {
    Json(ApiResponse {
        message: Some(LIVENESS_MESSAGE),
        ..ApiResponse::ok()
    })
}

async fn handle_update(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match process_update(&state, &headers, &body).await {
        Ok(()) => Json(ApiResponse::ok()).into_response(),
        Err(e) => {
            match &e {
                WebhookError::Unauthorized => {}
                WebhookError::Dispatch(err) => error!("Failed to dispatch reply: {:#}", err),
                other => error!("Webhook handler failed: {}", other),
            }
            e.into_response()
        }
    }
}

/// Authenticate, decode, route and dispatch a single update.
async fn process_update(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<(), WebhookError> {
    let credentials = state.telegram.credentials()?;

    if !auth::validate(auth::provided_secret(headers), &credentials.secret_token) {
        warn!("Rejected webhook call with invalid secret token");
        return Err(WebhookError::Unauthorized);
    }

    let Some(update) = Update::from_slice(body)? else {
        info!("Array body acknowledged without processing");
        return Ok(());
    };

    let Some(message) = extract_message(&update) else {
        info!("Non-message update processed (update_id {:?})", update.update_id);
        return Ok(());
    };

    // Telegram never issues chat id 0; treat it as missing
    let Some(chat_id) = message.chat.id.filter(|id| *id != 0) else {
        info!("Message {} has no chat id, nothing to reply to", message.message_id);
        return Ok(());
    };

    let Some(text) = commands::route(&message) else {
        info!("No reply generated for message {}", message.message_id);
        return Ok(());
    };

    state
        .sender
        .send_message(&credentials.bot_token, &OutboundMessage { chat_id, text })
        .await
        .map_err(WebhookError::Dispatch)?;

    Ok(())
}
