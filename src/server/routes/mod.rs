use axum::{
    http::StatusCode,
    response::{
        IntoResponse,
        Response,
    },
    Json,
};
use serde_json::json;

use super::AppState;
use crate::{
    anki::AnkiClient,
    core::ForgeError,
    llm::LlmClient,
};

pub mod decks;
pub mod health;
pub mod instructions;
pub mod models;
pub mod notes;
pub mod settings;

/// Handler failure surfaced as a JSON `error` body, Flask-style.
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: message.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<ForgeError> for ApiError {
    fn from(error: ForgeError) -> Self {
        Self::internal(error.to_string())
    }
}

/// Clients are rebuilt from the live settings on every request; nothing is
/// cached across calls.
pub(crate) async fn anki_client(state: &AppState) -> AnkiClient {
    let settings = state.settings.read().await;
    AnkiClient::from_settings(&settings)
}

pub(crate) async fn llm_client(state: &AppState) -> Result<LlmClient, ApiError> {
    let settings = state.settings.read().await;
    Ok(LlmClient::from_settings(&settings)?)
}
