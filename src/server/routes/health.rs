use axum::{
    extract::State,
    routing::get,
    Json,
    Router,
};
use serde_json::{
    json,
    Value,
};

use super::{
    anki_client,
    ApiError,
};
use crate::server::AppState;

/// GET /api/test_connection - probe the flashcard app
async fn test_connection(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let anki = anki_client(&state).await;
    match anki.version().await {
        Ok(version) => Ok(Json(json!({
            "status": "connected",
            "message": format!("Successfully connected to Anki (AnkiConnect v{})", version),
        }))),
        Err(e) => {
            tracing::warn!("Connection test failed: {}", e);
            Err(ApiError::internal(e.to_string()))
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/test_connection", get(test_connection))
}
