use std::path::Path;

use axum::{
    extract::State,
    routing::get,
    Json,
    Router,
};
use serde::Deserialize;
use serde_json::{
    json,
    Value,
};

use super::ApiError;
use crate::server::AppState;

const ENV_FILE: &str = ".env";

/// GET /api/settings - the live settings
async fn get_settings(State(state): State<AppState>) -> Json<Value> {
    let settings = state.settings.read().await;
    Json(json!({ "settings": *settings }))
}

#[derive(Deserialize)]
struct UpdateSettingsRequest {
    llm_provider: Option<String>,
    llm_model: Option<String>,
    anki_host: Option<String>,
    anki_port: Option<u16>,
    default_tags: Option<Vec<String>>,
}

/// POST /api/settings - update the live settings and rewrite the env file
async fn update_settings(
    State(state): State<AppState>,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut settings = state.settings.write().await;

    if let Some(llm_provider) = request.llm_provider {
        settings.llm_provider = llm_provider;
    }
    if let Some(llm_model) = request.llm_model {
        settings.llm_model = llm_model;
    }
    if let Some(anki_host) = request.anki_host {
        settings.anki_host = anki_host;
    }
    if let Some(anki_port) = request.anki_port {
        settings.anki_port = anki_port;
    }
    if let Some(default_tags) = request.default_tags {
        settings.default_tags = default_tags;
    }

    settings.write_env_file(Path::new(ENV_FILE))?;
    tracing::info!("Settings updated and written to {}", ENV_FILE);

    Ok(Json(json!({
        "status": "success",
        "message": "Settings updated",
        "settings": *settings,
    })))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/settings", get(get_settings).post(update_settings))
}
