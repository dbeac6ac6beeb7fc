use axum::{
    extract::{
        Path,
        State,
    },
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

/// GET /api/models - sorted model names
async fn get_models(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let anki = anki_client(&state).await;
    let mut models = anki.model_names().await?;
    models.sort();
    Ok(Json(json!({ "models": models })))
}

/// GET /api/model_fields/{model_name} - declared field names
async fn get_model_fields(
    State(state): State<AppState>,
    Path(model_name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let anki = anki_client(&state).await;
    let fields = anki.model_field_names(&model_name).await?;
    Ok(Json(json!({ "fields": fields })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/models", get(get_models))
        .route("/api/model_fields/:model_name", get(get_model_fields))
}
