use axum::{
    extract::Path,
    routing::{
        delete,
        get,
    },
    Json,
    Router,
};
use serde::Deserialize;
use serde_json::{
    json,
    Value,
};

use super::ApiError;
use crate::{
    instructions::InstructionStore,
    server::AppState,
};

/// GET /api/model_instructions - the whole instruction document
async fn get_instructions() -> Result<Json<Value>, ApiError> {
    let store = InstructionStore::load();
    Ok(Json(json!({ "instructions": store })))
}

#[derive(Deserialize)]
struct UpdateInstructionRequest {
    model_name: String,
    instruction: String,
}

/// POST /api/model_instructions - upsert one model's instructions
async fn update_instructions(
    Json(request): Json<UpdateInstructionRequest>,
) -> Result<Json<Value>, ApiError> {
    tracing::info!("Updating instructions for model '{}'", request.model_name);

    let mut store = InstructionStore::load();
    store.set(&request.model_name, &request.instruction);
    store.save()?;

    Ok(Json(json!({ "status": "success", "message": "Instructions updated" })))
}

/// DELETE /api/model_instructions/{model_name}
async fn remove_instructions(Path(model_name): Path<String>) -> Result<Json<Value>, ApiError> {
    let mut store = InstructionStore::load();
    match store.remove(&model_name) {
        Some(_) => {
            store.save()?;
            Ok(Json(json!({ "status": "success", "message": "Instructions removed" })))
        }
        None => Err(ApiError {
            status: axum::http::StatusCode::NOT_FOUND,
            message: format!("No instructions for model '{}'", model_name),
        }),
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/model_instructions", get(get_instructions).post(update_instructions))
        .route("/api/model_instructions/:model_name", delete(remove_instructions))
}
