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

/// GET /api/decks - sorted deck names
async fn get_decks(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let anki = anki_client(&state).await;
    let mut decks = anki.deck_names().await?;
    decks.sort();
    Ok(Json(json!({ "decks": decks })))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/decks", get(get_decks))
}
