use std::collections::HashMap;

use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json,
    Router,
};
use serde::Deserialize;
use serde_json::{
    json,
    Value,
};

use super::{
    anki_client,
    llm_client,
    ApiError,
};
use crate::{
    anki::NewNote,
    batch::{
        self,
        BatchJob,
    },
    instructions::InstructionStore,
    server::AppState,
};

#[derive(Deserialize)]
struct GenerateNoteRequest {
    word: String,
    deck_name: String,
    model_name: String,
    language: String,
}

/// POST /api/generate_note - preview: generate fields and check whether the
/// note would be accepted, without inserting it.
async fn generate_note(
    State(state): State<AppState>,
    Json(request): Json<GenerateNoteRequest>,
) -> Result<Json<Value>, ApiError> {
    tracing::info!("Generating note for '{}' ({})", request.word, request.model_name);

    let anki = anki_client(&state).await;
    let llm = llm_client(&state).await?;

    let field_names = anki.model_field_names(&request.model_name).await?;
    let instructions = InstructionStore::load();

    let fields = llm
        .generate_note(
            &request.word,
            &request.model_name,
            &field_names,
            &request.language,
            instructions.get(&request.model_name),
            None,
        )
        .await?;

    let default_tags = state.settings.read().await.default_tags.clone();
    let note = NewNote::generated(
        &request.deck_name,
        &request.model_name,
        fields.clone(),
        &request.language,
        &["llm-generated", "web-ui"],
        &default_tags,
    );

    let can_add =
        anki.can_add_notes(std::slice::from_ref(&note)).await?.first().copied().unwrap_or(false);

    Ok(Json(json!({
        "status": "success",
        "fields": fields,
        "can_add": can_add,
        "note": note,
    })))
}

#[derive(Deserialize)]
struct AddNoteRequest {
    note: NewNote,
}

/// POST /api/add_note - insert one previously generated or hand-built note
async fn add_note(
    State(state): State<AppState>,
    Json(request): Json<AddNoteRequest>,
) -> Result<Json<Value>, ApiError> {
    let anki = anki_client(&state).await;
    let note_id = anki.add_notes(std::slice::from_ref(&request.note)).await?.into_iter().next().flatten();

    match note_id {
        Some(note_id) => Ok(Json(json!({
            "status": "success",
            "message": format!("Note added successfully with ID: {}", note_id),
            "note_id": note_id,
        }))),
        None => Err(ApiError {
            status: StatusCode::BAD_REQUEST,
            message: "Failed to add note".to_string(),
        }),
    }
}

#[derive(Deserialize)]
struct BatchGenerateRequest {
    #[serde(default)]
    words: Vec<String>,
    deck_name: String,
    model_name: String,
    language: String,
}

/// POST /api/batch_generate - generate and insert every word, continuing
/// past per-word failures.
async fn batch_generate(
    State(state): State<AppState>,
    Json(request): Json<BatchGenerateRequest>,
) -> Result<Json<Value>, ApiError> {
    tracing::info!("Batch generating {} words into '{}'", request.words.len(), request.deck_name);

    let anki = anki_client(&state).await;
    let llm = llm_client(&state).await?;

    let field_names = anki.model_field_names(&request.model_name).await?;
    let instructions = InstructionStore::load();
    let default_tags = state.settings.read().await.default_tags.clone();

    let job = BatchJob {
        deck_name: &request.deck_name,
        model_name: &request.model_name,
        field_names: &field_names,
        language: &request.language,
        instructions: instructions.get(&request.model_name),
        sources: &["llm-generated", "batch-import", "web-ui"],
        default_tags: &default_tags,
    };

    let report = batch::run_batch(&anki, &llm, &request.words, &job).await;

    Ok(Json(json!({
        "status": "success",
        "results": report.results,
        "summary": report.summary,
    })))
}

#[derive(Deserialize)]
struct SearchNotesRequest {
    query: String,
}

/// POST /api/search_notes - note IDs plus their details
async fn search_notes(
    State(state): State<AppState>,
    Json(request): Json<SearchNotesRequest>,
) -> Result<Json<Value>, ApiError> {
    let anki = anki_client(&state).await;
    let note_ids = anki.find_notes(&request.query).await?;
    let notes = anki.notes_info(&note_ids).await?;

    Ok(Json(json!({
        "note_ids": note_ids,
        "notes": notes,
        "count": notes.len(),
    })))
}

#[derive(Deserialize)]
struct UpdateNoteRequest {
    note_id: u64,
    fields: HashMap<String, String>,
}

/// POST /api/update_note - replace fields on an existing note
async fn update_note(
    State(state): State<AppState>,
    Json(request): Json<UpdateNoteRequest>,
) -> Result<Json<Value>, ApiError> {
    let anki = anki_client(&state).await;
    anki.update_note_fields(request.note_id, &request.fields).await?;

    Ok(Json(json!({
        "status": "success",
        "message": format!("Note {} updated", request.note_id),
    })))
}

#[derive(Deserialize)]
struct DeleteNotesRequest {
    #[serde(default)]
    note_ids: Vec<u64>,
}

/// POST /api/delete_notes
async fn delete_notes(
    State(state): State<AppState>,
    Json(request): Json<DeleteNotesRequest>,
) -> Result<Json<Value>, ApiError> {
    let anki = anki_client(&state).await;
    anki.delete_notes(&request.note_ids).await?;

    Ok(Json(json!({
        "status": "success",
        "message": format!("Deleted {} notes", request.note_ids.len()),
    })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/generate_note", post(generate_note))
        .route("/api/add_note", post(add_note))
        .route("/api/batch_generate", post(batch_generate))
        .route("/api/search_notes", post(search_notes))
        .route("/api/update_note", post(update_note))
        .route("/api/delete_notes", post(delete_notes))
}
