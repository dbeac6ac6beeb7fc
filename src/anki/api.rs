use std::collections::HashMap;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::{
    ApiResponse,
    NewNote,
    NoteInfo,
};
use crate::core::{
    config::Settings,
    ForgeError,
};

const ANKI_CONNECT_VERSION: u32 = 6;

/// Client for the AnkiConnect add-on: JSON-RPC-style
/// `{action, version, params}` over HTTP POST.
pub struct AnkiClient {
    client: Client,
    url: String,
}

impl AnkiClient {
    pub fn new(host: &str, port: u16) -> Self {
        Self::from_url(format!("http://{}:{}/", host, port))
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self { client: Client::new(), url: url.into() }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.anki_host, settings.anki_port)
    }

    async fn invoke<T: DeserializeOwned>(
        &self,
        action: &str,
        params: Option<Value>,
    ) -> Result<Option<T>, ForgeError> {
        let mut body = serde_json::Map::new();
        body.insert("action".to_string(), Value::String(action.to_string()));
        body.insert("version".to_string(), Value::Number(ANKI_CONNECT_VERSION.into()));

        if let Some(params) = params {
            body.insert("params".to_string(), params);
        }

        let response: ApiResponse<T> =
            self.client.post(&self.url).json(&body).send().await?.json().await?;

        if let Some(error) = response.error {
            return Err(ForgeError::AnkiConnect(error));
        }

        Ok(response.result)
    }

    /// For actions that always return a result on success.
    async fn invoke_required<T: DeserializeOwned>(
        &self,
        action: &str,
        params: Option<Value>,
    ) -> Result<T, ForgeError> {
        self.invoke(action, params).await?.ok_or_else(|| {
            ForgeError::AnkiConnect(format!("{} returned no result", action))
        })
    }

    //Connection probe
    pub async fn version(&self) -> Result<u32, ForgeError> {
        self.invoke_required("version", None).await
    }

    pub async fn deck_names(&self) -> Result<Vec<String>, ForgeError> {
        self.invoke_required("deckNames", None).await
    }

    pub async fn create_deck(&self, deck_name: &str) -> Result<u64, ForgeError> {
        let params = serde_json::json!({ "deck": deck_name });
        self.invoke_required("createDeck", Some(params)).await
    }

    pub async fn model_names(&self) -> Result<Vec<String>, ForgeError> {
        self.invoke_required("modelNames", None).await
    }

    pub async fn model_field_names(&self, model_name: &str) -> Result<Vec<String>, ForgeError> {
        let params = serde_json::json!({ "modelName": model_name });
        self.invoke_required("modelFieldNames", Some(params)).await
    }

    pub async fn can_add_notes(&self, notes: &[NewNote]) -> Result<Vec<bool>, ForgeError> {
        let params = serde_json::json!({ "notes": notes });
        self.invoke_required("canAddNotes", Some(params)).await
    }

    /// A `None` entry means the flashcard app refused that note.
    pub async fn add_notes(&self, notes: &[NewNote]) -> Result<Vec<Option<u64>>, ForgeError> {
        let params = serde_json::json!({ "notes": notes });
        self.invoke_required("addNotes", Some(params)).await
    }

    pub async fn find_notes(&self, query: &str) -> Result<Vec<u64>, ForgeError> {
        let params = serde_json::json!({ "query": query });
        self.invoke_required("findNotes", Some(params)).await
    }

    pub async fn notes_info(&self, note_ids: &[u64]) -> Result<Vec<NoteInfo>, ForgeError> {
        let params = serde_json::json!({ "notes": note_ids });
        self.invoke_required("notesInfo", Some(params)).await
    }

    //updateNoteFields and deleteNotes return a null result on success
    pub async fn update_note_fields(
        &self,
        note_id: u64,
        fields: &HashMap<String, String>,
    ) -> Result<(), ForgeError> {
        let params = serde_json::json!({ "note": { "id": note_id, "fields": fields } });
        self.invoke::<Value>("updateNoteFields", Some(params)).await?;
        Ok(())
    }

    pub async fn delete_notes(&self, note_ids: &[u64]) -> Result<(), ForgeError> {
        let params = serde_json::json!({ "notes": note_ids });
        self.invoke::<Value>("deleteNotes", Some(params)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deck_names_returns_result_list() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "action": "deckNames",
                "version": 6
            })))
            .with_body(r#"{"result": ["Default", "Spanish"], "error": null}"#)
            .create_async()
            .await;

        let client = AnkiClient::from_url(format!("{}/", server.url()));
        let decks = client.deck_names().await.unwrap();
        assert_eq!(decks, vec!["Default", "Spanish"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_envelope_becomes_typed_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_body(r#"{"result": null, "error": "model was not found: Nope"}"#)
            .create_async()
            .await;

        let client = AnkiClient::from_url(format!("{}/", server.url()));
        let err = client.model_field_names("Nope").await.unwrap_err();
        match err {
            ForgeError::AnkiConnect(msg) => assert!(msg.contains("model was not found")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn add_notes_keeps_per_note_nulls() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_body(r#"{"result": [1496198395707, null], "error": null}"#)
            .create_async()
            .await;

        let client = AnkiClient::from_url(format!("{}/", server.url()));
        let note = NewNote::new("Default", "Basic", HashMap::new(), vec![]);
        let ids = client.add_notes(&[note.clone(), note]).await.unwrap();
        assert_eq!(ids, vec![Some(1496198395707), None]);
    }

    #[tokio::test]
    async fn delete_notes_accepts_null_result() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_body(r#"{"result": null, "error": null}"#)
            .create_async()
            .await;

        let client = AnkiClient::from_url(format!("{}/", server.url()));
        client.delete_notes(&[1502298033753]).await.unwrap();
    }
}
