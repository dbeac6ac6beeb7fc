use std::collections::HashMap;

use serde::{
    Deserialize,
    Serialize,
};

/// Outgoing note for `addNotes` / `canAddNotes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    pub deck_name: String,
    pub model_name: String,
    pub fields: HashMap<String, String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<NoteOptions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteOptions {
    pub allow_duplicate: bool,
}

impl NewNote {
    pub fn new(deck_name: &str, model_name: &str, fields: HashMap<String, String>, tags: Vec<String>) -> Self {
        Self {
            deck_name: deck_name.to_string(),
            model_name: model_name.to_string(),
            fields,
            tags,
            options: None,
        }
    }

    /// Note assembled from LLM output. Tags are the lowercased target
    /// language, the source tags, then the user's default tags.
    pub fn generated(
        deck_name: &str,
        model_name: &str,
        fields: HashMap<String, String>,
        language: &str,
        sources: &[&str],
        default_tags: &[String],
    ) -> Self {
        let mut tags = vec![language.to_lowercase()];
        tags.extend(sources.iter().map(|s| s.to_string()));
        tags.extend(default_tags.iter().cloned());
        Self::new(deck_name, model_name, fields, tags)
    }

    pub fn allow_duplicate(mut self) -> Self {
        self.options = Some(NoteOptions { allow_duplicate: true });
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Field {
    pub value: String,
    pub order: u32,
}

/// Stored note as `notesInfo` returns it.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NoteInfo {
    pub note_id: u64,
    pub model_name: String,
    pub tags: Vec<String>,
    pub fields: HashMap<String, Field>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub result: Option<T>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("Front".to_string(), "hola".to_string());
        map
    }

    #[test]
    fn new_note_serializes_camel_case_without_options() {
        let note = NewNote::new("Spanish", "Basic", fields(), vec!["vocab".to_string()]);
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["deckName"], "Spanish");
        assert_eq!(json["modelName"], "Basic");
        assert!(json.get("options").is_none());
    }

    #[test]
    fn allow_duplicate_sets_options() {
        let note = NewNote::new("Spanish", "Basic", fields(), vec![]).allow_duplicate();
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["options"]["allowDuplicate"], true);
    }

    #[test]
    fn generated_note_lowercases_language_tag() {
        let note = NewNote::generated(
            "Spanish",
            "Basic",
            fields(),
            "Spanish",
            &["llm-generated", "web-ui"],
            &["mine".to_string()],
        );
        assert_eq!(note.tags, vec!["spanish", "llm-generated", "web-ui", "mine"]);
    }

    #[test]
    fn note_info_deserializes_wire_shape() {
        let json = r#"{
            "noteId": 1502298033753,
            "modelName": "Basic",
            "tags": ["spanish"],
            "fields": {"Front": {"value": "hola", "order": 0}},
            "cards": [1498938915662]
        }"#;
        let note: NoteInfo = serde_json::from_str(json).unwrap();
        assert_eq!(note.note_id, 1502298033753);
        assert_eq!(note.fields["Front"].value, "hola");
    }
}
