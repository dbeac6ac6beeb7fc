use std::{
    collections::BTreeMap,
    path::Path,
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    core::ForgeError,
    persistence,
};

pub const INSTRUCTIONS_FILE: &str = "model_instructions.json";

/// Per-model generation instructions, persisted as one JSON object mapping
/// model name to free text. Mutated only by explicit set/remove calls.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstructionStore {
    entries: BTreeMap<String, String>,
}

impl InstructionStore {
    pub fn load() -> Self {
        persistence::load_json_or_default(INSTRUCTIONS_FILE)
    }

    pub fn load_from(path: &Path) -> Result<Self, ForgeError> {
        persistence::load_json_at(path)
    }

    pub fn save(&self) -> Result<(), ForgeError> {
        persistence::save_json(self, INSTRUCTIONS_FILE)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ForgeError> {
        persistence::save_json_at(self, path)
    }

    pub fn get(&self, model_name: &str) -> Option<&str> {
        self.entries.get(model_name).map(|s| s.as_str())
    }

    pub fn set(&mut self, model_name: &str, instruction: &str) {
        self.entries.insert(model_name.to_string(), instruction.to_string());
    }

    pub fn remove(&mut self, model_name: &str) -> Option<String> {
        self.entries.remove(model_name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let mut store = InstructionStore::default();
        assert!(store.get("Basic").is_none());

        store.set("Basic", "keep answers short");
        assert_eq!(store.get("Basic"), Some("keep answers short"));

        store.set("Basic", "include an example sentence");
        assert_eq!(store.get("Basic"), Some("include an example sentence"));

        assert_eq!(store.remove("Basic"), Some("include an example sentence".to_string()));
        assert!(store.is_empty());
    }

    #[test]
    fn persists_as_a_plain_object() {
        let mut store = InstructionStore::default();
        store.set("Cloze", "2-3 deletions");

        let json = serde_json::to_string(&store).unwrap();
        assert_eq!(json, r#"{"Cloze":"2-3 deletions"}"#);
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(INSTRUCTIONS_FILE);

        let mut store = InstructionStore::default();
        store.set("Basic", "short");
        store.save_to(&path).unwrap();

        let loaded = InstructionStore::load_from(&path).unwrap();
        assert_eq!(loaded.get("Basic"), Some("short"));
    }
}
