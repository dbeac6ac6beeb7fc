use std::{
    env,
    fs,
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

const SETTINGS_FILE: &str = "config.json";

pub const DEFAULT_ANKI_HOST: &str = "localhost";
pub const DEFAULT_ANKI_PORT: u16 = 8765;
pub const DEFAULT_PROVIDER: &str = "gemini";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";

/// Flat settings shared by both front ends. The console persists them as a
/// JSON document in the app data directory; the web server reads them from
/// the environment and writes updates back into the `.env` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub llm_provider: String,
    pub llm_model: String,
    pub anki_host: String,
    pub anki_port: u16,
    pub default_tags: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm_provider: DEFAULT_PROVIDER.to_string(),
            llm_model: DEFAULT_MODEL.to_string(),
            anki_host: DEFAULT_ANKI_HOST.to_string(),
            anki_port: DEFAULT_ANKI_PORT,
            default_tags: Vec::new(),
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        persistence::load_json_or_default(SETTINGS_FILE)
    }

    pub fn save(&self) -> Result<(), ForgeError> {
        persistence::save_json(self, SETTINGS_FILE)
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            llm_provider: env::var("LLM_PROVIDER").unwrap_or(defaults.llm_provider),
            llm_model: env::var("LLM_MODEL").unwrap_or(defaults.llm_model),
            anki_host: env::var("ANKI_HOST").unwrap_or(defaults.anki_host),
            anki_port: env::var("ANKI_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.anki_port),
            default_tags: env::var("DEFAULT_TAGS")
                .map(|tags| split_tags(&tags))
                .unwrap_or_default(),
        }
    }

    /// Pairs in the order they are written to the env file.
    fn env_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("LLM_PROVIDER", self.llm_provider.clone()),
            ("LLM_MODEL", self.llm_model.clone()),
            ("ANKI_HOST", self.anki_host.clone()),
            ("ANKI_PORT", self.anki_port.to_string()),
            ("DEFAULT_TAGS", self.default_tags.join(",")),
        ]
    }

    /// Rewrite the settings keys in an env file, keeping every unrelated
    /// line (API keys live in the same file) untouched.
    pub fn write_env_file(&self, path: &Path) -> Result<(), ForgeError> {
        let pairs = self.env_pairs();
        let existing = if path.exists() { fs::read_to_string(path)? } else { String::new() };

        let mut lines: Vec<String> = Vec::new();
        for line in existing.lines() {
            let key = line.split('=').next().unwrap_or("").trim();
            if !pairs.iter().any(|(k, _)| *k == key) {
                lines.push(line.to_string());
            }
        }
        for (key, value) in pairs {
            lines.push(format!("{}={}", key, value));
        }

        fs::write(path, lines.join("\n") + "\n")?;
        Ok(())
    }
}

pub fn split_tags(input: &str) -> Vec<String> {
    input.split(',').map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.llm_provider, "gemini");
        assert_eq!(settings.llm_model, "gemini-2.5-flash-lite");
        assert_eq!(settings.anki_host, "localhost");
        assert_eq!(settings.anki_port, 8765);
        assert!(settings.default_tags.is_empty());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"anki_port": 9999}"#).unwrap();
        assert_eq!(settings.anki_port, 9999);
        assert_eq!(settings.llm_provider, "gemini");
    }

    #[test]
    fn split_tags_trims_and_drops_empties() {
        assert_eq!(split_tags("a, b ,,c"), vec!["a", "b", "c"]);
        assert!(split_tags("").is_empty());
    }

    #[test]
    fn env_file_round_trips_settings_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");

        let settings = Settings {
            llm_provider: "openai".to_string(),
            llm_model: "gpt-4o-mini".to_string(),
            anki_host: "127.0.0.1".to_string(),
            anki_port: 8899,
            default_tags: vec!["vocab".to_string(), "llm".to_string()],
        };
        settings.write_env_file(&path).unwrap();

        let pairs: Vec<(String, String)> =
            dotenvy::from_path_iter(&path).unwrap().map(|item| item.unwrap()).collect();
        assert!(pairs.contains(&("LLM_PROVIDER".to_string(), "openai".to_string())));
        assert!(pairs.contains(&("ANKI_PORT".to_string(), "8899".to_string())));
        assert!(pairs.contains(&("DEFAULT_TAGS".to_string(), "vocab,llm".to_string())));
    }

    #[test]
    fn env_file_keeps_unrelated_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "GEMINI_API_KEY=secret\nANKI_PORT=1\n").unwrap();

        Settings::default().write_env_file(&path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("GEMINI_API_KEY=secret"));
        assert!(contents.contains("ANKI_PORT=8765"));
        assert!(!contents.contains("ANKI_PORT=1\n"));
    }
}
