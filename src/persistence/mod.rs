use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use serde::{
    de::DeserializeOwned,
    Serialize,
};

use crate::core::ForgeError;

const APP_NAME: &str = "ankiforge";

pub fn get_app_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        let app_dir = data_dir.join(APP_NAME);
        let _ = fs::create_dir_all(&app_dir);
        app_dir
    } else {
        PathBuf::from(".")
    }
}

pub fn get_data_file_path(filename: &str) -> PathBuf {
    get_app_data_dir().join(filename)
}

pub fn save_json_at<T: Serialize>(data: &T, path: &Path) -> Result<(), ForgeError> {
    let json = serde_json::to_string_pretty(data)?;
    fs::write(path, json)?;
    tracing::debug!("Data saved to: {}", path.display());
    Ok(())
}

pub fn save_json<T: Serialize>(data: &T, filename: &str) -> Result<(), ForgeError> {
    save_json_at(data, &get_data_file_path(filename))
}

pub fn load_json_at<T: DeserializeOwned + Default>(path: &Path) -> Result<T, ForgeError> {
    if !path.exists() {
        return Ok(T::default());
    }

    let json = fs::read_to_string(path)?;
    let data: T = serde_json::from_str(&json)?;
    tracing::debug!("Data loaded from: {}", path.display());
    Ok(data)
}

pub fn load_json<T: DeserializeOwned + Default>(filename: &str) -> Result<T, ForgeError> {
    load_json_at(&get_data_file_path(filename))
}

pub fn load_json_or_default<T: DeserializeOwned + Default>(filename: &str) -> T {
    match load_json::<T>(filename) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!("Failed to load {}: {}. Using defaults.", filename, e);
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");

        let mut data = HashMap::new();
        data.insert("Basic".to_string(), "keep it short".to_string());

        save_json_at(&data, &path).unwrap();
        let loaded: HashMap<String, String> = load_json_at(&path).unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded: HashMap<String, String> = load_json_at(&dir.path().join("nope.json")).unwrap();
        assert!(loaded.is_empty());
    }
}
