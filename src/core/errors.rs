use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(Box<reqwest::Error>),

    #[error("AnkiConnect error: {0}")]
    AnkiConnect(String),

    #[error("{provider} API key not found. Set the {var} environment variable.")]
    MissingApiKey { provider: &'static str, var: &'static str },

    #[error("Unknown LLM provider: {0}")]
    UnknownProvider(String),

    #[error("LLM response was not a JSON object: {0}")]
    MalformedLlmReply(String),

    #[error("ForgeError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for ForgeError {
    fn from(error: std::io::Error) -> Self {
        ForgeError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for ForgeError {
    fn from(error: reqwest::Error) -> Self {
        ForgeError::Reqwest(Box::new(error))
    }
}
