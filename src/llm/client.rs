use std::{
    collections::HashMap,
    env,
    fmt,
    time::Duration,
};

use reqwest::Client;
use serde::{
    Deserialize,
    Serialize,
};

use super::{
    parse,
    prompts,
};
use crate::core::{
    config::Settings,
    ForgeError,
};

const REQUEST_TIMEOUT_SECS: u64 = 30;
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const CUSTOM_DEFAULT_ENDPOINT: &str = "http://localhost:11434/v1";

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    OpenAi,
    Gemini,
    Custom,
}

impl LlmProvider {
    pub fn parse(name: &str) -> Result<Self, ForgeError> {
        match name.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "gemini" => Ok(Self::Gemini),
            "custom" => Ok(Self::Custom),
            other => Err(ForgeError::UnknownProvider(other.to_string())),
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn env_key(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
            Self::Custom => "CUSTOM_API_KEY",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
            Self::Custom => "custom",
        };
        write!(f, "{}", name)
    }
}

/// One configured text-generation backend. All providers take the same
/// prompt and are expected to reply with a JSON object mapping field names
/// to generated content.
pub struct LlmClient {
    provider: LlmProvider,
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl LlmClient {
    pub fn new(provider: LlmProvider, model: Option<&str>) -> Result<Self, ForgeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let (api_key, model, api_base) = match provider {
            LlmProvider::OpenAi => {
                let key = env::var("OPENAI_API_KEY").map_err(|_| ForgeError::MissingApiKey {
                    provider: "OpenAI",
                    var: "OPENAI_API_KEY",
                })?;
                (key, model.unwrap_or("gpt-3.5-turbo").to_string(), OPENAI_BASE_URL.to_string())
            }
            LlmProvider::Gemini => {
                let key = env::var("GEMINI_API_KEY").map_err(|_| ForgeError::MissingApiKey {
                    provider: "Gemini",
                    var: "GEMINI_API_KEY",
                })?;
                (key, model.unwrap_or("gemini-2.5-flash-lite").to_string(), GEMINI_BASE_URL.to_string())
            }
            LlmProvider::Custom => {
                let key = env::var("CUSTOM_API_KEY").unwrap_or_else(|_| "dummy-key".to_string());
                let model = match model {
                    Some(m) => m.to_string(),
                    None => env::var("CUSTOM_MODEL").unwrap_or_else(|_| "llama2".to_string()),
                };
                let base = env::var("CUSTOM_ENDPOINT")
                    .unwrap_or_else(|_| CUSTOM_DEFAULT_ENDPOINT.to_string());
                (key, model, base)
            }
        };

        Ok(Self { provider, client, api_key, model, api_base })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ForgeError> {
        let provider = LlmProvider::parse(&settings.llm_provider)?;
        let model = if settings.llm_model.is_empty() { None } else { Some(settings.llm_model.as_str()) };
        Self::new(provider, model)
    }

    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate the field map for one word/phrase: build the prompt, call
    /// the backend, normalize the reply, apply the template repair rule.
    pub async fn generate_note(
        &self,
        word: &str,
        model_name: &str,
        field_names: &[String],
        language: &str,
        instructions: Option<&str>,
        additional_context: Option<&str>,
    ) -> Result<HashMap<String, String>, ForgeError> {
        let prompt = prompts::build_prompt(
            word,
            model_name,
            field_names,
            language,
            instructions,
            additional_context,
        );

        tracing::debug!("Generating fields for '{}' via {} ({})", word, self.provider, self.model);
        let content = match self.provider {
            LlmProvider::OpenAi | LlmProvider::Custom => self.chat_completion(&prompt).await?,
            LlmProvider::Gemini => self.generate_content(&prompt).await?,
        };

        let mut fields = parse::parse_field_map(&content)?;
        parse::repair_note_fields(&mut fields, word, model_name);
        Ok(fields)
    }

    /// OpenAI-compatible `/chat/completions` call, shared by the hosted
    /// OpenAI API and self-hosted endpoints.
    async fn chat_completion(&self, prompt: &str) -> Result<String, ForgeError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: prompts::SYSTEM_PROMPT },
                ChatMessage { role: "user", content: prompt },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let mut builder = self.client.post(format!("{}/chat/completions", self.api_base));
        //Self-hosted endpoints often run without auth
        if self.provider == LlmProvider::OpenAi
            || (!self.api_key.is_empty() && self.api_key != "dummy-key")
        {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response: ChatResponse =
            builder.json(&request).send().await?.error_for_status()?.json().await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| ForgeError::Custom(format!("{} returned no choices", self.provider)))
    }

    async fn generate_content(&self, prompt: &str) -> Result<String, ForgeError> {
        let request = GenerateContentRequest {
            contents: vec![GeminiContent { parts: vec![GeminiPart { text: prompt }] }],
        };

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base, self.model, self.api_key
        );

        let response: GenerateContentResponse =
            self.client.post(url).json(&request).send().await?.error_for_status()?.json().await?;

        response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text.trim().to_string())
            .ok_or_else(|| ForgeError::Custom("gemini returned no candidates".to_string()))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(provider: LlmProvider, api_base: String) -> LlmClient {
        LlmClient {
            provider,
            client: Client::new(),
            api_key: "test-key".to_string(),
            model: "test-model".to_string(),
            api_base,
        }
    }

    fn field_names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn provider_names_round_trip() {
        for name in ["openai", "gemini", "custom"] {
            assert_eq!(LlmProvider::parse(name).unwrap().to_string(), name);
        }
        assert_eq!(LlmProvider::parse("Gemini").unwrap(), LlmProvider::Gemini);
        assert!(matches!(
            LlmProvider::parse("claude"),
            Err(ForgeError::UnknownProvider(_))
        ));
    }

    #[tokio::test]
    async fn chat_completion_reply_becomes_field_map() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_body(
                r#"{"choices": [{"message": {"role": "assistant",
                    "content": "```json\n{\"Front\": \"hola\", \"Back\": \"hello\"}\n```"}}]}"#,
            )
            .create_async()
            .await;

        let client = test_client(LlmProvider::Custom, server.url());
        let fields = client
            .generate_note("hola", "Basic", &field_names(&["Front", "Back"]), "Spanish", None, None)
            .await
            .unwrap();
        assert_eq!(fields["Front"], "hola");
        assert_eq!(fields["Back"], "hello");
    }

    #[tokio::test]
    async fn gemini_reply_becomes_field_map() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/test-model:generateContent?key=test-key")
            .with_body(
                r#"{"candidates": [{"content": {"parts":
                    [{"text": "{\"Front\": \"hola\"}"}], "role": "model"}}]}"#,
            )
            .create_async()
            .await;

        let client = test_client(LlmProvider::Gemini, server.url());
        let fields = client
            .generate_note("hola", "Basic", &field_names(&["Front", "Back"]), "Spanish", None, None)
            .await
            .unwrap();
        assert_eq!(fields["Front"], "hola");
    }

    #[tokio::test]
    async fn suggest_template_is_repaired_after_generation() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_body(
                r#"{"choices": [{"message": {"role": "assistant",
                    "content": "{\"Word\": \"applesauce\", \"suggest\": \"x\"}"}}]}"#,
            )
            .create_async()
            .await;

        let client = test_client(LlmProvider::Custom, server.url());
        let fields = client
            .generate_note(
                "apple",
                parse::SUGGEST_TEMPLATE,
                &field_names(&["Word", "suggest"]),
                "English",
                None,
                None,
            )
            .await
            .unwrap();
        assert_eq!(fields["Word"], "apple");
        assert_eq!(fields["suggest"], "a___e");
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let client = test_client(LlmProvider::Custom, server.url());
        let err = client
            .generate_note("hola", "Basic", &field_names(&["Front"]), "Spanish", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::Custom(_)));
    }
}
