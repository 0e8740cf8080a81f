//! Completion client for the enrichment pass
//!
//! One blocking JSON completion per audit over ureq, no retries. Anthropic
//! speaks the Messages API; every other backend speaks the OpenAI
//! chat-completions dialect.

use crate::ai::{AiError, AiResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::env;
use std::str::FromStr;
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";

const TEMPERATURE: f32 = 0.2;

/// Supported LLM backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    #[default]
    Anthropic,
    OpenAi,
    Deepinfra,
    OpenRouter,
    Ollama,
}

/// Wire format spoken by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Messages,
    ChatCompletions,
}

impl LlmBackend {
    const ALL: [LlmBackend; 5] = [
        LlmBackend::Anthropic,
        LlmBackend::OpenAi,
        LlmBackend::Deepinfra,
        LlmBackend::OpenRouter,
        LlmBackend::Ollama,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LlmBackend::Anthropic => "anthropic",
            LlmBackend::OpenAi => "openai",
            LlmBackend::Deepinfra => "deepinfra",
            LlmBackend::OpenRouter => "openrouter",
            LlmBackend::Ollama => "ollama",
        }
    }

    /// Environment variable holding the credential (the model name for Ollama)
    pub fn env_key(self) -> &'static str {
        match self {
            LlmBackend::Anthropic => "ANTHROPIC_API_KEY",
            LlmBackend::OpenAi => "OPENAI_API_KEY",
            LlmBackend::Deepinfra => "DEEPINFRA_API_KEY",
            LlmBackend::OpenRouter => "OPENROUTER_API_KEY",
            LlmBackend::Ollama => "OLLAMA_MODEL",
        }
    }

    pub fn signup_url(self) -> &'static str {
        match self {
            LlmBackend::Anthropic => "https://console.anthropic.com/settings/keys",
            LlmBackend::OpenAi => "https://platform.openai.com/api-keys",
            LlmBackend::Deepinfra => "https://deepinfra.com/dash/api_keys",
            LlmBackend::OpenRouter => "https://openrouter.ai/keys",
            LlmBackend::Ollama => "https://ollama.ai (runs locally, no key)",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            LlmBackend::Anthropic => "claude-3-5-haiku-latest",
            LlmBackend::OpenAi => "gpt-4o-mini",
            LlmBackend::Deepinfra => "meta-llama/Llama-3.3-70B-Instruct",
            LlmBackend::OpenRouter => "openai/gpt-4o-mini",
            LlmBackend::Ollama => "llama3.1:8b",
        }
    }

    fn endpoint(self) -> &'static str {
        match self {
            LlmBackend::Anthropic => "https://api.anthropic.com/v1/messages",
            LlmBackend::OpenAi => "https://api.openai.com/v1/chat/completions",
            LlmBackend::Deepinfra => "https://api.deepinfra.com/v1/openai/chat/completions",
            LlmBackend::OpenRouter => "https://openrouter.ai/api/v1/chat/completions",
            LlmBackend::Ollama => "http://localhost:11434/v1/chat/completions",
        }
    }

    fn dialect(self) -> Dialect {
        match self {
            LlmBackend::Anthropic => Dialect::Messages,
            _ => Dialect::ChatCompletions,
        }
    }

    pub fn requires_api_key(self) -> bool {
        self != LlmBackend::Ollama
    }
}

impl FromStr for LlmBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        if name == "claude" {
            return Ok(LlmBackend::Anthropic);
        }
        LlmBackend::ALL
            .into_iter()
            .find(|b| b.as_str() == name)
            .ok_or_else(|| {
                format!(
                    "Unknown AI backend '{}'. Valid backends: {}",
                    s,
                    LlmBackend::ALL.map(LlmBackend::as_str).join(", ")
                )
            })
    }
}

impl std::fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub backend: LlmBackend,
    /// Falls back to the backend's default model
    pub model: Option<String>,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: LlmBackend::default(),
            model: None,
            max_tokens: 2048,
            timeout: Duration::from_secs(90),
        }
    }
}

/// Client for one backend and model
pub struct AiClient {
    backend: LlmBackend,
    model: String,
    credential: Option<String>,
    max_tokens: u32,
    agent: ureq::Agent,
}

impl AiClient {
    pub fn new(config: AiConfig, credential: Option<String>) -> Self {
        let agent = crate::fetch::make_agent(config.timeout);
        Self {
            model: config
                .model
                .unwrap_or_else(|| config.backend.default_model().to_string()),
            backend: config.backend,
            credential,
            max_tokens: config.max_tokens,
            agent,
        }
    }

    /// Build a client, taking the key from `api_key` or the backend's env var
    pub fn from_config(mut config: AiConfig, api_key: Option<&str>) -> AiResult<Self> {
        if !config.backend.requires_api_key() {
            if config.model.is_none() {
                config.model = env::var(config.backend.env_key()).ok();
            }
            return Ok(Self::new(config, None));
        }

        let env_key = config.backend.env_key();
        let key = match api_key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => key.to_string(),
            None => env::var(env_key).map_err(|_| AiError::MissingApiKey {
                env_var: env_key.to_string(),
                signup_url: config.backend.signup_url().to_string(),
            })?,
        };
        Ok(Self::new(config, Some(key)))
    }

    pub fn backend(&self) -> LlmBackend {
        self.backend
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask for a single JSON answer to `user` under the `system` instructions
    /// and return the raw completion text.
    pub fn complete_json(&self, system: &str, user: &str) -> AiResult<String> {
        let mut request = self
            .agent
            .post(self.backend.endpoint())
            .header("Content-Type", "application/json");
        if let Some(key) = &self.credential {
            request = match self.backend.dialect() {
                Dialect::Messages => request
                    .header("x-api-key", key)
                    .header("anthropic-version", ANTHROPIC_VERSION),
                Dialect::ChatCompletions => {
                    request.header("Authorization", &format!("Bearer {}", key))
                }
            };
        }

        let response = request
            .send_json(self.request_body(system, user))
            .map_err(|e| AiError::ApiError {
                status: 0,
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let message = response.into_body().read_to_string().unwrap_or_default();
            return Err(AiError::ApiError { status, message });
        }

        let payload: Value = response
            .into_body()
            .read_json()
            .map_err(|e| AiError::ParseError(e.to_string()))?;
        completion_text(self.backend.dialect(), &payload).ok_or_else(|| {
            AiError::ParseError(format!("No completion text in {} response", self.backend))
        })
    }

    fn request_body(&self, system: &str, user: &str) -> Value {
        match self.backend.dialect() {
            Dialect::Messages => json!({
                "model": self.model,
                "max_tokens": self.max_tokens,
                "temperature": TEMPERATURE,
                "system": system,
                "messages": [{ "role": "user", "content": user }],
            }),
            Dialect::ChatCompletions => json!({
                "model": self.model,
                "max_tokens": self.max_tokens,
                "temperature": TEMPERATURE,
                "response_format": { "type": "json_object" },
                "messages": [
                    { "role": "system", "content": system },
                    { "role": "user", "content": user },
                ],
            }),
        }
    }
}

/// The assistant text inside a completion payload
fn completion_text(dialect: Dialect, payload: &Value) -> Option<String> {
    let text = match dialect {
        Dialect::Messages => payload
            .get("content")?
            .as_array()?
            .iter()
            .find(|block| block.get("type").and_then(Value::as_str) == Some("text"))?
            .get("text")?
            .as_str(),
        Dialect::ChatCompletions => payload
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str),
    }?;
    Some(text.to_string())
}
