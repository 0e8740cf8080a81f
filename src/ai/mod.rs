//! LLM enrichment
//!
//! Optional second opinion on an audit: the rubric and metrics are sent to
//! an LLM backend, which answers with extra scores, missing signals and
//! suggestions. Uses BYOK (bring your own key); keys come from config or the
//! backend's environment variable.
//!
//! # Environment Variables
//!
//! - `ANTHROPIC_API_KEY`: Anthropic backend (default)
//! - `OPENAI_API_KEY`, `DEEPINFRA_API_KEY`, `OPENROUTER_API_KEY`: other hosted backends
//! - `OLLAMA_MODEL`: model for a local Ollama server (no key)
//!
//! # Example
//!
//! ```rust,ignore
//! use geo_audit::ai::{AiClient, AiConfig, Enricher, LlmEnricher};
//!
//! let client = AiClient::from_config(AiConfig::default(), None)?;
//! let enricher = LlmEnricher::new(client, 12_000);
//! let enrichment = enricher.enrich(&request)?;
//! ```

mod client;
mod enrich;
mod prompts;

pub use client::{AiClient, AiConfig, LlmBackend};
pub use enrich::{
    parse_enrichment, truncate_chars, EnrichmentRequest, Enricher, LlmEnricher,
};
pub use prompts::EnrichmentPromptBuilder;

use thiserror::Error;

/// Errors that can occur in the AI module
#[derive(Error, Debug)]
pub enum AiError {
    #[error("Missing API key: {env_var} not set. Get your key at {signup_url}")]
    MissingApiKey { env_var: String, signup_url: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse API response: {0}")]
    ParseError(String),
}

pub type AiResult<T> = Result<T, AiError>;
