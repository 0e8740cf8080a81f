//! Enrichment pass: audit context in, best-effort [`Enrichment`] out

use super::prompts::EnrichmentPromptBuilder;
use super::{AiClient, AiError, AiResult};
use crate::models::{AuditMode, Enrichment, HeuristicMetrics, Priority, RubricReport, Suggestion};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::debug;

/// Everything the enrichment pass gets to see
pub struct EnrichmentRequest<'a> {
    pub target: &'a str,
    pub mode: &'a AuditMode,
    pub rubric: &'a RubricReport,
    pub metrics: &'a HeuristicMetrics,
    pub html: &'a str,
}

/// Produces an [`Enrichment`] for an audit. Implemented by [`LlmEnricher`];
/// tests substitute canned implementations.
pub trait Enricher {
    fn enrich(&self, request: &EnrichmentRequest<'_>) -> AiResult<Enrichment>;
}

#[derive(Serialize)]
struct EnrichmentContext<'a> {
    target: &'a str,
    mode: &'a AuditMode,
    rubric: &'a RubricReport,
    metrics: &'a HeuristicMetrics,
    html_excerpt: &'a str,
    html_truncated: bool,
}

/// Enricher backed by an LLM backend
pub struct LlmEnricher {
    client: AiClient,
    max_input_chars: usize,
}

impl LlmEnricher {
    pub fn new(client: AiClient, max_input_chars: usize) -> Self {
        Self {
            client,
            max_input_chars,
        }
    }

    /// Serialized context sent to the model
    pub fn context_json(&self, request: &EnrichmentRequest<'_>) -> AiResult<String> {
        let (excerpt, truncated) = truncate_chars(request.html, self.max_input_chars);
        let context = EnrichmentContext {
            target: request.target,
            mode: request.mode,
            rubric: request.rubric,
            metrics: request.metrics,
            html_excerpt: excerpt,
            html_truncated: truncated,
        };
        serde_json::to_string_pretty(&context)
            .map_err(|e| AiError::ParseError(format!("Failed to serialize context: {}", e)))
    }
}

impl Enricher for LlmEnricher {
    fn enrich(&self, request: &EnrichmentRequest<'_>) -> AiResult<Enrichment> {
        let context = self.context_json(request)?;
        let prompt = EnrichmentPromptBuilder::new(request.target, context)
            .multi_page(request.mode.is_multi())
            .build();

        debug!(
            "Requesting enrichment from {} ({})",
            self.client.backend(),
            self.client.model()
        );
        let response = self
            .client
            .complete_json(EnrichmentPromptBuilder::system_prompt(), &prompt)?;
        parse_enrichment(&response)
    }
}

/// First `max_chars` characters of `text`, and whether anything was cut
pub fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}

fn fenced_json() -> &'static Regex {
    static FENCED_JSON: OnceLock<Regex> = OnceLock::new();
    FENCED_JSON.get_or_init(|| Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").expect("valid regex"))
}

/// Locate the JSON object in a model response: a ```json fence if present,
/// otherwise the outermost braces.
fn json_payload(response: &str) -> Option<&str> {
    if let Some(m) = fenced_json().captures(response).and_then(|c| c.get(1)) {
        return Some(m.as_str());
    }
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (start < end).then(|| &response[start..=end])
}

/// Parse a model response into an [`Enrichment`].
///
/// Recognized fields are `scores`, `missing_signals`, `suggestions` and
/// `notes`; anything else is ignored, as are malformed entries inside them.
pub fn parse_enrichment(response: &str) -> AiResult<Enrichment> {
    let payload = json_payload(response)
        .ok_or_else(|| AiError::ParseError("No JSON object in response".to_string()))?;

    let data: Value = serde_json::from_str(payload)
        .map_err(|e| AiError::ParseError(format!("Failed to parse JSON response: {}", e)))?;

    let scores = data
        .get("scores")
        .and_then(Value::as_object)
        .map(|m| {
            m.iter()
                .filter_map(|(k, v)| v.as_f64().map(|n| (k.clone(), n)))
                .collect()
        })
        .unwrap_or_default();

    let suggestions = data
        .get("suggestions")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(parse_suggestion).collect())
        .unwrap_or_default();

    let notes = match data.get("notes") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Array(items)) => {
            let lines: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!lines.is_empty()).then(|| lines.join("\n"))
        }
        _ => None,
    };

    Ok(Enrichment {
        scores,
        missing_signals: extract_string_array(&data, "missing_signals"),
        suggestions,
        notes,
    })
}

fn parse_suggestion(value: &Value) -> Option<Suggestion> {
    let key = value.get("key")?.as_str()?.trim();
    if key.is_empty() {
        return None;
    }
    let text = |field: &str| {
        value
            .get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Some(Suggestion {
        key: key.to_string(),
        priority: text("priority")
            .map(|p| Priority::parse_lenient(&p))
            .unwrap_or_default(),
        advice: text("advice").unwrap_or_default(),
        example_fix: text("example_fix"),
    })
}

fn extract_string_array(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}
