//! Core data models for geo-audit
//!
//! These models are shared by the scorer, the heuristic metrics, the report
//! assembler and every reporter.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Priority of a failing check or suggestion
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Sort weight used when ordering suggestions (high=3, medium=2, low=1)
    pub fn weight(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    /// Lenient parse used for LLM-provided priorities. Unknown values map to medium.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high" | "critical" => Priority::High,
            "low" | "info" => Priority::Low,
            _ => Priority::Medium,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// Identifier of one rubric check
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKey {
    Lang,
    Charset,
    Viewport,
    Title,
    Description,
    H1,
    Canonical,
    Robots,
    JsonLd,
    LocalSchema,
    ImagesAlt,
    Geo,
}

impl CheckKey {
    /// Every key, in canonical check order
    pub const ALL: [CheckKey; 12] = [
        CheckKey::Lang,
        CheckKey::Charset,
        CheckKey::Viewport,
        CheckKey::Title,
        CheckKey::Description,
        CheckKey::H1,
        CheckKey::Canonical,
        CheckKey::Robots,
        CheckKey::JsonLd,
        CheckKey::LocalSchema,
        CheckKey::ImagesAlt,
        CheckKey::Geo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CheckKey::Lang => "lang",
            CheckKey::Charset => "charset",
            CheckKey::Viewport => "viewport",
            CheckKey::Title => "title",
            CheckKey::Description => "description",
            CheckKey::H1 => "h1",
            CheckKey::Canonical => "canonical",
            CheckKey::Robots => "robots",
            CheckKey::JsonLd => "json_ld",
            CheckKey::LocalSchema => "local_schema",
            CheckKey::ImagesAlt => "images_alt",
            CheckKey::Geo => "geo",
        }
    }

    /// Human label for reports
    pub fn label(self) -> &'static str {
        match self {
            CheckKey::Lang => "Language attribute",
            CheckKey::Charset => "Charset declaration",
            CheckKey::Viewport => "Viewport meta",
            CheckKey::Title => "Title",
            CheckKey::Description => "Meta description",
            CheckKey::H1 => "Single H1",
            CheckKey::Canonical => "Canonical link",
            CheckKey::Robots => "Indexable (no noindex)",
            CheckKey::JsonLd => "Structured data",
            CheckKey::LocalSchema => "Local business schema",
            CheckKey::ImagesAlt => "Image alt text",
            CheckKey::Geo => "Geo signals",
        }
    }
}

impl std::fmt::Display for CheckKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase().replace('-', "_");
        CheckKey::ALL
            .into_iter()
            .find(|k| k.as_str() == needle)
            .ok_or_else(|| {
                format!(
                    "Unknown check '{}'. Valid checks: {}",
                    s,
                    CheckKey::ALL.map(CheckKey::as_str).join(", ")
                )
            })
    }
}

/// Result of a single rubric check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub key: CheckKey,
    pub passed: bool,
    pub awarded: u32,
    pub max: u32,
    /// Observed values backing the verdict
    #[serde(default)]
    pub details: serde_json::Value,
    /// Only present when the check failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
    pub priority: Priority,
}

/// An actionable recommendation, from the rubric or from enrichment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub key: String,
    pub priority: Priority,
    pub advice: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_fix: Option<String>,
}

/// Output of the rubric scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricReport {
    pub checks: IndexMap<CheckKey, CheckResult>,
    pub total_awarded: u32,
    pub total_possible: u32,
    /// Percentage with two decimals
    pub score: f64,
    /// Failing checks, highest priority first
    pub suggestions: Vec<Suggestion>,
}

impl RubricReport {
    pub fn passed_count(&self) -> usize {
        self.checks.values().filter(|c| c.passed).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.values().filter(|c| !c.passed)
    }
}

/// Qualitative reading-ease band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadabilityLabel {
    VeryDifficult,
    Difficult,
    FairlyEasy,
    Easy,
}

impl ReadabilityLabel {
    pub fn from_score(score: i64) -> Self {
        match score {
            s if s >= 60 => ReadabilityLabel::Easy,
            s if s >= 50 => ReadabilityLabel::FairlyEasy,
            s if s >= 30 => ReadabilityLabel::Difficult,
            _ => ReadabilityLabel::VeryDifficult,
        }
    }
}

impl std::fmt::Display for ReadabilityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadabilityLabel::Easy => write!(f, "easy"),
            ReadabilityLabel::FairlyEasy => write!(f, "fairly easy"),
            ReadabilityLabel::Difficult => write!(f, "difficult"),
            ReadabilityLabel::VeryDifficult => write!(f, "very difficult"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readability {
    pub score: i64,
    pub label: ReadabilityLabel,
    pub paragraphs: usize,
    pub words: usize,
    pub sentences: usize,
    pub syllables: usize,
}

/// Additive breakdown of the local-relevance (GEO) score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeoScoreBreakdown {
    pub schema: u32,
    pub address: u32,
    pub phone: u32,
    pub coordinates: u32,
    pub geo_meta: u32,
    pub hreflang: u32,
    pub entity_density: u32,
    pub combined_signals: u32,
    /// Clamped to 0..=100
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicMetrics {
    pub readability: Readability,
    pub entities: Vec<String>,
    pub geo: GeoScoreBreakdown,
}

/// Whether the audit covered one page or a crawled set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AuditMode {
    Single,
    Multi { pages: Vec<String> },
}

impl AuditMode {
    pub fn is_multi(&self) -> bool {
        matches!(self, AuditMode::Multi { .. })
    }
}

/// Best-effort structured payload returned by the enrichment pass
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Enrichment {
    #[serde(default)]
    pub scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub missing_signals: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// What happened to the optional enrichment phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EnrichmentOutcome {
    Skipped { reason: String },
    Failed { error: String },
    Completed(Enrichment),
}

impl EnrichmentOutcome {
    pub fn completed(&self) -> Option<&Enrichment> {
        match self {
            EnrichmentOutcome::Completed(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCount {
    pub key: String,
    pub count: usize,
}

/// Top-level audit result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub target: String,
    pub generated_at: DateTime<Utc>,
    pub mode: AuditMode,
    pub rubric: RubricReport,
    pub metrics: HeuristicMetrics,
    pub enrichment: EnrichmentOutcome,
    pub top_issues: Vec<IssueCount>,
}

impl AuditReport {
    /// Letter grade for the rubric percentage
    pub fn grade(&self) -> &'static str {
        grade_from_score(self.rubric.score)
    }
}

/// Calculate grade from a 0-100 score
pub fn grade_from_score(score: f64) -> &'static str {
    match score {
        s if s >= 90.0 => "A",
        s if s >= 80.0 => "B",
        s if s >= 70.0 => "C",
        s if s >= 60.0 => "D",
        _ => "F",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_key_round_trips_through_str() {
        for key in CheckKey::ALL {
            assert_eq!(key.as_str().parse::<CheckKey>().unwrap(), key);
        }
        assert_eq!("images-alt".parse::<CheckKey>().unwrap(), CheckKey::ImagesAlt);
        assert!("bogus".parse::<CheckKey>().is_err());
    }

    #[test]
    fn test_check_key_serde_matches_as_str() {
        let json = serde_json::to_string(&CheckKey::JsonLd).unwrap();
        assert_eq!(json, "\"json_ld\"");
        let json = serde_json::to_string(&CheckKey::H1).unwrap();
        assert_eq!(json, "\"h1\"");
    }

    #[test]
    fn test_readability_label_is_monotonic() {
        let mut previous = ReadabilityLabel::VeryDifficult;
        for score in -50..=150 {
            let label = ReadabilityLabel::from_score(score);
            assert!(label >= previous, "score {score} got harder label");
            previous = label;
        }
        assert_eq!(ReadabilityLabel::from_score(60), ReadabilityLabel::Easy);
        assert_eq!(ReadabilityLabel::from_score(59), ReadabilityLabel::FairlyEasy);
        assert_eq!(ReadabilityLabel::from_score(30), ReadabilityLabel::Difficult);
        assert_eq!(ReadabilityLabel::from_score(29), ReadabilityLabel::VeryDifficult);
    }

    #[test]
    fn test_priority_weights() {
        assert_eq!(Priority::High.weight(), 3);
        assert_eq!(Priority::Medium.weight(), 2);
        assert_eq!(Priority::Low.weight(), 1);
        assert_eq!(Priority::parse_lenient("HIGH"), Priority::High);
        assert_eq!(Priority::parse_lenient("whatever"), Priority::Medium);
    }

    #[test]
    fn test_enrichment_outcome_tagging() {
        let skipped = EnrichmentOutcome::Skipped {
            reason: "disabled".into(),
        };
        let v = serde_json::to_value(&skipped).unwrap();
        assert_eq!(v["status"], "skipped");
        assert_eq!(v["reason"], "disabled");

        let done = EnrichmentOutcome::Completed(Enrichment {
            notes: Some("ok".into()),
            ..Default::default()
        });
        let v = serde_json::to_value(&done).unwrap();
        assert_eq!(v["status"], "completed");
        assert_eq!(v["notes"], "ok");
    }

    #[test]
    fn test_grade_from_score() {
        assert_eq!(grade_from_score(95.0), "A");
        assert_eq!(grade_from_score(32.18), "F");
        assert_eq!(grade_from_score(70.0), "C");
    }
}
