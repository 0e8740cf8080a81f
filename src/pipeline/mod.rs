//! Audit pipeline
//!
//! Orchestrates one audit run over an HTML document:
//! 1. Extract document facts
//! 2. Score the rubric and compute heuristic metrics from the same facts
//! 3. Enrich with an LLM (if configured)
//! 4. Assemble the report
//!
//! Steps 1, 2 and 4 are pure. Only enrichment does I/O, and its failure
//! degrades the report instead of failing the run.

use tracing::{debug, info, warn};

use crate::ai::{Enricher, EnrichmentRequest};
use crate::config::AuditConfig;
use crate::extract::{extract_facts, DocumentFacts};
use crate::metrics::{self, MULTI_PAGE_ENTITY_CAP, SINGLE_PAGE_ENTITY_CAP};
use crate::models::{AuditMode, AuditReport, EnrichmentOutcome, HeuristicMetrics, RubricReport};
use crate::report;
use crate::rubric::Rubric;

/// Deterministic results for one document
#[derive(Debug)]
pub struct Analysis {
    pub facts: DocumentFacts,
    pub rubric: RubricReport,
    pub metrics: HeuristicMetrics,
}

/// Full audit pipeline.
pub struct Pipeline<'a> {
    rubric: Rubric,
    /// Overrides the mode-dependent entity cap
    entity_cap: Option<usize>,
    enricher: Option<&'a dyn Enricher>,
    /// Recorded in the report when no enricher is attached
    skip_reason: String,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline from resolved config, with enrichment off.
    pub fn new(config: &AuditConfig) -> Self {
        Self {
            rubric: Rubric::new(config.weights.clone()),
            entity_cap: config.entity_cap,
            enricher: None,
            skip_reason: "enrichment not configured".to_string(),
        }
    }

    /// Attach an enricher.
    pub fn with_enricher(mut self, enricher: &'a dyn Enricher) -> Self {
        self.enricher = Some(enricher);
        self
    }

    /// Run without enrichment, recording why.
    pub fn without_enrichment(mut self, reason: impl Into<String>) -> Self {
        self.enricher = None;
        self.skip_reason = reason.into();
        self
    }

    pub fn entity_cap(&self, mode: &AuditMode) -> usize {
        self.entity_cap.unwrap_or(if mode.is_multi() {
            MULTI_PAGE_ENTITY_CAP
        } else {
            SINGLE_PAGE_ENTITY_CAP
        })
    }

    /// Extract, score and measure one document.
    pub fn analyze(&self, html: &str, mode: &AuditMode) -> Analysis {
        let facts = extract_facts(html);
        let rubric = self.rubric.score(&facts);
        let metrics = metrics::compute(&facts, self.entity_cap(mode));
        debug!(
            "Rubric {}/{} ({}%), readability {}, geo {}",
            rubric.total_awarded,
            rubric.total_possible,
            rubric.score,
            metrics.readability.score,
            metrics.geo.total
        );
        Analysis {
            facts,
            rubric,
            metrics,
        }
    }

    /// Run the full pipeline and assemble the report.
    pub fn run(&self, target: &str, mode: AuditMode, html: &str) -> AuditReport {
        let Analysis { rubric, metrics, .. } = self.analyze(html, &mode);
        let enrichment = self.enrich(target, &mode, &rubric, &metrics, html);
        report::assemble(target, mode, rubric, metrics, enrichment)
    }

    fn enrich(
        &self,
        target: &str,
        mode: &AuditMode,
        rubric: &RubricReport,
        metrics: &HeuristicMetrics,
        html: &str,
    ) -> EnrichmentOutcome {
        let Some(enricher) = self.enricher else {
            return EnrichmentOutcome::Skipped {
                reason: self.skip_reason.clone(),
            };
        };

        let request = EnrichmentRequest {
            target,
            mode,
            rubric,
            metrics,
            html,
        };
        match enricher.enrich(&request) {
            Ok(enrichment) => {
                info!(
                    "Enrichment added {} suggestions",
                    enrichment.suggestions.len()
                );
                EnrichmentOutcome::Completed(enrichment)
            }
            Err(e) => {
                warn!("Enrichment failed, continuing with rubric-only report: {}", e);
                EnrichmentOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiError, AiResult};
    use crate::models::{CheckKey, Enrichment, Priority, Suggestion};
    use std::cell::Cell;

    struct CannedEnricher {
        calls: Cell<usize>,
        seen_html_len: Cell<usize>,
    }

    impl CannedEnricher {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
                seen_html_len: Cell::new(0),
            }
        }
    }

    impl Enricher for CannedEnricher {
        fn enrich(&self, request: &EnrichmentRequest<'_>) -> AiResult<Enrichment> {
            self.calls.set(self.calls.get() + 1);
            self.seen_html_len.set(request.html.len());
            Ok(Enrichment {
                suggestions: vec![Suggestion {
                    key: "title".to_string(),
                    priority: Priority::High,
                    advice: "Write a longer title".to_string(),
                    example_fix: None,
                }],
                notes: Some(format!("score was {}", request.rubric.score)),
                ..Default::default()
            })
        }
    }

    struct FailingEnricher;

    impl Enricher for FailingEnricher {
        fn enrich(&self, _request: &EnrichmentRequest<'_>) -> AiResult<Enrichment> {
            Err(AiError::ApiError {
                status: 500,
                message: "upstream down".to_string(),
            })
        }
    }

    const PAGE: &str = "<html lang='en'><head><title>Hi</title></head><body><p>Visit Paris.</p></body></html>";

    #[test]
    fn test_run_without_enrichment() {
        let config = AuditConfig::default();
        let report = Pipeline::new(&config)
            .without_enrichment("disabled by --no-ai")
            .run("https://example.com", AuditMode::Single, PAGE);

        assert_eq!(report.target, "https://example.com");
        assert_eq!(report.rubric.checks.len(), 12);
        assert!(matches!(
            report.enrichment,
            EnrichmentOutcome::Skipped { ref reason } if reason == "disabled by --no-ai"
        ));
        assert_eq!(report.top_issues.len(), report.rubric.suggestions.len());
    }

    #[test]
    fn test_enrichment_merges_into_top_issues() {
        let config = AuditConfig::default();
        let enricher = CannedEnricher::new();
        let report = Pipeline::new(&config)
            .with_enricher(&enricher)
            .run("https://example.com", AuditMode::Single, PAGE);

        assert_eq!(enricher.calls.get(), 1);
        assert_eq!(enricher.seen_html_len.get(), PAGE.len());
        let enrichment = report.enrichment.completed().unwrap();
        assert!(enrichment.notes.as_deref().unwrap().starts_with("score was"));
        // "title" fails in the rubric and is repeated by the enricher
        assert_eq!(report.top_issues[0].key, "title");
        assert_eq!(report.top_issues[0].count, 2);
    }

    #[test]
    fn test_enrichment_failure_degrades() {
        let config = AuditConfig::default();
        let report = Pipeline::new(&config)
            .with_enricher(&FailingEnricher)
            .run("https://example.com", AuditMode::Single, PAGE);

        match &report.enrichment {
            EnrichmentOutcome::Failed { error } => assert!(error.contains("upstream down")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(report.rubric.checks[&CheckKey::Lang].passed);
    }

    #[test]
    fn test_entity_cap_depends_on_mode() {
        let multi = AuditMode::Multi {
            pages: vec!["https://example.com/".to_string()],
        };
        let mut config = AuditConfig::default();
        let pipeline = Pipeline::new(&config);
        assert_eq!(pipeline.entity_cap(&AuditMode::Single), 5);
        assert_eq!(pipeline.entity_cap(&multi), 10);

        config.entity_cap = Some(2);
        let pipeline = Pipeline::new(&config);
        assert_eq!(pipeline.entity_cap(&multi), 2);
    }

    #[test]
    fn test_weight_overrides_reach_the_rubric() {
        let mut config = AuditConfig::default();
        config.weights.set(CheckKey::Geo, 0);
        let analysis = Pipeline::new(&config).analyze("", &AuditMode::Single);
        assert_eq!(analysis.rubric.total_possible, 79);
    }

    #[test]
    fn test_empty_document_produces_complete_report() {
        let config = AuditConfig::default();
        let report = Pipeline::new(&config).run("local", AuditMode::Single, "");
        assert_eq!(report.rubric.checks.len(), 12);
        assert!(report.rubric.score > 0.0);
        assert!(report.metrics.entities.is_empty());
    }
}
