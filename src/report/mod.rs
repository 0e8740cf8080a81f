//! Report assembly
//!
//! Merges the rubric, the heuristic metrics and the enrichment outcome into
//! one [`AuditReport`], and builds the `top_issues` frequency table.

use crate::models::{
    AuditMode, AuditReport, EnrichmentOutcome, HeuristicMetrics, IssueCount, RubricReport,
};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;

/// Assemble a report stamped with the current time
pub fn assemble(
    target: impl Into<String>,
    mode: AuditMode,
    rubric: RubricReport,
    metrics: HeuristicMetrics,
    enrichment: EnrichmentOutcome,
) -> AuditReport {
    assemble_at(target, mode, rubric, metrics, enrichment, Utc::now())
}

/// Assemble a report with an explicit timestamp
pub fn assemble_at(
    target: impl Into<String>,
    mode: AuditMode,
    rubric: RubricReport,
    metrics: HeuristicMetrics,
    enrichment: EnrichmentOutcome,
    generated_at: DateTime<Utc>,
) -> AuditReport {
    let top_issues = issue_frequency(&rubric, &enrichment);
    AuditReport {
        target: target.into(),
        generated_at,
        mode,
        rubric,
        metrics,
        enrichment,
        top_issues,
    }
}

/// Count issue keys from rubric suggestions and enrichment suggestions.
///
/// Sorted by count descending; equal counts keep first-seen order.
pub fn issue_frequency(rubric: &RubricReport, enrichment: &EnrichmentOutcome) -> Vec<IssueCount> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();

    let rubric_keys = rubric.suggestions.iter().map(|s| s.key.as_str());
    let enrichment_keys = enrichment
        .completed()
        .into_iter()
        .flat_map(|e| e.suggestions.iter().map(|s| s.key.as_str()));

    for key in rubric_keys.chain(enrichment_keys) {
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        *counts.entry(key.to_string()).or_insert(0) += 1;
    }

    let mut issues: Vec<IssueCount> = counts
        .into_iter()
        .map(|(key, count)| IssueCount { key, count })
        .collect();
    issues.sort_by(|a, b| b.count.cmp(&a.count));
    issues
}
