//! Fixed-weight SEO/GEO rubric
//!
//! Each [`Check`] looks at [`DocumentFacts`] and reports pass/fail plus the
//! points it earned out of the weight it was given. The [`Rubric`] runs every
//! registered check in canonical order and totals the result:
//!
//! ```text
//! score = round(total_awarded / total_possible * 10000) / 100
//! ```
//!
//! `total_possible` is the sum of the weights of the checks that ran, and no
//! check can award more than its weight, so the score never exceeds 100.

mod checks;

pub use checks::default_checks;

use crate::config::RubricWeights;
use crate::extract::DocumentFacts;
use crate::models::{CheckKey, CheckResult, Priority, RubricReport, Suggestion};
use indexmap::IndexMap;
use tracing::debug;

/// Verdict of one check before it is wrapped into a [`CheckResult`]
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub passed: bool,
    pub awarded: u32,
    pub details: serde_json::Value,
}

impl CheckOutcome {
    /// Full weight on presence, zero otherwise
    pub fn binary(passed: bool, weight: u32, details: serde_json::Value) -> Self {
        Self {
            passed,
            awarded: if passed { weight } else { 0 },
            details,
        }
    }
}

/// One rubric entry
///
/// Checks are stateless: the same facts and weight always give the same
/// outcome.
pub trait Check: Send + Sync {
    fn key(&self) -> CheckKey;

    fn priority(&self) -> Priority;

    /// Advice shown when the check fails. `None` means the failure is not
    /// turned into a suggestion.
    fn advice(&self) -> Option<&'static str>;

    fn evaluate(&self, facts: &DocumentFacts, weight: u32) -> CheckOutcome;
}

/// Rounded fraction of a weight, half away from zero
pub(crate) fn scaled(weight: u32, fraction: f64) -> u32 {
    (weight as f64 * fraction).round() as u32
}

/// Percentage with two decimals
pub fn percentage(awarded: u32, possible: u32) -> f64 {
    if possible == 0 {
        return 0.0;
    }
    (awarded as f64 / possible as f64 * 10000.0).round() / 100.0
}

/// The scorer: a weight table plus the checks it applies
pub struct Rubric {
    weights: RubricWeights,
    checks: Vec<Box<dyn Check>>,
}

impl Default for Rubric {
    fn default() -> Self {
        Self::new(RubricWeights::default())
    }
}

impl Rubric {
    /// Rubric with the twelve built-in checks
    pub fn new(weights: RubricWeights) -> Self {
        Self::with_checks(weights, default_checks())
    }

    pub fn with_checks(weights: RubricWeights, checks: Vec<Box<dyn Check>>) -> Self {
        Self { weights, checks }
    }

    pub fn weights(&self) -> &RubricWeights {
        &self.weights
    }

    /// Score `facts` against every check
    pub fn score(&self, facts: &DocumentFacts) -> RubricReport {
        let mut results = IndexMap::with_capacity(self.checks.len());
        let mut total_awarded = 0u32;
        let mut total_possible = 0u32;

        for check in &self.checks {
            let key = check.key();
            let weight = self.weights.weight(key);
            let outcome = check.evaluate(facts, weight);
            let awarded = outcome.awarded.min(weight);

            debug!(check = %key, passed = outcome.passed, awarded, weight, "Rubric check");

            total_awarded = total_awarded.saturating_add(awarded);
            total_possible = total_possible.saturating_add(weight);

            results.insert(
                key,
                CheckResult {
                    key,
                    passed: outcome.passed,
                    awarded,
                    max: weight,
                    details: outcome.details,
                    advice: (!outcome.passed)
                        .then(|| check.advice().map(str::to_string))
                        .flatten(),
                    priority: check.priority(),
                },
            );
        }

        let mut suggestions: Vec<Suggestion> = results
            .values()
            .filter_map(|r: &CheckResult| {
                Some(Suggestion {
                    key: r.key.as_str().to_string(),
                    priority: r.priority,
                    advice: r.advice.clone()?,
                    example_fix: None,
                })
            })
            .collect();
        // sort_by is stable: ties keep check order
        suggestions.sort_by(|a, b| b.priority.weight().cmp(&a.priority.weight()));

        RubricReport {
            checks: results,
            total_awarded,
            total_possible,
            score: percentage(total_awarded, total_possible),
            suggestions,
        }
    }
}
