//! Heuristic content metrics
//!
//! Scalar signals computed next to the rubric from the same facts:
//! readability, entity candidates and the local-relevance (GEO) score.
//! Everything here is a pure function of [`DocumentFacts`].

pub mod entities;
pub mod geo;
pub mod readability;

use crate::extract::DocumentFacts;
use crate::models::HeuristicMetrics;

/// Entity candidates kept in single-page reports
pub const SINGLE_PAGE_ENTITY_CAP: usize = 5;
/// Entity candidates kept in multi-page reports
pub const MULTI_PAGE_ENTITY_CAP: usize = 10;

/// Compute every heuristic metric. `entity_cap` only limits what is
/// reported; density and locality use the full candidate list.
pub fn compute(facts: &DocumentFacts, entity_cap: usize) -> HeuristicMetrics {
    let all_entities = entities::candidates(&facts.body_text);
    let geo = geo::score(facts, &all_entities);

    HeuristicMetrics {
        readability: readability::analyze(&facts.body_text, facts.paragraph_count),
        entities: all_entities.into_iter().take(entity_cap).collect(),
        geo,
    }
}
