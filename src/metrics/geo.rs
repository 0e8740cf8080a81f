//! Composite local-relevance ("GEO") score
//!
//! | signal | points |
//! |---|---|
//! | local-business schema / any structured data | 30 / 15 |
//! | address: from schema / locality keyword in entities | 15 / 6 |
//! | phone-like text | 15 |
//! | coordinate-like text | 10 |
//! | geo meta tag | 5 |
//! | alternate-language links | 10 |
//! | entity density: >= 3 / >= 1 distinct | 10 / 4 |
//! | combined: >= 2 / exactly 1 of {training file, hreflang, structured data} | 5 / 2 |
//!
//! The sum is clamped to 0..=100.

use super::entities;
use crate::extract::DocumentFacts;
use crate::models::GeoScoreBreakdown;

pub fn score(facts: &DocumentFacts, entity_candidates: &[String]) -> GeoScoreBreakdown {
    let local_schema = facts.has_local_business_schema();
    let any_schema = !facts.structured_data.is_empty();
    let hreflang = !facts.alternate_links.is_empty();

    let schema = if local_schema {
        30
    } else if any_schema {
        15
    } else {
        0
    };

    let address = if local_schema {
        15
    } else if entities::mentions_locality(entity_candidates) {
        6
    } else {
        0
    };

    let entity_density = match entity_candidates.len() {
        n if n >= 3 => 10,
        n if n >= 1 => 4,
        _ => 0,
    };

    let combined = [!facts.training_file_links.is_empty(), hreflang, any_schema]
        .iter()
        .filter(|present| **present)
        .count();
    let combined_signals = match combined {
        n if n >= 2 => 5,
        1 => 2,
        _ => 0,
    };

    let mut breakdown = GeoScoreBreakdown {
        schema,
        address,
        phone: if facts.phones.is_empty() { 0 } else { 15 },
        coordinates: if facts.coordinates.is_empty() { 0 } else { 10 },
        geo_meta: if facts.has_geo_meta() { 5 } else { 0 },
        hreflang: if hreflang { 10 } else { 0 },
        entity_density,
        combined_signals,
        total: 0,
    };
    let sum = breakdown.schema
        + breakdown.address
        + breakdown.phone
        + breakdown.coordinates
        + breakdown.geo_meta
        + breakdown.hreflang
        + breakdown.entity_density
        + breakdown.combined_signals;
    breakdown.total = sum.min(100);
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_facts;

    #[test]
    fn test_empty_document_scores_zero() {
        let b = score(&DocumentFacts::default(), &[]);
        assert_eq!(b, GeoScoreBreakdown::default());
    }

    #[test]
    fn test_fully_local_page_caps_at_100() {
        let facts = extract_facts(
            r#"<html><head>
            <meta name="geo.position" content="40.7;-74.0">
            <link rel="alternate" hreflang="es" href="/es/">
            <script type="application/ld+json">{"@type":"LocalBusiness","address":"1 Main St"}</script>
            </head><body>
            <p>Visit Joe Bakery on Main Street in Brooklyn. Call 212-555-0100. 40.7128, -74.0060</p>
            <a href="/llms.txt">llms</a>
            </body></html>"#,
        );
        let candidates = entities::candidates(&facts.body_text);
        let b = score(&facts, &candidates);
        assert_eq!(b.schema, 30);
        assert_eq!(b.address, 15);
        assert_eq!(b.phone, 15);
        assert_eq!(b.coordinates, 10);
        assert_eq!(b.geo_meta, 5);
        assert_eq!(b.hreflang, 10);
        assert_eq!(b.entity_density, 10);
        assert_eq!(b.combined_signals, 5);
        assert_eq!(b.total, 100);
    }

    #[test]
    fn test_generic_schema_and_locality_keyword() {
        let facts = extract_facts(
            r#"<script type="application/ld+json">{"@type":"Article"}</script>
            <p>Find us on Elm Street.</p>"#,
        );
        let candidates = entities::candidates(&facts.body_text);
        let b = score(&facts, &candidates);
        assert_eq!(b.schema, 15);
        assert_eq!(b.address, 6);
        assert_eq!(b.entity_density, 4);
        assert_eq!(b.combined_signals, 2);
        assert_eq!(b.total, 15 + 6 + 4 + 2);
    }

    #[test]
    fn test_total_always_within_bounds() {
        for html in ["", "<p>x</p>", "<h1>Big City Downtown Plaza</h1>"] {
            let facts = extract_facts(html);
            let b = score(&facts, &entities::candidates(&facts.body_text));
            assert!(b.total <= 100);
        }
    }
}
