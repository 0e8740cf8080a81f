//! geo-audit - SEO/GEO readiness audit for web pages
//!
//! Extracts signals from an HTML document, scores them against a fixed
//! rubric, computes readability and local-relevance heuristics, and
//! assembles a report. Fetching and the optional LLM review are the only
//! parts that touch the network.

pub mod ai;
pub mod cli;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod reporters;
pub mod rubric;
