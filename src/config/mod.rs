//! Configuration for geo-audit
//!
//! This module handles:
//! - Layered run configuration (defaults, config files, environment)
//! - Rubric weight overrides

mod audit_config;
mod weights;

pub use audit_config::{
    AiSettings,
    AuditConfig,
    ConfigError,
    ConfigFile,
    OutputSettings,
    ScrapeSettings,
    DEFAULT_MAX_INPUT_CHARS,
    DEFAULT_OUT_DIR,
    DEFAULT_PAGE_LIMIT,
    MAX_CHECK_WEIGHT,
    PROJECT_CONFIG_FILE,
};
pub use weights::{default_weight, RubricWeights};
