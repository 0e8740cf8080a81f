//! Layered audit configuration
//!
//! Sources, lowest priority first:
//! 1. Built-in defaults
//! 2. User config (`~/.config/geo-audit/config.toml`)
//! 3. Project config (`geo-audit.toml` in the working directory, or `--config`)
//! 4. Environment variables
//! 5. CLI flags (applied by the caller)
//!
//! Example `geo-audit.toml`:
//!
//! ```toml
//! [scrape]
//! base_url = "https://api.firecrawl.dev/v1"
//! timeout_secs = 30
//!
//! [ai]
//! enabled = true
//! backend = "openai"
//! model = "gpt-4o-mini"
//! max_input_chars = 8000
//!
//! [crawl]
//! page_limit = 3
//!
//! [output]
//! dir = "audits"
//! html = false
//!
//! [rubric.weights]
//! title = 12
//! json_ld = 8
//! ```


use super::weights::RubricWeights;
use crate::ai::LlmBackend;
use crate::models::CheckKey;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Project config file looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = "geo-audit.toml";

pub const DEFAULT_SCRAPE_BASE_URL: &str = "https://api.firecrawl.dev/v1";
pub const DEFAULT_MAX_INPUT_CHARS: usize = 12_000;
pub const DEFAULT_PAGE_LIMIT: usize = 5;
pub const DEFAULT_OUT_DIR: &str = "reports";
/// Largest points a single rubric check may carry
pub const MAX_CHECK_WEIGHT: u32 = 1_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Fetch collaborator settings
#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    /// Scrape API credential; `None` falls back to direct HTTP fetching
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

/// Enrichment collaborator settings
#[derive(Debug, Clone)]
pub struct AiSettings {
    pub enabled: bool,
    pub backend: LlmBackend,
    pub model: Option<String>,
    /// Explicit credential; otherwise the backend's env var is consulted
    pub api_key: Option<String>,
    /// Cap on the HTML excerpt sent as context
    pub max_input_chars: usize,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct OutputSettings {
    pub dir: PathBuf,
    pub json: bool,
    pub html: bool,
}

/// Fully resolved configuration for one run
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub scrape: ScrapeSettings,
    pub ai: AiSettings,
    pub page_limit: usize,
    pub output: OutputSettings,
    /// Overrides the mode-dependent entity cap when set
    pub entity_cap: Option<usize>,
    pub weights: RubricWeights,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            scrape: ScrapeSettings {
                api_key: None,
                base_url: DEFAULT_SCRAPE_BASE_URL.to_string(),
                timeout: Duration::from_secs(30),
            },
            ai: AiSettings {
                enabled: true,
                backend: LlmBackend::default(),
                model: None,
                api_key: None,
                max_input_chars: DEFAULT_MAX_INPUT_CHARS,
                timeout: Duration::from_secs(90),
            },
            page_limit: DEFAULT_PAGE_LIMIT,
            output: OutputSettings {
                dir: PathBuf::from(DEFAULT_OUT_DIR),
                json: true,
                html: true,
            },
            entity_cap: None,
            weights: RubricWeights::default(),
        }
    }
}

/// On-disk shape of a config file. Every field is optional so files only
/// need to mention what they change.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub scrape: ScrapeSection,
    #[serde(default)]
    pub ai: AiSection,
    #[serde(default)]
    pub crawl: CrawlSection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub metrics: MetricsSection,
    #[serde(default)]
    pub rubric: RubricSection,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ScrapeSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AiSection {
    pub enabled: Option<bool>,
    pub backend: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub max_input_chars: Option<usize>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CrawlSection {
    pub page_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OutputSection {
    pub dir: Option<PathBuf>,
    pub json: Option<bool>,
    pub html: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MetricsSection {
    pub entity_cap: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RubricSection {
    /// Check key (`title`, `json_ld`, ...) to points
    #[serde(default)]
    pub weights: IndexMap<String, u32>,
}

impl ConfigFile {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl AuditConfig {
    /// Load every layer except CLI flags.
    ///
    /// An explicit `config_path` must exist and parse. The implicit user and
    /// project files are optional; a broken one is logged and skipped.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = AuditConfig::default();

        if let Some(user_path) = Self::user_config_path().filter(|p| p.exists()) {
            config.merge_optional(&user_path)?;
        }

        match config_path {
            Some(path) => {
                let file = ConfigFile::from_path(path)?;
                debug!("Loaded config from {}", path.display());
                config.merge(file)?;
            }
            None => {
                let project_path = PathBuf::from(PROJECT_CONFIG_FILE);
                if project_path.exists() {
                    config.merge_optional(&project_path)?;
                } else {
                    debug!("No project config found, using defaults");
                }
            }
        }

        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("geo-audit").join("config.toml"))
    }

    fn merge_optional(&mut self, path: &Path) -> Result<(), ConfigError> {
        match ConfigFile::from_path(path) {
            Ok(file) => {
                debug!("Loaded config from {}", path.display());
                self.merge(file)
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
                Ok(())
            }
        }
    }

    /// Merge a config file into this config (file values take priority)
    pub fn merge(&mut self, file: ConfigFile) -> Result<(), ConfigError> {
        let ConfigFile {
            scrape,
            ai,
            crawl,
            output,
            metrics,
            rubric,
        } = file;

        if scrape.api_key.is_some() {
            self.scrape.api_key = scrape.api_key;
        }
        if let Some(base_url) = scrape.base_url {
            self.scrape.base_url = base_url;
        }
        if let Some(secs) = scrape.timeout_secs {
            self.scrape.timeout = Duration::from_secs(secs);
        }

        if let Some(enabled) = ai.enabled {
            self.ai.enabled = enabled;
        }
        if let Some(backend) = ai.backend {
            self.ai.backend = parse_backend(&backend)?;
        }
        if ai.model.is_some() {
            self.ai.model = ai.model;
        }
        if ai.api_key.is_some() {
            self.ai.api_key = ai.api_key;
        }
        if let Some(max) = ai.max_input_chars {
            self.ai.max_input_chars = max;
        }
        if let Some(secs) = ai.timeout_secs {
            self.ai.timeout = Duration::from_secs(secs);
        }

        if let Some(limit) = crawl.page_limit {
            self.set_page_limit(limit)?;
        }

        if let Some(dir) = output.dir {
            self.output.dir = dir;
        }
        if let Some(json) = output.json {
            self.output.json = json;
        }
        if let Some(html) = output.html {
            self.output.html = html;
        }

        if metrics.entity_cap.is_some() {
            self.entity_cap = metrics.entity_cap;
        }

        for (name, points) in rubric.weights {
            let key: CheckKey = name.parse().map_err(|message| ConfigError::InvalidValue {
                key: format!("rubric.weights.{}", name),
                message,
            })?;
            if points > MAX_CHECK_WEIGHT {
                return Err(ConfigError::InvalidValue {
                    key: format!("rubric.weights.{}", name),
                    message: format!("{} exceeds the maximum of {}", points, MAX_CHECK_WEIGHT),
                });
            }
            self.weights.set(key, points);
        }

        Ok(())
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`)
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = lookup("SCRAPE_API_KEY") {
            self.scrape.api_key = Some(key);
        }
        if let Some(url) = lookup("SCRAPE_API_URL") {
            self.scrape.base_url = url;
        }
        if let Some(max) = lookup("GEO_AUDIT_AI_MAX_CHARS") {
            self.ai.max_input_chars = max.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "GEO_AUDIT_AI_MAX_CHARS".to_string(),
                message: format!("expected a character count, got '{}'", max),
            })?;
        }
        if self.ai.backend.requires_api_key() {
            if let Some(key) = lookup(self.ai.backend.env_key()) {
                self.ai.api_key = Some(key);
            }
        }
        Ok(())
    }

    pub fn set_page_limit(&mut self, limit: usize) -> Result<(), ConfigError> {
        if limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "page_limit".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        self.page_limit = limit;
        Ok(())
    }

    /// True when the enrichment collaborator can be called at all
    pub fn has_ai_credential(&self) -> bool {
        !self.ai.backend.requires_api_key() || self.ai.api_key.is_some()
    }
}

fn parse_backend(name: &str) -> Result<LlmBackend, ConfigError> {
    name.parse()
        .map_err(|message| ConfigError::InvalidValue {
            key: "ai.backend".to_string(),
            message,
        })
}
