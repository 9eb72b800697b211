use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::atomic::write_atomic;
use crate::errors::{Result, TuneGraphError};
use crate::types::{FallbackPolicy, ResultFormat};

/// Name of the configuration file stored inside the `.tunegraph` directory.
pub const CONFIG_FILENAME: &str = "config.json";

/// Name of the persisted resolution cache inside the `.tunegraph` directory.
pub const CACHE_FILENAME: &str = "resolution_cache.json";

/// Name of the hidden directory used to store tunegraph state.
pub const TUNEGRAPH_DIR: &str = ".tunegraph";

/// Public Wikidata SPARQL endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://query.wikidata.org/sparql";

/// Configuration for a tunegraph project.
///
/// Controls the knowledge-service endpoint, matching thresholds, batching and
/// the graph namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuneGraphConfig {
    /// Schema version of the configuration.
    pub version: u32,
    /// SPARQL endpoint queried for candidates.
    pub endpoint: String,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
    /// Per-call timeout; an expired call counts as a failed query.
    pub request_timeout_ms: u64,
    /// Language tag for label matching.
    pub language: String,
    /// Entity kinds (Wikidata QIDs) accepted by the direct phase.
    pub direct_kinds: Vec<String>,
    /// Entity kind whose labels form the fuzzy-phase corpus.
    pub fuzzy_kind: String,
    /// Maximum number of direct-phase candidates.
    pub direct_limit: u32,
    /// Maximum number of labels fetched for the fuzzy phase.
    pub corpus_limit: u32,
    /// Minimum similarity (0-100) for a fuzzy match to be accepted.
    pub fuzzy_threshold: u8,
    /// Behavior when direct-phase candidates exist but none match the label.
    pub fallback_policy: FallbackPolicy,
    /// Number of records resolved per batch.
    pub batch_size: usize,
    /// Pause inserted between full batches.
    pub batch_delay_ms: u64,
    /// Encoding of the result store.
    pub result_format: ResultFormat,
    /// IRI bound to the `imkb:` prefix in the graph document.
    pub namespace: String,
    /// Whether resolutions are cached across runs.
    pub enable_cache: bool,
}

impl Default for TuneGraphConfig {
    fn default() -> Self {
        Self {
            version: 1,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: format!(
                "tunegraph/{} (playlist artist resolution)",
                env!("CARGO_PKG_VERSION")
            ),
            request_timeout_ms: 30_000,
            language: "en".to_string(),
            direct_kinds: vec![
                "Q5".to_string(),
                "Q215380".to_string(),
                "Q2088357".to_string(),
            ],
            fuzzy_kind: "Q5".to_string(),
            direct_limit: 5,
            corpus_limit: 100,
            fuzzy_threshold: 80,
            fallback_policy: FallbackPolicy::FirstCandidate,
            batch_size: 100,
            batch_delay_ms: 5_000,
            result_format: ResultFormat::Jsonl,
            namespace: "http://example.org/imkb/".to_string(),
            enable_cache: true,
        }
    }
}

impl TuneGraphConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    /// Checks that the configuration describes a runnable pipeline.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(config_error("endpoint must not be empty"));
        }
        if self.batch_size == 0 {
            return Err(config_error("batch_size must be at least 1"));
        }
        if self.direct_limit == 0 || self.corpus_limit == 0 {
            return Err(config_error("direct_limit and corpus_limit must be at least 1"));
        }
        if self.fuzzy_threshold > 100 {
            return Err(config_error(format!(
                "fuzzy_threshold must be between 0 and 100, got {}",
                self.fuzzy_threshold
            )));
        }
        if self.language.is_empty()
            || !self
                .language
                .chars()
                .all(|c| c.is_ascii_alphabetic() || c == '-')
        {
            return Err(config_error(format!(
                "language '{}' is not a valid language tag",
                self.language
            )));
        }
        if self.direct_kinds.is_empty() {
            return Err(config_error("direct_kinds must name at least one entity kind"));
        }
        for kind in self.direct_kinds.iter().chain(std::iter::once(&self.fuzzy_kind)) {
            if !is_entity_id(kind) {
                return Err(config_error(format!(
                    "entity kind '{}' is not a Wikidata item id",
                    kind
                )));
            }
        }
        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> TuneGraphError {
    TuneGraphError::Config {
        message: message.into(),
    }
}

/// Returns `true` for ids of the form `Q<digits>`.
fn is_entity_id(s: &str) -> bool {
    s.strip_prefix('Q')
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
}

/// Returns the path to the `.tunegraph` directory within the given project root.
pub fn get_tunegraph_dir(project_root: &Path) -> PathBuf {
    project_root.join(TUNEGRAPH_DIR)
}

/// Returns the path to the configuration file within the `.tunegraph` directory.
pub fn get_config_path(project_root: &Path) -> PathBuf {
    get_tunegraph_dir(project_root).join(CONFIG_FILENAME)
}

/// Returns the path to the persisted resolution cache.
pub fn get_cache_path(project_root: &Path) -> PathBuf {
    get_tunegraph_dir(project_root).join(CACHE_FILENAME)
}

/// Loads the configuration from disk.
///
/// If the configuration file does not exist, returns the default configuration.
/// Missing fields in an existing file take their default values.
pub fn load_config(project_root: &Path) -> Result<TuneGraphConfig> {
    let config_path = get_config_path(project_root);
    if !config_path.exists() {
        return Ok(TuneGraphConfig::default());
    }

    let contents = fs::read_to_string(&config_path).map_err(|e| {
        config_error(format!(
            "failed to read config file '{}': {e}",
            config_path.display()
        ))
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        config_error(format!(
            "failed to parse config file '{}': {e}",
            config_path.display()
        ))
    })
}

/// Saves the configuration to disk, replacing any previous file atomically.
pub fn save_config(project_root: &Path, config: &TuneGraphConfig) -> Result<()> {
    let config_path = get_config_path(project_root);
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| config_error(format!("failed to serialize config: {e}")))?;
    write_atomic(&config_path, json.as_bytes()).map_err(|e| {
        config_error(format!(
            "failed to write config file '{}': {e}",
            config_path.display()
        ))
    })
}
