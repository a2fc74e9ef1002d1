//! Application configuration for the corpus builder.
//!
//! User config lives at `~/.aozora-corpus/aozora-corpus.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CorpusError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "aozora-corpus.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".aozora-corpus";

// ---------------------------------------------------------------------------
// Config structs (matching aozora-corpus.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Corpus database location.
    #[serde(default)]
    pub storage: StorageSection,

    /// Upstream archive retrieval.
    #[serde(default)]
    pub fetch: FetchSection,

    /// Extraction and aggregation limits.
    #[serde(default)]
    pub extraction: ExtractionSection,

    /// Optional catalog override.
    #[serde(default)]
    pub catalog: CatalogSection,
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSection {
    /// Path to the libSQL database file.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "var/corpus.db".into()
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSection {
    /// Compressed archive URL with `{author_id}` and `{work_id}` placeholders.
    #[serde(default = "default_archive_url")]
    pub archive_url: String,

    /// Plain-text fallback URL with the same placeholders.
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            archive_url: default_archive_url(),
            fallback_url: default_fallback_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_archive_url() -> String {
    "https://www.aozora.gr.jp/cards/{author_id}/files/{work_id}_ruby.zip".into()
}
fn default_fallback_url() -> String {
    "https://www.aozora.gr.jp/cards/{author_id}/files/{work_id}.txt".into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[extraction]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSection {
    /// Maximum instances a single keyword contributes per work.
    #[serde(default = "default_keyword_cap")]
    pub keyword_cap: usize,

    /// Number of leading sentence units scanned for templates.
    #[serde(default = "default_max_sentences")]
    pub max_sentences: usize,

    /// Templates accepted per work before scanning stops.
    #[serde(default = "default_templates_per_work")]
    pub templates_per_work: usize,

    /// Distinct words kept per genre and slot.
    #[serde(default = "default_top_words")]
    pub top_words: usize,

    /// Frequency that maps to weight 1.0.
    #[serde(default = "default_weight_divisor")]
    pub weight_divisor: f64,

    /// Templates kept per genre.
    #[serde(default = "default_templates_per_genre")]
    pub templates_per_genre: usize,

    /// Phrases kept per genre.
    #[serde(default = "default_phrases_per_genre")]
    pub phrases_per_genre: usize,

    /// `template_type` recorded for extracted templates.
    #[serde(default = "default_template_type")]
    pub template_type: String,
}

impl Default for ExtractionSection {
    fn default() -> Self {
        Self {
            keyword_cap: default_keyword_cap(),
            max_sentences: default_max_sentences(),
            templates_per_work: default_templates_per_work(),
            top_words: default_top_words(),
            weight_divisor: default_weight_divisor(),
            templates_per_genre: default_templates_per_genre(),
            phrases_per_genre: default_phrases_per_genre(),
            template_type: default_template_type(),
        }
    }
}

fn default_keyword_cap() -> usize {
    3
}
fn default_max_sentences() -> usize {
    100
}
fn default_templates_per_work() -> usize {
    5
}
fn default_top_words() -> usize {
    20
}
fn default_weight_divisor() -> f64 {
    10.0
}
fn default_templates_per_genre() -> usize {
    5
}
fn default_phrases_per_genre() -> usize {
    10
}
fn default_template_type() -> String {
    "auto_extracted".into()
}

/// `[catalog]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSection {
    /// TOML catalog replacing the built-in works and genre patterns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

// ---------------------------------------------------------------------------
// Runtime configs (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime fetch configuration.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub archive_url: String,
    pub fallback_url: String,
    pub timeout_secs: u64,
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            archive_url: config.fetch.archive_url.clone(),
            fallback_url: config.fetch.fallback_url.clone(),
            timeout_secs: config.fetch.timeout_secs,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Runtime extraction and aggregation limits.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub keyword_cap: usize,
    pub max_sentences: usize,
    pub templates_per_work: usize,
    pub top_words: usize,
    pub weight_divisor: f64,
    pub templates_per_genre: usize,
    pub phrases_per_genre: usize,
    pub template_type: String,
}

impl From<&AppConfig> for ExtractionConfig {
    fn from(config: &AppConfig) -> Self {
        let e = &config.extraction;
        Self {
            keyword_cap: e.keyword_cap,
            max_sentences: e.max_sentences,
            templates_per_work: e.templates_per_work,
            top_words: e.top_words,
            weight_divisor: e.weight_divisor,
            templates_per_genre: e.templates_per_genre,
            phrases_per_genre: e.phrases_per_genre,
            template_type: e.template_type.clone(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.aozora-corpus/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| CorpusError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.aozora-corpus/aozora-corpus.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CorpusError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| CorpusError::config(format!("failed to parse {}: {e}", path.display())))?;
    validate_config(&config)?;
    Ok(config)
}

/// Reject limits that would make extraction meaningless.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.extraction.weight_divisor <= 0.0 {
        return Err(CorpusError::config("extraction.weight_divisor must be positive"));
    }
    if config.fetch.timeout_secs == 0 {
        return Err(CorpusError::config("fetch.timeout_secs must be at least 1"));
    }
    for (name, url) in [
        ("fetch.archive_url", &config.fetch.archive_url),
        ("fetch.fallback_url", &config.fetch.fallback_url),
    ] {
        if !url.contains("{work_id}") {
            return Err(CorpusError::config(format!(
                "{name} must contain a {{work_id}} placeholder"
            )));
        }
    }
    Ok(())
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| CorpusError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| CorpusError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| CorpusError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("db_path"));
        assert!(toml_str.contains("_ruby.zip"));
        assert!(toml_str.contains("auto_extracted"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.extraction.keyword_cap, 3);
        assert_eq!(parsed.fetch.timeout_secs, 30);
        assert!(parsed.catalog.path.is_none());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[extraction]
top_words = 5

[catalog]
path = "/tmp/catalog.toml"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.extraction.top_words, 5);
        assert_eq!(config.extraction.max_sentences, 100);
        assert_eq!(config.catalog.path.as_deref(), Some("/tmp/catalog.toml"));
        assert_eq!(config.storage.db_path, "var/corpus.db");
    }

    #[test]
    fn runtime_configs_from_app_config() {
        let app = AppConfig::default();
        let fetch = FetchConfig::from(&app);
        assert_eq!(fetch.timeout_secs, 30);
        let extraction = ExtractionConfig::from(&app);
        assert_eq!(extraction.templates_per_work, 5);
        assert_eq!(extraction.templates_per_genre, 5);
        assert_eq!(extraction.phrases_per_genre, 10);
        assert_eq!(extraction.top_words, 20);
    }

    #[test]
    fn validation_rejects_bad_limits() {
        let mut config = AppConfig::default();
        assert!(validate_config(&config).is_ok());

        config.extraction.weight_divisor = 0.0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.fetch.fallback_url = "https://example.com/static.txt".into();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("fetch.fallback_url"));
    }

    #[test]
    fn load_config_from_missing_file_is_io_error() {
        let result = load_config_from(Path::new("/nonexistent/aozora-corpus.toml"));
        assert!(matches!(result, Err(CorpusError::Io { .. })));
    }
}
