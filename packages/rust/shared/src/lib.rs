//! Shared types, error model, and configuration for the Aozora corpus builder.
//!
//! This crate is the foundation depended on by all other workspace crates.
//! It provides:
//! - [`CorpusError`]: the unified error type
//! - Domain types ([`Work`], [`SlotType`], [`SlotWord`], [`SentenceTemplate`], [`PhrasePattern`])
//! - The [`CorpusRepository`] persistence contract
//! - Configuration ([`AppConfig`], [`FetchConfig`], [`ExtractionConfig`], config loading)

pub mod config;
pub mod error;
pub mod repository;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CatalogSection, ExtractionConfig, ExtractionSection, FetchConfig, FetchSection,
    StorageSection, config_dir, config_file_path, init_config, load_config, load_config_from,
    validate_config,
};
pub use error::{CorpusError, Result};
pub use repository::CorpusRepository;
pub use types::{DEFAULT_GENRE, PhrasePattern, SentenceTemplate, SlotType, SlotWord, Work};
