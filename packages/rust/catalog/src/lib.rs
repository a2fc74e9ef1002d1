//! Work catalog and per-genre pattern catalog.
//!
//! The catalog is an immutable value loaded once at startup and passed
//! explicitly to the fetcher and extractors. A built-in catalog is compiled
//! into the binary; a TOML file with the same layout can replace it.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use aozora_shared::{CorpusError, DEFAULT_GENRE, Result, SlotType, Work};

/// Source of the built-in catalog.
const BUILTIN_CATALOG: &str = include_str!("../builtin.toml");

static BUILTIN: LazyLock<Catalog> = LazyLock::new(|| {
    Catalog::from_toml_str(BUILTIN_CATALOG).expect("built-in catalog is valid")
});

// ---------------------------------------------------------------------------
// File format
// ---------------------------------------------------------------------------

/// On-disk catalog layout: `[[works]]` plus `[genres.<name>]` tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub works: Vec<Work>,
    #[serde(default)]
    pub genres: BTreeMap<String, GenrePatterns>,
}

/// Uncompiled patterns for one genre.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenrePatterns {
    /// Keyword literals per slot.
    #[serde(default)]
    pub slots: SlotKeywords,
    /// Sentence-matching regular expressions, tried in order.
    #[serde(default)]
    pub templates: Vec<String>,
    /// Literal phrases.
    #[serde(default)]
    pub phrases: Vec<String>,
}

/// Ordered keyword lists, one per slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotKeywords {
    #[serde(default)]
    pub agent: Vec<String>,
    #[serde(default)]
    pub location: Vec<String>,
    #[serde(default)]
    pub discovery: Vec<String>,
    #[serde(default)]
    pub action: Vec<String>,
    #[serde(default)]
    pub emotion: Vec<String>,
}

impl SlotKeywords {
    /// Keywords for one slot.
    pub fn get(&self, slot: SlotType) -> &[String] {
        match slot {
            SlotType::Agent => &self.agent,
            SlotType::Location => &self.location,
            SlotType::Discovery => &self.discovery,
            SlotType::Action => &self.action,
            SlotType::Emotion => &self.emotion,
        }
    }
}

// ---------------------------------------------------------------------------
// Compiled catalog
// ---------------------------------------------------------------------------

/// Compiled, validated patterns for one genre.
#[derive(Debug, Clone)]
pub struct GenreCatalog {
    slots: SlotKeywords,
    templates: Vec<Regex>,
    phrases: Vec<String>,
}

impl GenreCatalog {
    fn compile(genre: &str, patterns: GenrePatterns) -> Result<Self> {
        for slot in SlotType::ALL {
            let mut seen = HashSet::new();
            for keyword in patterns.slots.get(slot) {
                if keyword.is_empty() {
                    return Err(CorpusError::config(format!(
                        "genre '{genre}': empty keyword in slot '{slot}'"
                    )));
                }
                if !seen.insert(keyword.as_str()) {
                    return Err(CorpusError::config(format!(
                        "genre '{genre}': keyword '{keyword}' repeated in slot '{slot}'"
                    )));
                }
            }
        }

        if patterns.phrases.iter().any(String::is_empty) {
            return Err(CorpusError::config(format!("genre '{genre}': empty phrase")));
        }

        let templates = patterns
            .templates
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    CorpusError::config(format!("genre '{genre}': invalid pattern '{p}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            slots: patterns.slots,
            templates,
            phrases: patterns.phrases,
        })
    }

    /// Keywords for `slot`, in catalog order.
    pub fn keywords(&self, slot: SlotType) -> &[String] {
        self.slots.get(slot)
    }

    /// Sentence patterns in catalog order.
    pub fn templates(&self) -> &[Regex] {
        &self.templates
    }

    /// Literal phrases in catalog order.
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

/// Per-genre patterns with fallback to the default genre.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    genres: BTreeMap<String, GenreCatalog>,
}

impl PatternCatalog {
    /// Compile and validate raw genre patterns.
    pub fn compile(genres: BTreeMap<String, GenrePatterns>) -> Result<Self> {
        if !genres.contains_key(DEFAULT_GENRE) {
            return Err(CorpusError::config(format!(
                "catalog has no '{DEFAULT_GENRE}' genre to fall back on"
            )));
        }

        let genres = genres
            .into_iter()
            .map(|(name, patterns)| {
                let compiled = GenreCatalog::compile(&name, patterns)?;
                Ok((name, compiled))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(Self { genres })
    }

    /// Patterns for `genre`, or the default genre's when unknown.
    pub fn genre(&self, genre: &str) -> &GenreCatalog {
        self.genres
            .get(genre)
            .or_else(|| self.genres.get(DEFAULT_GENRE))
            .expect("default genre checked at compile time")
    }

    /// Whether `genre` has its own entry.
    pub fn contains(&self, genre: &str) -> bool {
        self.genres.contains_key(genre)
    }

    /// Genre names in lexical order.
    pub fn genre_names(&self) -> impl Iterator<Item = &str> {
        self.genres.keys().map(String::as_str)
    }
}

/// Works plus their extraction patterns.
#[derive(Debug, Clone)]
pub struct Catalog {
    works: Vec<Work>,
    patterns: PatternCatalog,
}

impl Catalog {
    /// The catalog compiled into the binary.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Load a catalog file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CorpusError::io(path, e))?;
        let catalog = Self::from_toml_str(&content).map_err(|e| match e {
            CorpusError::Config { message } => {
                CorpusError::config(format!("{}: {message}", path.display()))
            }
            other => other,
        })?;
        info!(
            path = %path.display(),
            works = catalog.works.len(),
            genres = catalog.patterns.genres.len(),
            "loaded catalog"
        );
        Ok(catalog)
    }

    /// Load from `path` if given, otherwise use the built-in catalog.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                debug!("using built-in catalog");
                Ok(Self::builtin())
            }
        }
    }

    /// Parse and validate a catalog from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)
            .map_err(|e| CorpusError::config(format!("failed to parse catalog: {e}")))?;
        Self::from_file(file)
    }

    /// Validate a parsed catalog file.
    pub fn from_file(file: CatalogFile) -> Result<Self> {
        let mut ids = HashSet::new();
        for work in &file.works {
            if !ids.insert(work.id.as_str()) {
                return Err(CorpusError::config(format!(
                    "work id '{}' listed more than once",
                    work.id
                )));
            }
        }

        Ok(Self {
            works: file.works,
            patterns: PatternCatalog::compile(file.genres)?,
        })
    }

    /// All works, in catalog order.
    pub fn works(&self) -> &[Work] {
        &self.works
    }

    /// Look a work up by identifier.
    pub fn work(&self, id: &str) -> Option<&Work> {
        self.works.iter().find(|w| w.id == id)
    }

    /// Works matching the optional genre and id filters (empty filter = all).
    pub fn select_works(&self, genres: &[String], ids: &[String]) -> Vec<Work> {
        self.works
            .iter()
            .filter(|w| genres.is_empty() || genres.contains(&w.genre))
            .filter(|w| ids.is_empty() || ids.contains(&w.id))
            .cloned()
            .collect()
    }

    /// The genre pattern catalog.
    pub fn patterns(&self) -> &PatternCatalog {
        &self.patterns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.works().len(), 17);

        let genres: Vec<&str> = catalog.patterns().genre_names().collect();
        assert_eq!(genres, ["comedy", "horror", "neutral", "romance", "scifi"]);

        let work = catalog.work("482").expect("work 482");
        assert_eq!(work.genre, "horror");
        assert_eq!(work.author_id.as_deref(), Some("001779"));
    }

    #[test]
    fn every_builtin_work_has_author_id() {
        for work in Catalog::builtin().works() {
            assert!(work.author_id.is_some(), "work {} lacks author id", work.id);
        }
    }

    #[test]
    fn unknown_genre_falls_back_to_neutral() {
        let catalog = Catalog::builtin();
        let patterns = catalog.patterns();
        assert!(!patterns.contains("mystery"));

        let fallback = patterns.genre("mystery");
        let neutral = patterns.genre("neutral");
        assert_eq!(fallback.phrases(), neutral.phrases());
        assert_eq!(fallback.keywords(SlotType::Agent), neutral.keywords(SlotType::Agent));
    }

    #[test]
    fn keywords_keep_catalog_order() {
        let catalog = Catalog::builtin();
        let horror = catalog.patterns().genre("horror");
        assert_eq!(horror.keywords(SlotType::Agent)[0], "幽霊");
        assert_eq!(horror.keywords(SlotType::Agent)[1], "影");
        assert_eq!(horror.templates().len(), 4);
        assert!(horror.templates()[0].is_match("影が墓地で血を見つけた"));
    }

    #[test]
    fn missing_default_genre_rejected() {
        let toml_str = r#"
[genres.horror]
phrases = ["闇の中"]
"#;
        let err = Catalog::from_toml_str(toml_str).unwrap_err();
        assert!(err.to_string().contains("neutral"));
    }

    #[test]
    fn invalid_regex_rejected() {
        let toml_str = r#"
[genres.neutral]
templates = ['(.+は']
"#;
        let err = Catalog::from_toml_str(toml_str).unwrap_err();
        assert!(err.to_string().contains("invalid pattern"));
    }

    #[test]
    fn repeated_keyword_rejected() {
        let toml_str = r#"
[genres.neutral.slots]
emotion = ["恐怖", "不安", "恐怖"]
"#;
        let err = Catalog::from_toml_str(toml_str).unwrap_err();
        assert!(err.to_string().contains("repeated"));
    }

    #[test]
    fn empty_keyword_rejected() {
        let toml_str = r#"
[genres.neutral.slots]
agent = [""]
"#;
        assert!(Catalog::from_toml_str(toml_str).is_err());
    }

    #[test]
    fn duplicate_work_id_rejected() {
        let toml_str = r#"
[[works]]
id = "1"
title = "a"
author = "x"
genre = "neutral"

[[works]]
id = "1"
title = "b"
author = "y"
genre = "neutral"

[genres.neutral]
"#;
        let err = Catalog::from_toml_str(toml_str).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn select_works_filters() {
        let catalog = Catalog::builtin();
        let horror = catalog.select_works(&["horror".into()], &[]);
        assert_eq!(horror.len(), 4);

        let one = catalog.select_works(&[], &["275".into()]);
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].title, "走れメロス");

        let none = catalog.select_works(&["horror".into()], &["275".into()]);
        assert!(none.is_empty());

        assert_eq!(catalog.select_works(&[], &[]).len(), 17);
    }

    #[test]
    fn catalog_fixture_loads() {
        let catalog = Catalog::load(Path::new("../../../fixtures/catalog/catalog.fixture.toml"))
            .expect("load fixture catalog");
        assert_eq!(catalog.works().len(), 2);
        assert!(catalog.patterns().contains("mystery"));
        assert_eq!(
            catalog.patterns().genre("mystery").keywords(SlotType::Agent),
            ["探偵"]
        );
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let result = Catalog::load(Path::new("/nonexistent/catalog.toml"));
        assert!(matches!(result, Err(CorpusError::Io { .. })));
    }
}
