//! Core domain types for the genre corpus.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CorpusError;

/// Genre whose catalog entry is used when a work's genre is unknown.
pub const DEFAULT_GENRE: &str = "neutral";

// ---------------------------------------------------------------------------
// SlotType
// ---------------------------------------------------------------------------

/// Semantic role a word can fill in a sentence template.
///
/// The declaration order is the iteration order everywhere slots are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotType {
    Agent,
    Location,
    Discovery,
    Action,
    Emotion,
}

impl SlotType {
    /// All slot types in canonical order.
    pub const ALL: [SlotType; 5] = [
        SlotType::Agent,
        SlotType::Location,
        SlotType::Discovery,
        SlotType::Action,
        SlotType::Emotion,
    ];

    /// Stored / rendered name of the slot.
    pub fn as_str(self) -> &'static str {
        match self {
            SlotType::Agent => "agent",
            SlotType::Location => "location",
            SlotType::Discovery => "discovery",
            SlotType::Action => "action",
            SlotType::Emotion => "emotion",
        }
    }

    /// Template placeholder for this slot, e.g. `{agent}`.
    pub fn placeholder(self) -> String {
        format!("{{{}}}", self.as_str())
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotType {
    type Err = CorpusError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        SlotType::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| CorpusError::validation(format!("unknown slot type '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Work
// ---------------------------------------------------------------------------

/// A cataloged source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Work {
    /// Upstream work identifier (e.g. `"482"`).
    pub id: String,
    /// Work title.
    pub title: String,
    /// Author display name.
    pub author: String,
    /// Genre the work's extracted assets are filed under.
    pub genre: String,
    /// Upstream author identifier used to build retrieval URLs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Derived entities
// ---------------------------------------------------------------------------

/// A weighted word for one genre and slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotWord {
    pub genre: String,
    pub slot_type: SlotType,
    pub word: String,
    /// Normalized salience in `[0.0, 1.0]`.
    pub weight: f64,
}

impl SlotWord {
    /// Build a slot word, rejecting weights outside `[0.0, 1.0]`.
    pub fn new(
        genre: impl Into<String>,
        slot_type: SlotType,
        word: impl Into<String>,
        weight: f64,
    ) -> crate::Result<Self> {
        if !(0.0..=1.0).contains(&weight) {
            return Err(CorpusError::validation(format!(
                "weight {weight} outside [0.0, 1.0]"
            )));
        }
        Ok(Self {
            genre: genre.into(),
            slot_type,
            word: word.into(),
            weight,
        })
    }
}

/// A sentence skeleton containing `{slot}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceTemplate {
    pub template_type: String,
    pub template: String,
    /// Informational only; not part of the uniqueness key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
}

/// A literal phrase fragment characteristic of a genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhrasePattern {
    pub genre: String,
    pub phrase: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_type_roundtrip() {
        for slot in SlotType::ALL {
            let parsed: SlotType = slot.as_str().parse().expect("parse slot");
            assert_eq!(parsed, slot);
        }
        assert!("villain".parse::<SlotType>().is_err());
    }

    #[test]
    fn slot_type_placeholder() {
        assert_eq!(SlotType::Discovery.placeholder(), "{discovery}");
    }

    #[test]
    fn slot_type_serde_is_lowercase() {
        let json = serde_json::to_string(&SlotType::Emotion).expect("serialize");
        assert_eq!(json, "\"emotion\"");
    }

    #[test]
    fn slot_word_rejects_out_of_range_weight() {
        assert!(SlotWord::new("horror", SlotType::Agent, "影", 0.2).is_ok());
        assert!(SlotWord::new("horror", SlotType::Agent, "影", 1.0).is_ok());
        assert!(SlotWord::new("horror", SlotType::Agent, "影", 1.01).is_err());
        assert!(SlotWord::new("horror", SlotType::Agent, "影", -0.1).is_err());
    }

    #[test]
    fn work_deserializes_without_author_id() {
        let work: Work = toml::from_str(
            r#"
id = "1"
title = "t"
author = "a"
genre = "horror"
"#,
        )
        .expect("parse work");
        assert_eq!(work.author_id, None);
    }
}
