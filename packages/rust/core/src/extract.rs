//! Per-work extractors: slot words, sentence templates, stylistic phrases.
//!
//! All three are pure functions of the normalized text and the genre's
//! catalog entry. They never fail; a text with no matches yields empty
//! results.

use std::collections::BTreeMap;

use regex::NoExpand;

use aozora_catalog::GenreCatalog;
use aozora_shared::{ExtractionConfig, SlotType};

/// Replacement written over every match of a template pattern:
/// `{agent}が{location}で{discovery}を見つけた`.
pub fn template_skeleton() -> String {
    format!(
        "{}が{}で{}を見つけた",
        SlotType::Agent.placeholder(),
        SlotType::Location.placeholder(),
        SlotType::Discovery.placeholder()
    )
}

/// Sentence terminator used to split body text.
const SENTENCE_END: char = '。';

/// Everything extracted from one work.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkExtraction {
    /// Per slot, the keyword occurrences (each keyword repeated up to the cap).
    pub words: BTreeMap<SlotType, Vec<String>>,
    /// Distinct templates in discovery order.
    pub templates: Vec<String>,
    /// Catalog phrases present in the text, in catalog order.
    pub phrases: Vec<String>,
}

impl WorkExtraction {
    /// Run all extractors over `text`.
    pub fn from_text(text: &str, catalog: &GenreCatalog, config: &ExtractionConfig) -> Self {
        Self {
            words: extract_slot_words(text, catalog, config.keyword_cap),
            templates: extract_templates(
                text,
                catalog,
                config.max_sentences,
                config.templates_per_work,
            ),
            phrases: extract_phrases(text, catalog),
        }
    }

    /// Total keyword occurrences across all slots.
    pub fn word_count(&self) -> usize {
        self.words.values().map(Vec::len).sum()
    }
}

/// Count each slot keyword and emit it `min(count, cap)` times.
///
/// Occurrences are literal and non-overlapping. Slots with no hits are
/// absent from the map.
pub fn extract_slot_words(
    text: &str,
    catalog: &GenreCatalog,
    cap: usize,
) -> BTreeMap<SlotType, Vec<String>> {
    let mut words = BTreeMap::new();

    for slot in SlotType::ALL {
        let mut found = Vec::new();
        for keyword in catalog.keywords(slot) {
            let count = text.matches(keyword.as_str()).count().min(cap);
            found.extend(std::iter::repeat_n(keyword.clone(), count));
        }
        if !found.is_empty() {
            words.insert(slot, found);
        }
    }

    words
}

/// Derive sentence templates from the first `max_sentences` sentences.
///
/// Each sentence is tested against the genre patterns in order. The first
/// pattern that matches has all its matches replaced with
/// [`template_skeleton`]; the result is kept if new. Stops once
/// `max_templates` distinct templates are collected.
pub fn extract_templates(
    text: &str,
    catalog: &GenreCatalog,
    max_sentences: usize,
    max_templates: usize,
) -> Vec<String> {
    let mut templates: Vec<String> = Vec::new();
    if max_templates == 0 {
        return templates;
    }

    let skeleton = template_skeleton();
    let sentences = text
        .split(SENTENCE_END)
        .take(max_sentences)
        .map(str::trim)
        .filter(|s| !s.is_empty());

    for sentence in sentences {
        let Some(pattern) = catalog.templates().iter().find(|p| p.is_match(sentence)) else {
            continue;
        };

        let template = pattern
            .replace_all(sentence, NoExpand(skeleton.as_str()))
            .into_owned();
        if !templates.contains(&template) {
            templates.push(template);
            if templates.len() >= max_templates {
                break;
            }
        }
    }

    templates
}

/// Catalog phrases that occur anywhere in `text`, each at most once.
pub fn extract_phrases(text: &str, catalog: &GenreCatalog) -> Vec<String> {
    catalog
        .phrases()
        .iter()
        .filter(|phrase| text.contains(phrase.as_str()))
        .cloned()
        .collect()
}
