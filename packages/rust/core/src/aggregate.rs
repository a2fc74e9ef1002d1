//! Cross-work aggregation and ranking.
//!
//! [`CorpusAccumulator`] collects per-work extractions grouped by genre. At
//! the end of a run [`CorpusAccumulator::finish`] ranks and caps each genre's
//! assets into a [`GenreCorpus`], which [`persist_genre`] writes through a
//! [`CorpusRepository`].

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use aozora_shared::{
    CorpusRepository, ExtractionConfig, PhrasePattern, Result, SentenceTemplate, SlotType,
    SlotWord,
};

use crate::extract::WorkExtraction;

// ---------------------------------------------------------------------------
// Accumulation
// ---------------------------------------------------------------------------

/// Word frequencies for one slot, remembering first-seen order.
#[derive(Debug, Default)]
struct WordTally {
    index: HashMap<String, usize>,
    counts: Vec<(String, usize)>,
}

impl WordTally {
    fn add(&mut self, word: &str) {
        match self.index.get(word) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(word.to_string(), self.counts.len());
                self.counts.push((word.to_string(), 1));
            }
        }
    }

    /// Words by descending frequency; ties keep first-seen order.
    fn ranked(mut self) -> Vec<(String, usize)> {
        self.counts.sort_by(|a, b| b.1.cmp(&a.1));
        self.counts
    }
}

/// Running totals for one genre.
#[derive(Debug, Default)]
struct GenreAccumulator {
    works: usize,
    words: BTreeMap<SlotType, WordTally>,
    templates: Vec<String>,
    phrases: Vec<String>,
}

impl GenreAccumulator {
    fn add(&mut self, extraction: &WorkExtraction) {
        self.works += 1;

        for (slot, words) in &extraction.words {
            let tally = self.words.entry(*slot).or_default();
            for word in words {
                tally.add(word);
            }
        }

        for template in &extraction.templates {
            if !self.templates.contains(template) {
                self.templates.push(template.clone());
            }
        }

        for phrase in &extraction.phrases {
            if !self.phrases.contains(phrase) {
                self.phrases.push(phrase.clone());
            }
        }
    }
}

/// Accumulates extractions across all works of a run.
#[derive(Debug, Default)]
pub struct CorpusAccumulator {
    genres: BTreeMap<String, GenreAccumulator>,
}

impl CorpusAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one work's extraction into its genre.
    pub fn add(&mut self, genre: &str, extraction: &WorkExtraction) {
        self.genres.entry(genre.to_string()).or_default().add(extraction);
    }

    /// Whether nothing has been accumulated.
    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }

    /// Rank, cap and weight every genre's assets. Genres come out in lexical order.
    pub fn finish(self, config: &ExtractionConfig) -> Vec<GenreCorpus> {
        self.genres
            .into_iter()
            .map(|(genre, acc)| GenreCorpus::build(genre, acc, config))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Finished corpus
// ---------------------------------------------------------------------------

/// Final assets for one genre, ready to persist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreCorpus {
    pub genre: String,
    /// Number of works that contributed.
    pub works: usize,
    pub words: Vec<SlotWord>,
    pub templates: Vec<SentenceTemplate>,
    pub phrases: Vec<PhrasePattern>,
}

impl GenreCorpus {
    fn build(genre: String, acc: GenreAccumulator, config: &ExtractionConfig) -> Self {
        let mut words = Vec::new();
        for (slot, tally) in acc.words {
            for (word, freq) in tally.ranked().into_iter().take(config.top_words) {
                words.push(SlotWord {
                    genre: genre.clone(),
                    slot_type: slot,
                    word,
                    weight: (freq as f64 / config.weight_divisor).min(1.0),
                });
            }
        }

        let templates = acc
            .templates
            .into_iter()
            .take(config.templates_per_genre)
            .map(|template| SentenceTemplate {
                template_type: config.template_type.clone(),
                template,
                genre: Some(genre.clone()),
            })
            .collect();

        let phrases = acc
            .phrases
            .into_iter()
            .take(config.phrases_per_genre)
            .map(|phrase| PhrasePattern {
                genre: genre.clone(),
                phrase,
            })
            .collect();

        Self {
            genre,
            works: acc.works,
            words,
            templates,
            phrases,
        }
    }

    /// Weight of `word` in `slot`, if ranked.
    pub fn weight(&self, slot: SlotType, word: &str) -> Option<f64> {
        self.words
            .iter()
            .find(|w| w.slot_type == slot && w.word == word)
            .map(|w| w.weight)
    }
}

/// Write one genre's assets through `repo`.
pub async fn persist_genre(repo: &impl CorpusRepository, corpus: &GenreCorpus) -> Result<()> {
    for word in &corpus.words {
        repo.upsert_slot_word(&word.genre, word.slot_type, &word.word, word.weight)
            .await?;
    }
    for template in &corpus.templates {
        repo.upsert_template(
            &template.template_type,
            &template.template,
            template.genre.as_deref(),
        )
        .await?;
    }
    for phrase in &corpus.phrases {
        repo.upsert_phrase(&phrase.genre, &phrase.phrase).await?;
    }

    debug!(
        genre = %corpus.genre,
        words = corpus.words.len(),
        templates = corpus.templates.len(),
        phrases = corpus.phrases.len(),
        "persisted genre"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::extract::template_skeleton;
    use aozora_catalog::Catalog;

    /// In-memory repository with the same conflict rules as the database.
    #[derive(Default)]
    struct MemoryRepository {
        words: Mutex<HashMap<(String, SlotType, String), f64>>,
        templates: Mutex<Vec<(String, String, Option<String>)>>,
        phrases: Mutex<Vec<(String, String)>>,
    }

    impl CorpusRepository for MemoryRepository {
        async fn upsert_slot_word(
            &self,
            genre: &str,
            slot_type: SlotType,
            word: &str,
            weight: f64,
        ) -> Result<()> {
            let mut words = self.words.lock().unwrap();
            let entry = words
                .entry((genre.to_string(), slot_type, word.to_string()))
                .or_insert(weight);
            *entry = entry.max(weight);
            Ok(())
        }

        async fn upsert_template(
            &self,
            template_type: &str,
            template: &str,
            genre: Option<&str>,
        ) -> Result<()> {
            let mut templates = self.templates.lock().unwrap();
            if !templates
                .iter()
                .any(|(t, s, _)| t == template_type && s == template)
            {
                templates.push((
                    template_type.to_string(),
                    template.to_string(),
                    genre.map(String::from),
                ));
            }
            Ok(())
        }

        async fn upsert_phrase(&self, genre: &str, phrase: &str) -> Result<()> {
            let mut phrases = self.phrases.lock().unwrap();
            let key = (genre.to_string(), phrase.to_string());
            if !phrases.contains(&key) {
                phrases.push(key);
            }
            Ok(())
        }
    }

    fn extraction(slot: SlotType, words: &[&str]) -> WorkExtraction {
        WorkExtraction {
            words: BTreeMap::from([(slot, words.iter().map(|w| w.to_string()).collect())]),
            ..WorkExtraction::default()
        }
    }

    #[test]
    fn horror_example_weights() {
        let catalog = Catalog::builtin();
        let config = ExtractionConfig::default();
        let work = WorkExtraction::from_text(
            "影が墓地で血を見つけた。影は恐怖を感じた。",
            catalog.patterns().genre("horror"),
            &config,
        );

        let mut acc = CorpusAccumulator::new();
        acc.add("horror", &work);
        let corpus = acc.finish(&config);

        assert_eq!(corpus.len(), 1);
        let horror = &corpus[0];
        assert_eq!(horror.genre, "horror");
        assert_eq!(horror.words.len(), 4);
        assert_eq!(horror.weight(SlotType::Agent, "影"), Some(0.2));
        assert_eq!(horror.weight(SlotType::Location, "墓地"), Some(0.1));
        assert_eq!(horror.weight(SlotType::Discovery, "血"), Some(0.1));
        assert_eq!(horror.weight(SlotType::Emotion, "恐怖"), Some(0.1));

        assert_eq!(horror.templates.len(), 1);
        assert_eq!(horror.templates[0].template, template_skeleton());
        assert_eq!(horror.templates[0].template_type, "auto_extracted");
        assert_eq!(horror.templates[0].genre.as_deref(), Some("horror"));
    }

    #[test]
    fn ranking_by_frequency_then_first_seen() {
        let mut acc = CorpusAccumulator::new();
        acc.add(
            "horror",
            &extraction(SlotType::Agent, &["亡霊", "影", "悪魔", "影"]),
        );
        acc.add("horror", &extraction(SlotType::Agent, &["悪魔"]));

        let config = ExtractionConfig {
            top_words: 2,
            ..ExtractionConfig::default()
        };
        let corpus = acc.finish(&config);
        let words: Vec<_> = corpus[0].words.iter().map(|w| w.word.as_str()).collect();
        // 影 and 悪魔 tie at 2; 影 was seen first. 亡霊 falls outside the top 2.
        assert_eq!(words, vec!["影", "悪魔"]);
    }

    #[test]
    fn weight_saturates_at_one() {
        let mut acc = CorpusAccumulator::new();
        let many = vec!["影"; 25];
        acc.add("horror", &extraction(SlotType::Agent, &many));

        let corpus = acc.finish(&ExtractionConfig::default());
        assert_eq!(corpus[0].weight(SlotType::Agent, "影"), Some(1.0));
    }

    #[test]
    fn templates_and_phrases_deduplicated_and_capped() {
        let mut acc = CorpusAccumulator::new();
        for i in 0..4 {
            acc.add(
                "neutral",
                &WorkExtraction {
                    templates: vec![format!("t{i}"), format!("t{}", i + 1)],
                    phrases: vec!["それは".into(), format!("p{i}")],
                    ..WorkExtraction::default()
                },
            );
        }

        let config = ExtractionConfig {
            templates_per_genre: 3,
            phrases_per_genre: 2,
            ..ExtractionConfig::default()
        };
        let corpus = acc.finish(&config);
        let templates: Vec<_> = corpus[0].templates.iter().map(|t| t.template.as_str()).collect();
        let phrases: Vec<_> = corpus[0].phrases.iter().map(|p| p.phrase.as_str()).collect();
        assert_eq!(templates, vec!["t0", "t1", "t2"]);
        assert_eq!(phrases, vec!["それは", "p0"]);
        assert_eq!(corpus[0].works, 4);
    }

    #[tokio::test]
    async fn default_limits_bound_persisted_assets() {
        let mut acc = CorpusAccumulator::new();
        for work in 0..8 {
            acc.add(
                "horror",
                &WorkExtraction {
                    templates: (0..3).map(|i| format!("t{work}-{i}")).collect(),
                    phrases: (0..4).map(|i| format!("p{work}-{i}")).collect(),
                    ..WorkExtraction::default()
                },
            );
        }

        let config = ExtractionConfig::default();
        let corpus = acc.finish(&config);
        let repo = MemoryRepository::default();
        persist_genre(&repo, &corpus[0]).await.unwrap();

        let templates = repo.templates.lock().unwrap();
        let phrases = repo.phrases.lock().unwrap();
        assert_eq!(templates.len(), 5);
        assert_eq!(phrases.len(), 10);
        assert_eq!(templates[0].1, "t0-0");
        assert_eq!(phrases[9].1, "p2-1");
    }

    #[test]
    fn genres_emitted_in_lexical_order() {
        let mut acc = CorpusAccumulator::new();
        for genre in ["scifi", "comedy", "horror"] {
            acc.add(genre, &WorkExtraction::default());
        }
        let genres: Vec<_> = acc
            .finish(&ExtractionConfig::default())
            .into_iter()
            .map(|c| c.genre)
            .collect();
        assert_eq!(genres, vec!["comedy", "horror", "scifi"]);
    }

    #[tokio::test]
    async fn persist_is_idempotent_and_keeps_max_weight() {
        let repo = MemoryRepository::default();

        let mut first = CorpusAccumulator::new();
        first.add("horror", &extraction(SlotType::Agent, &["影", "影", "影"]));
        let strong = first.finish(&ExtractionConfig::default());

        let mut second = CorpusAccumulator::new();
        second.add("horror", &extraction(SlotType::Agent, &["影"]));
        let weak = second.finish(&ExtractionConfig::default());

        persist_genre(&repo, &strong[0]).await.unwrap();
        persist_genre(&repo, &strong[0]).await.unwrap();
        persist_genre(&repo, &weak[0]).await.unwrap();

        let words = repo.words.lock().unwrap();
        assert_eq!(words.len(), 1);
        let weight = words[&("horror".to_string(), SlotType::Agent, "影".to_string())];
        assert!((weight - 0.3).abs() < 1e-9);
    }
}
