//! End-to-end extraction run: catalog → fetch → normalize → extract → aggregate → store.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use aozora_catalog::PatternCatalog;
use aozora_fetcher::SourceFetcher;
use aozora_shared::{CorpusError, ExtractionConfig, Result, Work};
use aozora_storage::Storage;

use crate::aggregate::{CorpusAccumulator, GenreCorpus, persist_genre};
use crate::extract::WorkExtraction;

/// Configuration for one extraction run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Works to process, in order.
    pub works: Vec<Work>,
    /// Extraction and ranking limits.
    pub extraction: ExtractionConfig,
}

/// A work left out of the run.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedWork {
    pub work_id: String,
    pub title: String,
    pub reason: String,
}

/// Result of [`run_corpus`].
#[derive(Debug)]
pub struct RunResult {
    /// History row ID; `None` for dry runs.
    pub run_id: Option<String>,
    /// Works that were fetched and extracted.
    pub processed: usize,
    /// Works whose text could not be retrieved.
    pub skipped: Vec<SkippedWork>,
    /// Per-genre assets, in lexical genre order.
    pub corpus: Vec<GenreCorpus>,
    /// Genres whose write was rolled back.
    pub failed_genres: Vec<String>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

impl RunResult {
    /// Whether every genre was persisted (always true for dry runs).
    pub fn is_success(&self) -> bool {
        self.failed_genres.is_empty()
    }

    fn stats(&self, works_total: usize) -> RunStats<'_> {
        RunStats {
            works_total,
            processed: self.processed,
            skipped: &self.skipped,
            genres: self
                .corpus
                .iter()
                .map(|c| GenreSummary {
                    genre: &c.genre,
                    works: c.works,
                    words: c.words.len(),
                    templates: c.templates.len(),
                    phrases: c.phrases.len(),
                })
                .collect(),
            failed_genres: &self.failed_genres,
            elapsed_ms: self.elapsed.as_millis() as u64,
        }
    }
}

/// Summary written to the run history.
#[derive(Debug, Serialize)]
struct RunStats<'a> {
    works_total: usize,
    processed: usize,
    skipped: &'a [SkippedWork],
    genres: Vec<GenreSummary<'a>>,
    failed_genres: &'a [String],
    elapsed_ms: u64,
}

#[derive(Debug, Serialize)]
struct GenreSummary<'a> {
    genre: &'a str,
    works: usize,
    words: usize,
    templates: usize,
    phrases: usize,
}

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before a work is fetched.
    fn work_started(&self, work: &Work, current: usize, total: usize);
    /// Called when a work is left out.
    fn work_skipped(&self, work: &Work, reason: &str);
    /// Called when the run completes.
    fn done(&self, result: &RunResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn work_started(&self, _work: &Work, _current: usize, _total: usize) {}
    fn work_skipped(&self, _work: &Work, _reason: &str) {}
    fn done(&self, _result: &RunResult) {}
}

/// Run extraction over `config.works` and persist the result.
///
/// Works are processed one at a time. A work whose text cannot be retrieved
/// is skipped. With `storage = None` nothing is written (dry run).
/// Otherwise each genre is written in its own transaction; a genre that
/// fails is rolled back and listed in [`RunResult::failed_genres`] while the
/// remaining genres still commit.
#[instrument(skip_all, fields(works = config.works.len(), dry_run = storage.is_none()))]
pub async fn run_corpus(
    patterns: &PatternCatalog,
    fetcher: &SourceFetcher,
    storage: Option<&Storage>,
    config: &RunConfig,
    progress: &dyn ProgressReporter,
) -> Result<RunResult> {
    let start = Instant::now();
    let total = config.works.len();

    let run_id = match storage {
        Some(storage) => Some(storage.insert_run().await?),
        None => None,
    };
    info!(run_id = run_id.as_deref().unwrap_or("dry-run"), total, "starting extraction run");

    // --- Phase 1: Fetch + extract ---
    progress.phase("Extracting works");
    let mut accumulator = CorpusAccumulator::new();
    let mut processed = 0;
    let mut skipped = Vec::new();

    for (i, work) in config.works.iter().enumerate() {
        progress.work_started(work, i + 1, total);

        let fetched = match fetcher.fetch(work).await {
            Ok(fetched) => fetched,
            Err(e) => {
                let reason = e.to_string();
                warn!(work_id = %work.id, title = %work.title, error = %reason, "skipping work");
                progress.work_skipped(work, &reason);
                skipped.push(skipped_work(work, reason));
                continue;
            }
        };

        if !patterns.contains(&work.genre) {
            debug!(work_id = %work.id, genre = %work.genre, "genre not cataloged, using default patterns");
        }

        let text = aozora_normalize::normalize(&fetched.text);
        let extraction =
            WorkExtraction::from_text(&text, patterns.genre(&work.genre), &config.extraction);
        info!(
            work_id = %work.id,
            genre = %work.genre,
            words = extraction.word_count(),
            templates = extraction.templates.len(),
            phrases = extraction.phrases.len(),
            "extracted work"
        );

        accumulator.add(&work.genre, &extraction);
        processed += 1;
    }

    // --- Phase 2: Aggregate ---
    progress.phase("Ranking corpus");
    if accumulator.is_empty() {
        warn!(total, "no work text retrieved, corpus is empty");
    }
    let corpus = accumulator.finish(&config.extraction);

    // --- Phase 3: Persist ---
    let mut failed_genres = Vec::new();
    if let Some(storage) = storage {
        progress.phase("Writing corpus");
        for genre_corpus in &corpus {
            if let Err(e) = write_genre(storage, genre_corpus).await {
                error!(genre = %genre_corpus.genre, error = %e, "genre write rolled back");
                failed_genres.push(genre_corpus.genre.clone());
            }
        }
    }

    let result = RunResult {
        run_id,
        processed,
        skipped,
        corpus,
        failed_genres,
        elapsed: start.elapsed(),
    };

    if let (Some(storage), Some(run_id)) = (storage, result.run_id.as_deref()) {
        if let Err(e) = record_run(storage, run_id, &result, total).await {
            warn!(run_id, error = %e, "failed to record run history");
        }
    }

    info!(
        processed = result.processed,
        skipped = result.skipped.len(),
        genres = result.corpus.len(),
        failed = result.failed_genres.len(),
        elapsed_ms = result.elapsed.as_millis() as u64,
        "extraction run complete"
    );
    progress.done(&result);
    Ok(result)
}

/// Persist one genre inside its own transaction.
async fn write_genre(storage: &Storage, corpus: &GenreCorpus) -> Result<()> {
    let tx = storage.begin().await?;
    match persist_genre(&tx, corpus).await {
        Ok(()) => tx.commit().await,
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(genre = %corpus.genre, error = %rollback_err, "rollback failed");
            }
            Err(e)
        }
    }
}

/// Close the history row with the run's JSON stats.
async fn record_run(
    storage: &Storage,
    run_id: &str,
    result: &RunResult,
    total: usize,
) -> Result<()> {
    let stats_json = serde_json::to_string(&result.stats(total))
        .map_err(|e| CorpusError::Storage(format!("encode run stats: {e}")))?;
    storage.finish_run(run_id, &stats_json).await
}

fn skipped_work(work: &Work, reason: String) -> SkippedWork {
    SkippedWork {
        work_id: work.id.clone(),
        title: work.title.clone(),
        reason,
    }
}
