//! libSQL storage layer for the genre corpus.
//!
//! The [`Storage`] struct wraps a local libSQL database holding slot words,
//! sentence templates, phrase patterns and the extraction-run history.
//!
//! Writes go through the [`CorpusRepository`] contract, implemented both by
//! [`Storage`] (auto-commit) and by [`CorpusTransaction`] (explicit
//! transaction, used by the extraction run to commit one genre at a time).

mod migrations;
mod seed;

use std::collections::BTreeMap;
use std::path::Path;

use aozora_shared::{CorpusError, CorpusRepository, Result, SlotType, SlotWord};
use chrono::Utc;
use libsql::{Connection, Database, params};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

/// Row counts for one genre.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenreStats {
    pub genre: String,
    pub words: u64,
    pub templates: u64,
    pub phrases: u64,
}

/// Outcome of [`Storage::seed_initial_corpus`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub words: u64,
    pub templates: u64,
    pub phrases: u64,
}

/// Rows removed by [`Storage::reset_corpus`].
pub type ResetReport = SeedReport;

impl Storage {
    /// Open or create a database at `path` and apply pending migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CorpusError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| CorpusError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| CorpusError::Storage(e.to_string()))?;

        let storage = Self { db, conn };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        CorpusError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Start an explicit transaction.
    pub async fn begin(&self) -> Result<CorpusTransaction> {
        let tx = self
            .conn
            .transaction()
            .await
            .map_err(|e| CorpusError::Storage(format!("begin transaction: {e}")))?;
        Ok(CorpusTransaction { tx })
    }

    // -----------------------------------------------------------------------
    // Starter data
    // -----------------------------------------------------------------------

    /// Insert the hand-curated starter corpus in one transaction.
    ///
    /// Existing rows are left untouched, so seeding twice is harmless.
    pub async fn seed_initial_corpus(&self) -> Result<SeedReport> {
        let tx = self.begin().await?;
        let now = Utc::now().to_rfc3339();
        let mut report = SeedReport::default();

        for (genre, slot, word, weight) in seed::SEED_WORDS {
            report.words += tx
                .tx
                .execute(
                    "INSERT INTO corpus_words (id, genre, slot_type, word, weight, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                     ON CONFLICT(genre, slot_type, word) DO NOTHING",
                    params![
                        Uuid::now_v7().to_string(),
                        *genre,
                        slot.as_str(),
                        *word,
                        *weight,
                        now.as_str()
                    ],
                )
                .await
                .map_err(|e| CorpusError::Storage(e.to_string()))?;
        }

        for (template_type, template, genre) in seed::SEED_TEMPLATES {
            report.templates += insert_template(&tx.tx, template_type, template, *genre).await?;
        }

        for (genre, phrase) in seed::SEED_PHRASES {
            report.phrases += insert_phrase(&tx.tx, genre, phrase).await?;
        }

        tx.commit().await?;
        info!(
            words = report.words,
            templates = report.templates,
            phrases = report.phrases,
            "seeded starter corpus"
        );
        Ok(report)
    }

    // -----------------------------------------------------------------------
    // Read operations
    // -----------------------------------------------------------------------

    /// Per-genre row counts across the three corpus tables, ordered by genre.
    ///
    /// Templates without a genre are counted under `*`.
    pub async fn corpus_stats(&self) -> Result<Vec<GenreStats>> {
        let mut by_genre: BTreeMap<String, GenreStats> = BTreeMap::new();

        for (sql, column) in [
            (
                "SELECT genre, COUNT(*) FROM corpus_words GROUP BY genre",
                StatColumn::Words,
            ),
            (
                "SELECT COALESCE(genre, '*'), COUNT(*) FROM sentence_templates GROUP BY 1",
                StatColumn::Templates,
            ),
            (
                "SELECT genre, COUNT(*) FROM phrase_patterns GROUP BY genre",
                StatColumn::Phrases,
            ),
        ] {
            let mut rows = self
                .conn
                .query(sql, params![])
                .await
                .map_err(|e| CorpusError::Storage(e.to_string()))?;

            while let Some(row) = rows
                .next()
                .await
                .map_err(|e| CorpusError::Storage(e.to_string()))?
            {
                let genre: String = row
                    .get(0)
                    .map_err(|e| CorpusError::Storage(e.to_string()))?;
                let count: i64 = row
                    .get(1)
                    .map_err(|e| CorpusError::Storage(e.to_string()))?;

                let entry = by_genre.entry(genre.clone()).or_insert_with(|| GenreStats {
                    genre,
                    ..GenreStats::default()
                });
                let count = count.max(0) as u64;
                match column {
                    StatColumn::Words => entry.words = count,
                    StatColumn::Templates => entry.templates = count,
                    StatColumn::Phrases => entry.phrases = count,
                }
            }
        }

        Ok(by_genre.into_values().collect())
    }

    /// Stored words for `genre`, by slot then descending weight.
    pub async fn list_slot_words(&self, genre: &str) -> Result<Vec<SlotWord>> {
        let mut rows = self
            .conn
            .query(
                "SELECT slot_type, word, weight FROM corpus_words
                 WHERE genre = ?1
                 ORDER BY slot_type, weight DESC, word",
                params![genre],
            )
            .await
            .map_err(|e| CorpusError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| CorpusError::Storage(e.to_string()))?
        {
            let slot: String = row
                .get(0)
                .map_err(|e| CorpusError::Storage(e.to_string()))?;
            let word: String = row
                .get(1)
                .map_err(|e| CorpusError::Storage(e.to_string()))?;
            let weight: f64 = row
                .get(2)
                .map_err(|e| CorpusError::Storage(e.to_string()))?;

            results.push(SlotWord::new(genre, slot.parse()?, word, weight)?);
        }
        Ok(results)
    }

    // -----------------------------------------------------------------------
    // Administrative operations
    // -----------------------------------------------------------------------

    /// Delete every derived row in one transaction. Run history is kept.
    pub async fn reset_corpus(&self) -> Result<ResetReport> {
        let tx = self.begin().await?;
        let mut report = ResetReport::default();

        for (table, slot) in [
            ("corpus_words", &mut report.words),
            ("sentence_templates", &mut report.templates),
            ("phrase_patterns", &mut report.phrases),
        ] {
            *slot = tx
                .tx
                .execute(&format!("DELETE FROM {table}"), params![])
                .await
                .map_err(|e| CorpusError::Storage(format!("clear {table}: {e}")))?;
        }

        tx.commit().await?;
        info!(
            words = report.words,
            templates = report.templates,
            phrases = report.phrases,
            "corpus reset"
        );
        Ok(report)
    }

    // -----------------------------------------------------------------------
    // Extraction run history
    // -----------------------------------------------------------------------

    /// Record the start of an extraction run. Returns the generated run ID.
    pub async fn insert_run(&self) -> Result<String> {
        let id = Uuid::now_v7().to_string();
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO extraction_runs (id, started_at) VALUES (?1, ?2)",
                params![id.as_str(), now.as_str()],
            )
            .await
            .map_err(|e| CorpusError::Storage(e.to_string()))?;
        Ok(id)
    }

    /// Mark a run finished with its summary statistics.
    pub async fn finish_run(&self, run_id: &str, stats_json: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "UPDATE extraction_runs SET finished_at = ?1, stats_json = ?2 WHERE id = ?3",
                params![now.as_str(), stats_json, run_id],
            )
            .await
            .map_err(|e| CorpusError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Stats JSON of a run, `None` if the run is unknown or unfinished.
    pub async fn run_stats(&self, run_id: &str) -> Result<Option<String>> {
        let mut rows = self
            .conn
            .query(
                "SELECT stats_json FROM extraction_runs WHERE id = ?1",
                params![run_id],
            )
            .await
            .map_err(|e| CorpusError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(row.get::<String>(0).ok()),
            Ok(None) => Ok(None),
            Err(e) => Err(CorpusError::Storage(e.to_string())),
        }
    }
}

enum StatColumn {
    Words,
    Templates,
    Phrases,
}

impl CorpusRepository for Storage {
    async fn upsert_slot_word(
        &self,
        genre: &str,
        slot_type: SlotType,
        word: &str,
        weight: f64,
    ) -> Result<()> {
        upsert_word(&self.conn, genre, slot_type, word, weight).await
    }

    async fn upsert_template(
        &self,
        template_type: &str,
        template: &str,
        genre: Option<&str>,
    ) -> Result<()> {
        insert_template(&self.conn, template_type, template, genre)
            .await
            .map(drop)
    }

    async fn upsert_phrase(&self, genre: &str, phrase: &str) -> Result<()> {
        insert_phrase(&self.conn, genre, phrase).await.map(drop)
    }
}

// ---------------------------------------------------------------------------
// CorpusTransaction
// ---------------------------------------------------------------------------

/// Writes grouped into one explicit transaction.
///
/// Dropping without [`commit`](Self::commit) rolls back.
pub struct CorpusTransaction {
    tx: libsql::Transaction,
}

impl CorpusTransaction {
    /// Make every write in this transaction durable.
    pub async fn commit(self) -> Result<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| CorpusError::Storage(format!("commit: {e}")))
    }

    /// Discard every write in this transaction.
    pub async fn rollback(self) -> Result<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| CorpusError::Storage(format!("rollback: {e}")))
    }
}

impl CorpusRepository for CorpusTransaction {
    async fn upsert_slot_word(
        &self,
        genre: &str,
        slot_type: SlotType,
        word: &str,
        weight: f64,
    ) -> Result<()> {
        upsert_word(&self.tx, genre, slot_type, word, weight).await
    }

    async fn upsert_template(
        &self,
        template_type: &str,
        template: &str,
        genre: Option<&str>,
    ) -> Result<()> {
        insert_template(&self.tx, template_type, template, genre)
            .await
            .map(drop)
    }

    async fn upsert_phrase(&self, genre: &str, phrase: &str) -> Result<()> {
        insert_phrase(&self.tx, genre, phrase).await.map(drop)
    }
}

// ---------------------------------------------------------------------------
// Statements shared by Storage and CorpusTransaction
// ---------------------------------------------------------------------------

async fn upsert_word(
    conn: &Connection,
    genre: &str,
    slot_type: SlotType,
    word: &str,
    weight: f64,
) -> Result<()> {
    if !(0.0..=1.0).contains(&weight) {
        return Err(CorpusError::validation(format!(
            "weight {weight} for '{word}' outside [0, 1]"
        )));
    }

    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO corpus_words (id, genre, slot_type, word, weight, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
         ON CONFLICT(genre, slot_type, word) DO UPDATE SET
           weight = MAX(corpus_words.weight, excluded.weight),
           updated_at = excluded.updated_at",
        params![
            Uuid::now_v7().to_string(),
            genre,
            slot_type.as_str(),
            word,
            weight,
            now.as_str()
        ],
    )
    .await
    .map_err(|e| CorpusError::Storage(e.to_string()))?;

    debug!(genre, slot = %slot_type, word, weight, "upserted slot word");
    Ok(())
}

/// Returns the number of rows inserted (0 when the template already existed).
async fn insert_template(
    conn: &Connection,
    template_type: &str,
    template: &str,
    genre: Option<&str>,
) -> Result<u64> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO sentence_templates (id, template_type, template, genre, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(template_type, template) DO NOTHING",
        params![
            Uuid::now_v7().to_string(),
            template_type,
            template,
            genre,
            now.as_str()
        ],
    )
    .await
    .map_err(|e| CorpusError::Storage(e.to_string()))
}

/// Returns the number of rows inserted (0 when the phrase already existed).
async fn insert_phrase(conn: &Connection, genre: &str, phrase: &str) -> Result<u64> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO phrase_patterns (id, genre, phrase, created_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(genre, phrase) DO NOTHING",
        params![Uuid::now_v7().to_string(), genre, phrase, now.as_str()],
    )
    .await
    .map_err(|e| CorpusError::Storage(e.to_string()))
}
