//! SQL migration definitions for the corpus database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a batch of SQL statements.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: corpus_words, sentence_templates, phrase_patterns, extraction_runs",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Slot vocabulary per genre
CREATE TABLE IF NOT EXISTS corpus_words (
    id         TEXT PRIMARY KEY,
    genre      TEXT NOT NULL,
    slot_type  TEXT NOT NULL,
    word       TEXT NOT NULL,
    weight     REAL NOT NULL CHECK (weight >= 0.0 AND weight <= 1.0),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(genre, slot_type, word)
);

CREATE INDEX IF NOT EXISTS idx_corpus_words_genre ON corpus_words(genre, slot_type);

-- Sentence templates; genre is informational only
CREATE TABLE IF NOT EXISTS sentence_templates (
    id            TEXT PRIMARY KEY,
    template_type TEXT NOT NULL,
    template      TEXT NOT NULL,
    genre         TEXT,
    created_at    TEXT NOT NULL,
    UNIQUE(template_type, template)
);

-- Stylistic phrases per genre
CREATE TABLE IF NOT EXISTS phrase_patterns (
    id         TEXT PRIMARY KEY,
    genre      TEXT NOT NULL,
    phrase     TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(genre, phrase)
);

-- Extraction run history
CREATE TABLE IF NOT EXISTS extraction_runs (
    id          TEXT PRIMARY KEY,
    started_at  TEXT NOT NULL,
    finished_at TEXT,
    stats_json  TEXT
);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
