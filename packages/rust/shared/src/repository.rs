//! Persistence contract for derived corpus entities.
//!
//! Every operation is an idempotent upsert keyed as follows:
//! - slot words on `(genre, slot_type, word)`, keeping the larger weight
//! - templates on `(template_type, template)`, first writer wins
//! - phrases on `(genre, phrase)`, first writer wins

use std::future::Future;

use crate::error::Result;
use crate::types::SlotType;

/// Narrow write interface consumed by the aggregator.
pub trait CorpusRepository {
    /// Insert a word, or raise the stored weight to `max(stored, weight)`.
    fn upsert_slot_word(
        &self,
        genre: &str,
        slot_type: SlotType,
        word: &str,
        weight: f64,
    ) -> impl Future<Output = Result<()>>;

    /// Insert a template; no-op if `(template_type, template)` exists.
    fn upsert_template(
        &self,
        template_type: &str,
        template: &str,
        genre: Option<&str>,
    ) -> impl Future<Output = Result<()>>;

    /// Insert a phrase; no-op if `(genre, phrase)` exists.
    fn upsert_phrase(&self, genre: &str, phrase: &str) -> impl Future<Output = Result<()>>;
}
