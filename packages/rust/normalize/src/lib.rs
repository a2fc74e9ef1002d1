//! Aozora Bunko markup normalization.
//!
//! Turns a raw archive text into plain body text:
//! 1. Line endings become `\n`
//! 2. Front matter before the last `-------` separator is dropped
//! 3. Ruby readings (`｜漢字《かんじ》`, `漢字《かんじ》`) reduce to the base text;
//!    stray `《`, `》` and `｜` are dropped
//! 4. Editorial notes (`［＃...］`) are removed; an unclosed `［＃` runs to end of line
//! 5. Blank-line runs collapse to one newline, and the result is trimmed
//!
//! Normalization is total: any input, including the empty string, produces
//! an output free of `《`, `》`, `｜` and `［＃`.

mod passes;

use tracing::debug;

/// Normalize raw archive text into extraction-ready body text.
pub fn normalize(raw: &str) -> String {
    let normalized = passes::run_pipeline(raw);
    debug!(
        raw_chars = raw.chars().count(),
        normalized_chars = normalized.chars().count(),
        "normalized text"
    );
    normalized
}
