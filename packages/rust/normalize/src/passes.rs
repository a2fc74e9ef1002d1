//! Normalization passes for Aozora Bunko text.
//!
//! Each pass is a function `&str -> String` applied in sequence.

use std::sync::LazyLock;

use regex::Regex;

/// Marker line separating front matter from the body.
pub(crate) const SECTION_SEPARATOR: &str = "-------";

/// Run the full normalization pipeline on raw text.
pub(crate) fn run_pipeline(raw: &str) -> String {
    let mut result = normalize_line_endings(raw);

    result = strip_front_matter(&result);
    result = strip_ruby(&result);
    result = strip_editorial_notes(&result);
    result = collapse_blank_lines(&result);

    result.trim().to_string()
}

// ---------------------------------------------------------------------------
// Pass 1: Line endings
// ---------------------------------------------------------------------------

/// Convert CRLF and lone CR to LF.
fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

// ---------------------------------------------------------------------------
// Pass 2: Front matter
// ---------------------------------------------------------------------------

/// Keep only what follows the last section separator.
fn strip_front_matter(text: &str) -> String {
    match text.rfind(SECTION_SEPARATOR) {
        Some(idx) => text[idx + SECTION_SEPARATOR.len()..].to_string(),
        None => text.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Pass 3: Ruby annotations
// ---------------------------------------------------------------------------

/// Reduce `｜BASE《READING》` and `BASE《READING》` to `BASE`.
fn strip_ruby(text: &str) -> String {
    static MARKED_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"｜([^《]+)《[^》]*》").expect("valid regex"));
    static READING_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"《[^》]*》").expect("valid regex"));

    let text = MARKED_RE.replace_all(text, "$1");
    let text = READING_RE.replace_all(&text, "");
    // Unbalanced delimiters never carry a base to keep.
    text.replace(['《', '》', '｜'], "")
}

// ---------------------------------------------------------------------------
// Pass 4: Editorial notes
// ---------------------------------------------------------------------------

/// Remove `［＃...］` input notes. An unclosed note runs to the end of its line.
fn strip_editorial_notes(text: &str) -> String {
    static NOTE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"［＃[^］]*］").expect("valid regex"));
    static UNCLOSED_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"［＃[^\n]*").expect("valid regex"));

    let text = NOTE_RE.replace_all(text, "");
    UNCLOSED_RE.replace_all(&text, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 5: Blank lines
// ---------------------------------------------------------------------------

/// Collapse any run of blank lines into a single newline.
fn collapse_blank_lines(text: &str) -> String {
    static BLANK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n\s*\n+").expect("valid regex"));

    BLANK_RE.replace_all(text, "\n").to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_endings_become_lf() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
    }

    #[test]
    fn front_matter_keeps_text_after_last_separator() {
        let input = "題名\n-------\n注記\n-------\n本文";
        assert_eq!(strip_front_matter(input), "\n本文");
    }

    #[test]
    fn front_matter_long_rule_counts_as_separator() {
        let input = "題名\n--------------------\n本文";
        assert_eq!(strip_front_matter(input), "\n本文");
    }

    #[test]
    fn front_matter_untouched_without_separator() {
        assert_eq!(strip_front_matter("本文だけ"), "本文だけ");
    }

    #[test]
    fn ruby_marked_base_kept() {
        assert_eq!(strip_ruby("｜青空文庫《あおぞらぶんこ》を読む"), "青空文庫を読む");
    }

    #[test]
    fn ruby_unmarked_base_kept() {
        assert_eq!(strip_ruby("漢字《かんじ》の読み"), "漢字の読み");
    }

    #[test]
    fn ruby_at_start_of_text_removed() {
        assert_eq!(strip_ruby("《よみ》本文"), "本文");
    }

    #[test]
    fn ruby_unbalanced_delimiters_dropped() {
        let result = strip_ruby("開き《だけ");
        assert!(!result.contains('《'));
        assert!(result.contains("開き"));
    }

    #[test]
    fn editorial_notes_removed() {
        let input = "彼は［＃「彼」に傍点］走った";
        assert_eq!(strip_editorial_notes(input), "彼は走った");
    }

    #[test]
    fn ruby_stray_boundary_marker_dropped() {
        assert_eq!(strip_ruby("｜前後"), "前後");
        assert_eq!(strip_ruby("前｜"), "前");
    }

    #[test]
    fn unclosed_note_removed_to_end_of_line() {
        assert_eq!(strip_editorial_notes("前［＃未完の注記"), "前");
        assert_eq!(strip_editorial_notes("前［＃未完\n次の行"), "前\n次の行");
    }

    #[test]
    fn unclosed_note_after_closed_note() {
        let result = strip_editorial_notes("一［＃注記］二［＃途中");
        assert_eq!(result, "一二");
    }

    #[test]
    fn blank_lines_collapsed() {
        assert_eq!(collapse_blank_lines("一\n\n\n二\n \n三"), "一\n二\n三");
    }

    #[test]
    fn single_newlines_kept() {
        assert_eq!(collapse_blank_lines("一\n二"), "一\n二");
    }
}
