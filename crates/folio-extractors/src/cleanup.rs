//! OCR text cleanup.
//!
//! Normalizes raw OCR output: drops non-printable characters, collapses
//! runs of spaces and blank lines, fixes spacing around punctuation, and
//! regroups sentences into paragraphs of roughly
//! [`PARAGRAPH_TARGET`] characters separated by a blank line.

use folio_core::{CleanupStats, ExtractionOutput};
use once_cell::sync::Lazy;
use regex::Regex;

/// Paragraphs are closed at the first sentence end past this many characters.
pub const PARAGRAPH_TARGET: usize = 500;

static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").expect("valid regex"));

static BLANK_LINE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

static SPACE_BEFORE_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" +([,.!?;:])").expect("valid regex"));

static MISSING_SPACE_AFTER_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([,.!?;:])([A-Za-z])").expect("valid regex"));

static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"([.!?])\s+").expect("valid regex"));

/// Clean raw OCR text. Blank input yields an empty string.
pub fn clean_text(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let printable: String = text.chars().filter(|c| is_printable(*c)).collect();
    let text = SPACE_RUNS.replace_all(&printable, " ");
    let text = BLANK_LINE_RUNS.replace_all(&text, "\n\n");
    let text = SPACE_BEFORE_PUNCT.replace_all(&text, "$1");
    let text = MISSING_SPACE_AFTER_PUNCT.replace_all(&text, "$1 $2");

    regroup_paragraphs(&text).join("\n\n").trim().to_string()
}

/// Clean `raw_text` and package it with its statistics.
pub fn process_text(filename: impl Into<String>, raw_text: String) -> ExtractionOutput {
    let cleaned_text = clean_text(&raw_text);
    let cleanup_stats = CleanupStats::compute(&raw_text, &cleaned_text);

    ExtractionOutput {
        filename: filename.into(),
        raw_text_length: cleanup_stats.original_length,
        cleaned_text_length: cleanup_stats.cleaned_length,
        has_text: !cleaned_text.trim().is_empty(),
        raw_text,
        cleaned_text,
        cleanup_stats,
    }
}

/// ASCII letters, digits, punctuation and whitespace.
fn is_printable(c: char) -> bool {
    c.is_ascii_graphic() || matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

fn regroup_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut last = 0;

    for caps in SENTENCE_END.captures_iter(text) {
        let (Some(whole), Some(punct)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_sentence(&text[last..punct.end()], &mut current);
        last = whole.end();

        if current.chars().count() > PARAGRAPH_TARGET {
            paragraphs.push(current.trim().to_string());
            current.clear();
        }
    }
    push_sentence(&text[last..], &mut current);

    if !current.trim().is_empty() {
        paragraphs.push(current.trim().to_string());
    }
    paragraphs
}

fn push_sentence(sentence: &str, current: &mut String) {
    if !current.is_empty() && !sentence.is_empty() {
        current.push(' ');
    }
    current.push_str(sentence);
}
