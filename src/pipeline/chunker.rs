//! Sentence-bounded text chunking.

use regex::Regex;
use std::sync::OnceLock;

/// One ordered segment of the input. `index` is 1-based.
///
/// Chunk texts borrow from the input; concatenating them in order gives the
/// input back byte for byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub index: usize,
    pub total: usize,
    pub text: &'a str,
}

impl Chunk<'_> {
    pub fn is_first(&self) -> bool {
        self.index == 1
    }

    pub fn is_last(&self) -> bool {
        self.index == self.total
    }
}

fn sentence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Shortest span ending in terminators followed by whitespace or end of
    // text. Trailing whitespace stays with its sentence.
    PATTERN.get_or_init(|| Regex::new(r"(?s).*?[.!?]+(?:\s+|\z)").expect("valid sentence regex"))
}

/// Split `text` into sentences. Text without a terminator is one sentence,
/// and any unterminated tail becomes the last sentence.
pub fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut end = 0;
    for m in sentence_pattern().find_iter(text) {
        if m.start() > end {
            out.push(&text[end..m.start()]);
        }
        if !m.as_str().is_empty() {
            out.push(m.as_str());
        }
        end = m.end();
    }
    if end < text.len() {
        out.push(&text[end..]);
    }
    out
}

/// Split `text` into chunks of at most `max_chars` characters, never breaking
/// a sentence. A single sentence longer than `max_chars` becomes its own
/// oversized chunk. Empty input yields no chunks.
pub fn chunk(text: &str, max_chars: usize) -> Vec<Chunk<'_>> {
    if text.is_empty() {
        return Vec::new();
    }

    let spans: Vec<&str> = if text.chars().count() <= max_chars {
        vec![text]
    } else {
        accumulate(text, max_chars)
    };

    let total = spans.len();
    spans
        .into_iter()
        .enumerate()
        .map(|(i, span)| Chunk {
            index: i + 1,
            total,
            text: span,
        })
        .collect()
}

/// Greedy accumulation of whole sentences. Works on byte offsets into `text`
/// so every chunk is a contiguous slice.
fn accumulate(text: &str, max_chars: usize) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0usize;
    let mut end = 0usize;
    let mut buffered_chars = 0usize;

    for sentence in sentences(text) {
        let len = sentence.chars().count();
        if buffered_chars > 0 && buffered_chars + len > max_chars {
            out.push(&text[start..end]);
            start = end;
            buffered_chars = 0;
        }
        end += sentence.len();
        buffered_chars += len;
    }
    if end > start {
        out.push(&text[start..end]);
    }
    out
}
