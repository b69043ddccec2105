//! Recursive splitting of page text into bounded, overlapping passages.
//!
//! Separators are tried in priority order (paragraph break, line break,
//! sentence terminator, word break, character break) until segments fit the
//! configured budget; adjacent passages then share an overlap window so
//! context survives a cut. All length accounting is in characters, not
//! tokens — `token_count` on the produced passages is a best-effort
//! approximation only.

use std::collections::HashMap;

use tracing::warn;

use crate::config::ChunkingSettings;
use crate::types::{PageNumber, PageRecord, Passage};

const SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

/// A candidate topic line must be shorter than this and must not end in
/// terminal punctuation.
const TOPIC_LINE_MAX: usize = 60;
const TOPIC_SCAN_LINES: usize = 3;
const FALLBACK_TOPIC: &str = "General Section";

/// Rough words-to-tokens ratio for English prose.
const TOKENS_PER_WORD: f32 = 1.3;

pub struct Chunker {
    settings: ChunkingSettings,
}

impl Chunker {
    pub fn new(settings: ChunkingSettings) -> Self {
        Self { settings }
    }

    /// Splits each page into passages. An empty input yields an empty
    /// output with a logged warning, never an error.
    ///
    /// A page shorter than the overlap budget produces exactly one passage
    /// equal to the whole page.
    pub fn chunk(&self, pages: &[PageRecord]) -> Vec<Passage> {
        if pages.is_empty() {
            warn!("no documents to chunk");
            return Vec::new();
        }

        let mut passages = Vec::new();
        let mut seq_by_source: HashMap<String, usize> = HashMap::new();
        for page in pages {
            let mut pieces = Vec::new();
            split_ranges(&page.text, 0, &SEPARATORS, self.settings.chunk_size, &mut pieces);
            if pieces.is_empty() {
                continue;
            }
            let ranges = merge_ranges(&pieces, self.settings.chunk_size, self.settings.chunk_overlap);
            for (start, end) in ranges {
                let raw = &page.text[start..end];
                let text = raw.trim();
                if text.is_empty() {
                    continue;
                }
                let lead = raw.len() - raw.trim_start().len();
                let seq = seq_by_source.entry(page.source.clone()).or_insert(0);
                passages.push(Passage {
                    id: format!("{}:{}", page.source, *seq),
                    text: text.to_string(),
                    source: page.source.clone(),
                    page: PageNumber::from_raw(page.page),
                    topic: derive_topic(text),
                    token_count: approx_token_count(text),
                    start_offset: start + lead,
                });
                *seq += 1;
            }
        }
        passages
    }
}

/// Picks the first short, heading-like line from the start of a passage.
fn derive_topic(text: &str) -> String {
    for line in text.lines().take(TOPIC_SCAN_LINES) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.len() < TOPIC_LINE_MAX && !line.ends_with('.') && !line.ends_with(':') {
            return line.to_string();
        }
    }
    FALLBACK_TOPIC.to_string()
}

/// Word-count-based token estimate. A real tokenizer lives behind the
/// optional local embedding model; the pipeline never depends on it.
fn approx_token_count(text: &str) -> usize {
    let words = text.split_whitespace().count();
    (words as f32 * TOKENS_PER_WORD).round() as usize
}

/// Recursively splits `text` into byte ranges (relative to `base`) that
/// each fit `max`, trying separators in priority order. The final empty
/// separator falls back to character windows, so only a separator list
/// without it can ever emit an oversized atomic unit.
fn split_ranges(text: &str, base: usize, seps: &[&str], max: usize, out: &mut Vec<(usize, usize)>) {
    if text.len() <= max {
        if !text.is_empty() {
            out.push((base, base + text.len()));
        }
        return;
    }
    for (si, sep) in seps.iter().enumerate() {
        if sep.is_empty() {
            char_windows(text, base, max, out);
            return;
        }
        if text.contains(sep) {
            let rest = &seps[si + 1..];
            let mut pos = 0usize;
            for piece in text.split(sep) {
                split_ranges(piece, base + pos, rest, max, out);
                pos += piece.len() + sep.len();
            }
            return;
        }
    }
    // No separator applies: emit the indivisible unit whole.
    out.push((base, base + text.len()));
}

/// Splits into windows of at most `max` bytes on char boundaries.
fn char_windows(text: &str, base: usize, max: usize, out: &mut Vec<(usize, usize)>) {
    let mut start = 0usize;
    for (idx, ch) in text.char_indices() {
        if idx + ch.len_utf8() - start > max {
            out.push((base + start, base + idx));
            start = idx;
        }
    }
    if start < text.len() {
        out.push((base + start, base + text.len()));
    }
}

/// Greedily merges adjacent piece ranges into chunks of at most `max`
/// bytes, starting each next chunk inside the previous one so that
/// consecutive chunks share up to `overlap` bytes.
fn merge_ranges(pieces: &[(usize, usize)], max: usize, overlap: usize) -> Vec<(usize, usize)> {
    let mut result = Vec::new();
    let mut i = 0usize;
    let mut prev_end = 0usize;
    while i < pieces.len() {
        let start = pieces[i].0;
        let mut j = i;
        while j + 1 < pieces.len() && pieces[j + 1].1 - start <= max {
            j += 1;
        }
        let end = pieces[j].1;
        // A chunk that does not extend past the previous one is redundant
        // coverage from a stalled overlap window.
        if end > prev_end {
            result.push((start, end));
            prev_end = end;
        }
        if j + 1 >= pieces.len() {
            break;
        }
        // Walk back from the chunk tail to find the earliest piece inside
        // the overlap window; fall back to no overlap to guarantee progress.
        let mut next = j + 1;
        for p in (i + 1..=j).rev() {
            if end - pieces[p].0 <= overlap {
                next = p;
            } else {
                break;
            }
        }
        i = next;
    }
    result
}
