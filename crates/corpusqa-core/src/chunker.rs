//! Splits document text into bounded, sentence-aligned chunks.
//!
//! Sentences are accumulated until the configured character budget is
//! reached; a configurable overlap is carried from each chunk into the next
//! so that context at chunk boundaries is not lost. A single sentence longer
//! than the whole budget is hard-split and its pieces flagged as truncated.

use crate::types::{Document, DocumentChunk};

#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    pub max_chars: usize,
    pub overlap_chars: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_chars: 1200,
            overlap_chars: 200,
        }
    }
}

#[derive(Default)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    /// Split a document into ordered chunks.
    ///
    /// Deterministic for identical input and configuration. A document with
    /// no extractable text yields an empty vec, not an error.
    pub fn chunk(&self, doc: &Document) -> Vec<DocumentChunk> {
        let sentences = split_sentences(&doc.text);
        let mut pieces: Vec<(String, bool)> = Vec::new();
        let mut current = String::new();
        // Chars in `current` that are new content rather than carried overlap;
        // a chunk is only flushed when it holds something new.
        let mut fresh = 0usize;

        for sentence in &sentences {
            let sentence_len = sentence.chars().count();

            if sentence_len > self.config.max_chars {
                if fresh > 0 {
                    pieces.push((std::mem::take(&mut current), false));
                }
                let mut last_piece = String::new();
                for piece in hard_split(sentence, self.config.max_chars) {
                    last_piece.clone_from(&piece);
                    pieces.push((piece, true));
                }
                current = self.overlap_tail(&last_piece);
                fresh = 0;
                continue;
            }

            let current_len = current.chars().count();
            if current_len > 0 && current_len + 1 + sentence_len > self.config.max_chars {
                if fresh > 0 {
                    let flushed = std::mem::take(&mut current);
                    current = self.overlap_tail(&flushed);
                    pieces.push((flushed, false));
                    fresh = 0;
                }
                // The carried overlap alone may not fit together with the
                // sentence; drop it rather than exceed the budget.
                if current.chars().count() + 1 + sentence_len > self.config.max_chars {
                    current.clear();
                }
            }

            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(sentence);
            fresh += sentence_len;
        }
        if fresh > 0 {
            pieces.push((current, false));
        }

        let total_chunks = pieces.len();
        pieces
            .into_iter()
            .enumerate()
            .map(|(chunk_index, (content, truncated))| DocumentChunk {
                id: format!("{}:{}", doc.doc_id, chunk_index),
                doc_id: doc.doc_id.clone(),
                doc_path: doc.path.clone(),
                content,
                chunk_index,
                total_chunks,
                truncated,
            })
            .collect()
    }

    /// Trailing slice of a flushed chunk that seeds the next one, snapped
    /// forward to a word boundary.
    fn overlap_tail(&self, s: &str) -> String {
        if self.config.overlap_chars == 0 {
            return String::new();
        }
        let chars: Vec<char> = s.chars().collect();
        if chars.len() <= self.config.overlap_chars {
            return s.trim().to_string();
        }
        let mut start = chars.len() - self.config.overlap_chars;
        while start < chars.len()
            && !chars[start - 1].is_whitespace()
            && !chars[start].is_whitespace()
        {
            start += 1;
        }
        chars[start..].iter().collect::<String>().trim().to_string()
    }
}

/// Split text into trimmed sentences. A sentence ends at `.`, `!` or `?`
/// followed by whitespace (or end of input), or at a blank line.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let at_terminator = matches!(c, '.' | '!' | '?')
            && chars.peek().is_none_or(|next| next.is_whitespace());
        let at_blank_line = c == '\n' && chars.peek() == Some(&'\n');
        if at_terminator || at_blank_line {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    sentences
}

fn hard_split(sentence: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = sentence.chars().collect();
    chars
        .chunks(max_chars)
        .map(|window| window.iter().collect::<String>().trim().to_string())
        .filter(|piece| !piece.is_empty())
        .collect()
}
