//! Character-bounded text splitting for transcripts.
//!
//! Sizes are counted in Unicode scalar values and splits always land on a
//! `char` boundary.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How transcripts are cut before summarization.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ChunkStrategy {
    /// Fixed-width windows of `max` characters.
    #[default]
    Fixed,
    /// Whole sentences packed up to `max` characters.
    Sentence,
}

impl ChunkStrategy {
    pub fn split(self, text: &str, max: usize) -> Vec<String> {
        match self {
            ChunkStrategy::Fixed => split_fixed(text, max)
                .into_iter()
                .map(str::to_owned)
                .collect(),
            ChunkStrategy::Sentence => split_sentences(text, max),
        }
    }
}

/// Split `text` into consecutive slices of at most `max` characters.
///
/// Concatenating the result yields `text` again. Empty input yields no
/// chunks.
pub fn split_fixed(text: &str, max: usize) -> Vec<&str> {
    let max = max.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == max {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

/// Split `text` after every `.` and newline, then pack the pieces greedily
/// into chunks of at most `max` characters.
///
/// A single piece longer than `max` is hard-split with [`split_fixed`].
/// Chunks are trimmed and blank chunks are dropped.
pub fn split_sentences(text: &str, max: usize) -> Vec<String> {
    let max = max.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for piece in text.split_inclusive(['.', '\n']) {
        let piece_len = piece.chars().count();
        if current_len + piece_len <= max {
            current.push_str(piece);
            current_len += piece_len;
            continue;
        }

        flush(&mut chunks, &mut current);
        current_len = 0;

        if piece_len <= max {
            current.push_str(piece);
            current_len = piece_len;
        } else {
            chunks.extend(
                split_fixed(piece, max)
                    .into_iter()
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(str::to_owned),
            );
        }
    }
    flush(&mut chunks, &mut current);
    chunks
}

fn flush(chunks: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_owned());
    }
    current.clear();
}
