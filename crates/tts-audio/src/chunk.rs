// SPDX-License-Identifier: MIT

//! Text chunking (`spec.md` §8's testable property: concatenation of
//! chunks, with single spaces rejoined, equals whitespace-normalized
//! input; no chunk longer than the configured maximum).
//!
//! A direct port of `original_source/src/local_tts/service.py::split_text`:
//! split on sentence boundaries first, then fall back to word boundaries,
//! then to raw character runs for a single word longer than the limit.
//! Rust's `regex` crate has no lookbehind, so the sentence splitter matches
//! `[.!?]\s+` and keeps everything up to (and including) the punctuation
//! character rather than relying on `(?<=[.!?])\s+` as the Python original
//! does — same split points, since only the trailing whitespace is
//! discarded either way.

use regex::Regex;
use std::sync::OnceLock;

/// Default maximum chunk length, matching the Python original.
pub const MAX_CHUNK_LENGTH: usize = 200;

fn sentence_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]\s+").expect("static regex is valid"))
}

/// Split `text` into chunks no longer than [`MAX_CHUNK_LENGTH`], preferring
/// sentence boundaries, falling back to word boundaries, and finally to
/// fixed-size slices of a single over-long word.
pub fn chunk_text(text: &str) -> Vec<String> {
    chunk_text_with_max(text, MAX_CHUNK_LENGTH)
}

/// Same as [`chunk_text`] with an explicit maximum, for testing the
/// algorithm's shape independent of the production constant.
pub fn chunk_text_with_max(text: &str, max_length: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let normalized = normalize_whitespace(text);
    if normalized.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(&normalized) {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }

        if current.len() + sentence.len() + 1 <= max_length {
            current.push_str(sentence);
            current.push(' ');
            continue;
        }

        if !current.is_empty() {
            chunks.push(current.trim().to_string());
            current.clear();
        }

        if sentence.len() > max_length {
            current = chunk_long_sentence(sentence, max_length, &mut chunks);
        } else {
            current = format!("{sentence} ");
        }
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim().to_string());
    }

    chunks
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut last = 0;
    for m in sentence_boundary().find_iter(text) {
        let boundary = m.start() + 1;
        sentences.push(text[last..boundary].to_string());
        last = m.end();
    }
    if last < text.len() {
        sentences.push(text[last..].to_string());
    }
    sentences
}

/// Split a single sentence longer than `max_length` on word boundaries,
/// and a single word longer than `max_length` into fixed-size slices.
/// Completed chunks are pushed directly into `chunks`; the trailing
/// in-progress chunk is returned for the caller to continue accumulating.
fn chunk_long_sentence(sentence: &str, max_length: usize, chunks: &mut Vec<String>) -> String {
    let mut temp = String::new();

    for word in sentence.split(' ') {
        if word.is_empty() {
            continue;
        }

        if word.chars().count() > max_length {
            let chars: Vec<char> = word.chars().collect();
            for sub in chars.chunks(max_length) {
                let sub_word: String = sub.iter().collect();
                push_word(&mut temp, &sub_word, max_length, chunks);
            }
        } else {
            push_word(&mut temp, word, max_length, chunks);
        }
    }

    temp
}

fn push_word(temp: &mut String, word: &str, max_length: usize, chunks: &mut Vec<String>) {
    if temp.len() + word.len() + 1 <= max_length {
        temp.push_str(word);
        temp.push(' ');
    } else {
        if !temp.trim().is_empty() {
            chunks.push(temp.trim().to_string());
        }
        *temp = format!("{word} ");
    }
}

#[cfg(test)]
#[path = "chunk_tests.rs"]
mod tests;
