use serde::{Deserialize, Serialize};

use crate::domain::entities::{Chunk, Document};

/// How a document is split into bounded segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStrategy {
    /// Sliding window of `chunk_size` characters advancing by
    /// `chunk_size - chunk_overlap`, ignoring all text boundaries.
    FixedWindow,
    /// Tiered split: markdown headings, then paragraph packing, then
    /// sentence packing, with a hard window only for a single sentence
    /// that no boundary can bound.
    BoundaryAware,
}

/// Chunking parameters, validated at the configuration edge:
/// `chunk_overlap` must stay below `chunk_size`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkingConfig {
    pub strategy: ChunkStrategy,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

/// Split `text` into non-empty segments of at most `chunk_size` characters.
///
/// All sizes are character counts, not bytes. Never fails: pathological
/// input falls through to the hard sliding window, so any non-empty text
/// yields at least one segment.
pub fn chunk_text(
    text: &str,
    strategy: ChunkStrategy,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<String> {
    if text.trim().is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    match strategy {
        ChunkStrategy::FixedWindow => hard_window(text, chunk_size, chunk_overlap)
            .into_iter()
            .filter(|w| !w.trim().is_empty())
            .collect(),
        ChunkStrategy::BoundaryAware => chunk_boundary_aware(text, chunk_size, chunk_overlap),
    }
}

/// Split a document and wrap the segments as ordered [`Chunk`]s carrying
/// the document's metadata.
pub fn chunk_document(
    document: &Document,
    strategy: ChunkStrategy,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<Chunk> {
    chunk_text(&document.text, strategy, chunk_size, chunk_overlap)
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk::new(text, index, document.metadata.clone()))
        .collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Tier 4: fixed window over characters, advancing by `chunk_size - chunk_overlap`.
///
/// The loop ends the first time a window reaches the end of the text, so the
/// final window may be shorter than `chunk_size` but never duplicates a
/// fully-covered tail.
fn hard_window(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let step = chunk_size.saturating_sub(chunk_overlap).max(1);
    let mut windows = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + chunk_size).min(chars.len());
        windows.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }

    windows
}

/// Tiers 1-3: headings, then paragraph packing, then sentence packing.
fn chunk_boundary_aware(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();

    for section in split_heading_sections(text) {
        if char_len(&section) <= chunk_size {
            chunks.push(section);
        } else {
            pack_paragraphs(&section, chunk_size, chunk_overlap, &mut chunks);
        }
    }

    chunks
}

/// A line opening a markdown section: one to six `#` followed by whitespace.
fn is_heading(line: &str) -> bool {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    (1..=6).contains(&hashes)
        && line
            .chars()
            .nth(hashes)
            .is_some_and(|c| c.is_whitespace())
}

/// Tier 1: split at heading lines, keeping each heading attached to the
/// text that follows it until the next heading.
fn split_heading_sections(text: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if is_heading(line) && !current.trim().is_empty() {
            sections.push(current.trim().to_string());
            current.clear();
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.trim().is_empty() {
        sections.push(current.trim().to_string());
    }

    sections
}

/// Tier 2: greedily pack blank-line-separated paragraphs into chunks.
///
/// A paragraph that cannot fit an empty buffer is handed to the sentence
/// tier; the running buffer is flushed first so ordering is preserved.
fn pack_paragraphs(section: &str, chunk_size: usize, chunk_overlap: usize, out: &mut Vec<String>) {
    let paragraphs: Vec<&str> = section
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let mut buffer: Vec<&str> = Vec::new();
    let mut buffer_len = 0;

    for paragraph in paragraphs {
        let len = char_len(paragraph);

        if len > chunk_size {
            if !buffer.is_empty() {
                out.push(buffer.join("\n\n"));
                buffer.clear();
                buffer_len = 0;
            }
            pack_sentences(paragraph, chunk_size, chunk_overlap, out);
            continue;
        }

        if buffer.is_empty() {
            buffer.push(paragraph);
            buffer_len = len;
        } else if buffer_len + 2 + len <= chunk_size {
            buffer.push(paragraph);
            buffer_len += 2 + len;
        } else {
            out.push(buffer.join("\n\n"));
            buffer = vec![paragraph];
            buffer_len = len;
        }
    }

    if !buffer.is_empty() {
        out.push(buffer.join("\n\n"));
    }
}

/// Sentence-ending delimiters: Chinese and Western full stops, question and
/// exclamation marks, or a newline.
fn is_sentence_end(c: char) -> bool {
    matches!(c, '。' | '！' | '？' | '.' | '!' | '?' | '\n')
}

/// Split on sentence-ending punctuation, retaining the delimiter with the
/// preceding sentence.
fn split_sentences(paragraph: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for c in paragraph.chars() {
        current.push(c);
        if is_sentence_end(c) {
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

    if sentences.is_empty() {
        sentences.push(paragraph.trim().to_string());
    }

    sentences
}

/// Tier 3: greedily pack sentences; a single sentence longer than
/// `chunk_size` falls through to the hard window.
fn pack_sentences(paragraph: &str, chunk_size: usize, chunk_overlap: usize, out: &mut Vec<String>) {
    let mut buffer = String::new();
    let mut buffer_len = 0;

    for sentence in split_sentences(paragraph) {
        let len = char_len(&sentence);

        if len > chunk_size {
            if !buffer.is_empty() {
                out.push(std::mem::take(&mut buffer));
                buffer_len = 0;
            }
            out.extend(hard_window(&sentence, chunk_size, chunk_overlap));
            continue;
        }

        if buffer_len + len <= chunk_size {
            buffer.push_str(&sentence);
            buffer_len += len;
        } else {
            out.push(std::mem::take(&mut buffer));
            buffer = sentence;
            buffer_len = len;
        }
    }

    if !buffer.is_empty() {
        out.push(buffer);
    }
}
