//! Fixed-window text chunker with overlap.
//!
//! Splits extracted document text into [`Chunk`]s of at most `chunk_size`
//! characters. Consecutive chunks share exactly `chunk_overlap` characters,
//! so text that crosses a chunk boundary is still retrievable as a whole
//! from one of the two neighbours. Only the final chunk may be shorter.
//!
//! Sizes are measured in Unicode scalar values, never in bytes, so a window
//! never splits a multi-byte character.
//!
//! # Algorithm
//!
//! 1. Join page texts with a blank line, remembering where each page starts.
//! 2. Emit the window `[start, start + chunk_size)`.
//! 3. Advance `start` by `chunk_size - chunk_overlap` until a window reaches
//!    the end of the text.
//!
//! Dropping the first `chunk_overlap` characters of every chunk after the
//! first and concatenating the rest reproduces the joined text exactly.
//!
//! # Example
//!
//! ```rust
//! use pdf_assistant::chunk::chunk_text;
//!
//! let chunks = chunk_text("Hello world.", 512, 128);
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].chunk_index, 0);
//! ```

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::Chunk;

/// Separator inserted between consecutive pages.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Chunk a single text, attributing every chunk to page 1.
pub fn chunk_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<Chunk> {
    chunk_pages(&[text], chunk_size, chunk_overlap)
}

/// Chunk the concatenation of `pages` (in order).
///
/// Returns an empty vector when the pages hold no non-whitespace text.
/// Each chunk records the 1-based page of its first character.
pub fn chunk_pages<S: AsRef<str>>(
    pages: &[S],
    chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<Chunk> {
    let (text, page_starts) = join_pages(pages);
    if text.trim().is_empty() {
        return Vec::new();
    }

    let chunk_size = chunk_size.max(1);
    let chunk_overlap = chunk_overlap.min(chunk_size - 1);
    let step = chunk_size - chunk_overlap;

    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0usize;
    let mut chunk_index: i64 = 0;

    loop {
        let end = (start + chunk_size).min(chars.len());
        let piece: String = chars[start..end].iter().collect();
        let page = page_for_offset(&page_starts, start);
        chunks.push(make_chunk(chunk_index, page, &piece));

        if end == chars.len() {
            break;
        }
        start += step;
        chunk_index += 1;
    }

    chunks
}

/// Join pages with [`PAGE_SEPARATOR`], returning the text and the char
/// offset at which each page begins.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> (String, Vec<usize>) {
    let mut text = String::new();
    let mut page_starts = Vec::with_capacity(pages.len());
    let mut offset = 0usize;

    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            text.push_str(PAGE_SEPARATOR);
            offset += PAGE_SEPARATOR.chars().count();
        }
        page_starts.push(offset);
        let page = page.as_ref();
        text.push_str(page);
        offset += page.chars().count();
    }

    (text, page_starts)
}

/// Rebuild the joined text from chunks by dropping each overlap.
pub fn reassemble(chunks: &[Chunk], chunk_overlap: usize) -> String {
    let mut out = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        if i == 0 {
            out.push_str(&chunk.text);
        } else {
            out.extend(chunk.text.chars().skip(chunk_overlap));
        }
    }
    out
}

fn page_for_offset(page_starts: &[usize], offset: usize) -> u32 {
    let pages_started = page_starts.partition_point(|&s| s <= offset);
    pages_started.max(1) as u32
}

/// Create a single [`Chunk`] with a UUID and SHA-256 content hash.
fn make_chunk(index: i64, page: u32, text: &str) -> Chunk {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    Chunk {
        id: Uuid::new_v4().to_string(),
        chunk_index: index,
        page,
        text: text.to_string(),
        hash,
    }
}
