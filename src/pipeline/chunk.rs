//! Character-window chunking of long transcripts.
//!
//! Chunking is a pure offset computation: windows are measured in Unicode
//! scalar values (`char`s), never split a code point, and are borrowed slices
//! of the caller's text. No trimming or normalisation happens here.
//!
//! With `overlap == 0` the windows partition the text into
//! `ceil(len / chunk_size)` consecutive pieces. With `overlap > 0` a window of
//! width `chunk_size` slides forward by `chunk_size - overlap`, so every window
//! repeats the last `overlap` characters of its predecessor (the tail windows
//! may be shorter).

use crate::error::{Result, SummarizerError};
use serde::Serialize;

/// One window of the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Chunk<'a> {
    /// The window's text, borrowed from the source.
    pub text: &'a str,
    /// Start offset in characters (inclusive).
    pub start: usize,
    /// End offset in characters (exclusive).
    pub end: usize,
    /// 0-based position among its siblings.
    pub index: usize,
    /// Number of chunks produced for the source text.
    pub total: usize,
}

impl Chunk<'_> {
    /// Window length in characters.
    pub fn char_len(&self) -> usize {
        self.end - self.start
    }

    /// 1-based part number, as shown in the assembled document.
    pub fn part(&self) -> usize {
        self.index + 1
    }
}

/// Split `text` into windows of `chunk_size` characters overlapping by
/// `overlap` characters.
///
/// # Errors
/// [`SummarizerError::InvalidArgument`] when `chunk_size == 0` or
/// `overlap >= chunk_size`, regardless of `text`.
pub fn split_chunks(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<Chunk<'_>>> {
    validate(chunk_size, overlap)?;

    // Byte offset of every char boundary, including the end of the string.
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let n = boundaries.len() - 1;
    if n == 0 {
        return Ok(Vec::new());
    }

    let step = chunk_size - overlap;
    let mut ranges = Vec::with_capacity(n.div_ceil(step));
    let mut start = 0;
    while start < n {
        let end = (start + chunk_size).min(n);
        ranges.push((start, end));
        start += step;
    }

    let total = ranges.len();
    Ok(ranges
        .into_iter()
        .enumerate()
        .map(|(index, (start, end))| Chunk {
            text: &text[boundaries[start]..boundaries[end]],
            start,
            end,
            index,
            total,
        })
        .collect())
}

/// Same windows as [`split_chunks`], as plain string slices.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<&str>> {
    Ok(split_chunks(text, chunk_size, overlap)?
        .into_iter()
        .map(|c| c.text)
        .collect())
}

fn validate(chunk_size: usize, overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(SummarizerError::InvalidArgument(
            "chunk_size must be > 0".into(),
        ));
    }
    if overlap >= chunk_size {
        return Err(SummarizerError::InvalidArgument(format!(
            "overlap must be < chunk_size (got overlap {overlap}, chunk_size {chunk_size})"
        )));
    }
    Ok(())
}
