//! Overlapping, sentence-aware text chunker.
//!
//! Splits document body text into windows of at most `chunk_size`
//! characters. Consecutive windows share `overlap` characters so that a
//! passage cut at a boundary is still readable in full from one side.
//!
//! # Algorithm
//!
//! 1. Text no longer than `chunk_size` becomes a single (trimmed) chunk.
//! 2. Otherwise a window `[start, start + chunk_size)` is carved out.
//! 3. If the window ends before the text does, its end is pulled back to
//!    just after the last `.` inside the window, provided that period lies
//!    within the final 100 characters. Only `.` counts as a sentence end.
//! 4. The window is trimmed and kept if anything is left.
//! 5. The cursor moves to `end - overlap`; chunking stops once the cursor
//!    reaches the end of the text.
//!
//! Positions are counted in `char`s, never bytes, so multi-byte text is
//! never split inside a character.
//!
//! # Example
//!
//! ```rust
//! use docqa_core::chunk::{chunk_text, ChunkConfig};
//!
//! let chunks = chunk_text("Hello world.", &ChunkConfig::default()).unwrap();
//! assert_eq!(chunks, vec!["Hello world.".to_string()]);
//! ```

use crate::models::Chunk;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_OVERLAP: usize = 200;

/// A `.` further than this from the window end does not move the window end.
const SENTENCE_SNAP_WINDOW: usize = 100;

/// Window size and overlap, both in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl ChunkConfig {
    /// Build a validated configuration.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, ChunkError> {
        let config = Self {
            chunk_size,
            overlap,
        };
        config.validate()?;
        Ok(config)
    }

    /// Requires `chunk_size > 0` and `overlap < chunk_size`.
    pub fn validate(&self) -> Result<(), ChunkError> {
        if self.chunk_size == 0 || self.overlap >= self.chunk_size {
            return Err(ChunkError::InvalidConfiguration {
                chunk_size: self.chunk_size,
                overlap: self.overlap,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChunkError {
    #[error(
        "invalid chunking configuration: chunk_size ({chunk_size}) must be > 0 and overlap ({overlap}) must be smaller than chunk_size"
    )]
    InvalidConfiguration { chunk_size: usize, overlap: usize },
}

/// Split text into overlapping chunks.
///
/// Blank text yields an empty vector. Every returned chunk is trimmed and
/// non-empty.
///
/// # Errors
///
/// [`ChunkError::InvalidConfiguration`] when `overlap >= chunk_size` or
/// `chunk_size == 0`. This is checked before looking at the text.
pub fn chunk_text(text: &str, config: &ChunkConfig) -> Result<Vec<String>, ChunkError> {
    config.validate()?;
    let ChunkConfig {
        chunk_size,
        overlap,
    } = *config;

    // Byte offset of every char plus the end of the text, so windows are
    // measured in chars but sliced as `&str`.
    let offsets: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let len = offsets.len() - 1;

    if len <= chunk_size {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }
        return Ok(vec![trimmed.to_string()]);
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < len {
        let mut end = start + chunk_size;

        if end < len {
            if let Some(period) = last_period(text, &offsets, start, end) {
                if period + SENTENCE_SNAP_WINDOW > start + chunk_size {
                    end = period + 1;
                }
            }
        }

        let piece = text[offsets[start]..offsets[end.min(len)]].trim();
        if !piece.is_empty() {
            chunks.push(piece.to_string());
        }

        // A snapped window can end so early that stepping back by `overlap`
        // would not move the cursor forward.
        let next = end.saturating_sub(overlap);
        start = if next > start { next } else { end };
    }

    Ok(chunks)
}

/// Chunk a document body into [`Chunk`] records with indices `0..N`.
pub fn chunk_document(
    document_id: &str,
    text: &str,
    config: &ChunkConfig,
) -> Result<Vec<Chunk>, ChunkError> {
    Ok(chunk_text(text, config)?
        .into_iter()
        .enumerate()
        .map(|(i, text)| Chunk {
            document_id: document_id.to_string(),
            chunk_index: i as i64,
            text,
        })
        .collect())
}

/// Char position of the last `.` in the char range `[start, end)`.
fn last_period(text: &str, offsets: &[usize], start: usize, end: usize) -> Option<usize> {
    let window = &text[offsets[start]..offsets[end]];
    let byte_pos = offsets[start] + window.rfind('.')?;
    offsets.binary_search(&byte_pos).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(chunk_size: usize, overlap: usize) -> ChunkConfig {
        ChunkConfig::new(chunk_size, overlap).unwrap()
    }

    #[test]
    fn test_small_text_single_chunk() {
        let chunks = chunk_text("  Hello, world!  ", &ChunkConfig::default()).unwrap();
        assert_eq!(chunks, vec!["Hello, world!".to_string()]);
    }

    #[test]
    fn test_empty_text() {
        assert!(chunk_text("", &ChunkConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn test_whitespace_only_text() {
        assert!(chunk_text(" \n\t  ", &ChunkConfig::default())
            .unwrap()
            .is_empty());
        let long_blank = " ".repeat(2500);
        assert!(chunk_text(&long_blank, &ChunkConfig::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk_size() {
        let bad = ChunkConfig {
            chunk_size: 100,
            overlap: 100,
        };
        let err = chunk_text("short", &bad).unwrap_err();
        assert_eq!(
            err,
            ChunkError::InvalidConfiguration {
                chunk_size: 100,
                overlap: 100
            }
        );
        assert!(ChunkConfig::new(10, 20).is_err());
        assert!(ChunkConfig::new(0, 0).is_err());
        assert!(ChunkConfig::new(10, 9).is_ok());
    }

    #[test]
    fn test_1500_chars_gives_two_chunks() {
        let text = "A. ".repeat(500);
        assert_eq!(text.len(), 1500);
        let chunks = chunk_text(&text, &cfg(1000, 200)).unwrap();
        assert_eq!(chunks.len(), 2);

        // Window end snaps to just after the last '.' before char 1000 (at 997).
        assert_eq!(chunks[0], text[..998].trim());
        assert!(chunks[0].ends_with('.'));

        // Second window starts 200 chars before the first one ended.
        assert_eq!(chunks[1], text[798..].trim());
    }

    #[test]
    fn test_no_period_splits_at_exact_window() {
        let text = "x".repeat(2500);
        let chunks = chunk_text(&text, &cfg(1000, 200)).unwrap();
        let lens: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        // Windows: [0,1000) [800,1800) [1600,2500) [2400,2500)
        assert_eq!(lens, vec![1000, 1000, 900, 100]);
    }

    #[test]
    fn test_period_too_early_does_not_snap() {
        let mut text = String::from("Intro.");
        text.push_str(&"y".repeat(1994));
        let chunks = chunk_text(&text, &cfg(1000, 200)).unwrap();
        assert_eq!(chunks[0].chars().count(), 1000);
    }

    #[test]
    fn test_question_mark_is_not_a_boundary() {
        let mut text = "z".repeat(950);
        text.push('?');
        text.push_str(&"z".repeat(600));
        let chunks = chunk_text(&text, &cfg(1000, 200)).unwrap();
        assert_eq!(chunks[0].chars().count(), 1000);
    }

    #[test]
    fn test_multibyte_utf8_chars() {
        let text = "é".repeat(30);
        let chunks = chunk_text(&text, &cfg(10, 3)).unwrap();
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.chars().count() <= 10);
            assert!(c.chars().all(|ch| ch == 'é'));
        }
    }

    #[test]
    fn test_small_chunk_size_with_snapping_terminates() {
        let text = "a.b.c.d.e.f.g.h.i.j.k.l.m.n.o.p";
        let chunks = chunk_text(text, &cfg(5, 4)).unwrap();
        assert!(!chunks.is_empty());
        assert!(chunks.last().unwrap().ends_with('p'));
    }

    #[test]
    fn test_chunk_document_indices_contiguous() {
        let text = (0..200)
            .map(|i| format!("Sentence number {}.", i))
            .collect::<Vec<_>>()
            .join(" ");
        let chunks = chunk_document("doc1", &text, &cfg(300, 50)).unwrap();
        assert!(chunks.len() > 1);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.chunk_index, i as i64);
            assert_eq!(c.document_id, "doc1");
        }
    }

    #[test]
    fn test_deterministic() {
        let text = "Alpha beta. Gamma delta. ".repeat(100);
        let c1 = chunk_text(&text, &cfg(120, 30)).unwrap();
        let c2 = chunk_text(&text, &cfg(120, 30)).unwrap();
        assert_eq!(c1, c2);
    }
}
