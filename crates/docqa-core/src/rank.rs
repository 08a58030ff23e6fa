//! Keyword-overlap relevance ranking.
//!
//! A chunk's score is the number of *distinct* lowercase, whitespace-split
//! words it shares with the query. There is no term weighting and no length
//! normalization; repeating a word inside a chunk does not raise its score.
//!
//! Chunks with no shared word are dropped. The rest are ordered by
//! descending score, equal scores keeping their original chunk order, and
//! cut to `max_results`.

use std::collections::HashSet;

/// A chunk that shares at least one word with the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedChunk<'a> {
    /// Position of the chunk in the sequence handed to [`rank_chunks`].
    pub index: usize,
    /// Number of distinct words shared with the query (always `> 0`).
    pub score: usize,
    pub text: &'a str,
}

/// Rank `chunks` against `query`, most relevant first.
///
/// Never fails: an empty query, an empty chunk list, or `max_results == 0`
/// all give an empty result.
///
/// ```rust
/// use docqa_core::rank::rank_chunks;
///
/// let chunks = ["unrelated text here", "the procedure is simple", "what time is it"];
/// let ranked = rank_chunks("what is the procedure", &chunks, 2);
/// let texts: Vec<&str> = ranked.iter().map(|r| r.text).collect();
/// assert_eq!(texts, vec!["the procedure is simple", "what time is it"]);
/// ```
pub fn rank_chunks<'a, S: AsRef<str>>(
    query: &str,
    chunks: &'a [S],
    max_results: usize,
) -> Vec<RankedChunk<'a>> {
    let query_words = word_set(query);
    if query_words.is_empty() || max_results == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<RankedChunk<'a>> = chunks
        .iter()
        .enumerate()
        .filter_map(|(index, chunk)| {
            let text = chunk.as_ref();
            let score = overlap_score(&query_words, text);
            (score > 0).then_some(RankedChunk { index, score, text })
        })
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score).then(a.index.cmp(&b.index)));
    ranked.truncate(max_results);
    ranked
}

/// Lowercased, whitespace-delimited distinct words of `text`.
pub fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// Count of `query_words` that also occur in `chunk`.
pub fn overlap_score(query_words: &HashSet<String>, chunk: &str) -> usize {
    let chunk_words = word_set(chunk);
    query_words.intersection(&chunk_words).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_by_overlap_and_drops_zero_scores() {
        let chunks = vec![
            "unrelated text here".to_string(),
            "the procedure is simple".to_string(),
            "what time is it".to_string(),
        ];
        let ranked = rank_chunks("what is the procedure", &chunks, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].text, "the procedure is simple");
        assert_eq!(ranked[0].index, 1);
        assert_eq!(ranked[0].score, 3);
        assert_eq!(ranked[1].text, "what time is it");
        assert_eq!(ranked[1].score, 2);
    }

    #[test]
    fn test_zero_scores_excluded_even_under_limit() {
        let chunks = ["alpha beta", "gamma delta", "beta epsilon"];
        let ranked = rank_chunks("beta", &chunks, 10);
        let indices: Vec<usize> = ranked.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_ties_keep_original_order() {
        let chunks = ["cat one", "dog two", "cat three", "cat four"];
        let ranked = rank_chunks("cat", &chunks, 3);
        let indices: Vec<usize> = ranked.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 2, 3]);
    }

    #[test]
    fn test_repeated_words_do_not_inflate_score() {
        let chunks = ["rust rust rust rust", "rust cargo"];
        let ranked = rank_chunks("rust cargo", &chunks, 5);
        assert_eq!(ranked[0].index, 1);
        assert_eq!(ranked[0].score, 2);
        assert_eq!(ranked[1].score, 1);
    }

    #[test]
    fn test_case_insensitive() {
        let chunks = ["The PROCEDURE Is Simple"];
        let ranked = rank_chunks("procedure", &chunks, 3);
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_punctuation_is_part_of_the_word() {
        let chunks = ["the end."];
        assert!(rank_chunks("end", &chunks, 3).is_empty());
    }

    #[test]
    fn test_empty_inputs() {
        let empty: [&str; 0] = [];
        assert!(rank_chunks("anything", &empty, 3).is_empty());
        assert!(rank_chunks("   ", &["some text"], 3).is_empty());
        assert!(rank_chunks("some", &["some text"], 0).is_empty());
    }
}
