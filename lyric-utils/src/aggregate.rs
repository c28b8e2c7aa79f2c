//! Frequency aggregation over analyzer tokens.
//!
//! Tokens are filtered to content words of a minimum length, grouped by
//! (word, part of speech) and sorted by count descending. Ties keep
//! first-occurrence order, which makes the output deterministic for a given
//! token sequence.

use std::cmp::Reverse;

use indexmap::IndexMap;

use crate::{PartOfSpeech, Token, WordCount};

/// Minimum surface length for a token to enter the frequency table. Length 1
/// would let stray single-syllable fragments through, so two characters is
/// the default.
pub const DEFAULT_MIN_CHARS: usize = 2;

fn passes_filter(token: &Token, min_chars: usize) -> bool {
    token.pos.is_content_word() && token.surface.chars().count() >= min_chars
}

/// Count the tokens that survive the content-word and length filter.
pub fn filtered_token_count(tokens: &[Token], min_chars: usize) -> usize {
    tokens.iter().filter(|t| passes_filter(t, min_chars)).count()
}

/// Group filtered tokens by (word, part of speech) and count occurrences.
pub fn aggregate(tokens: &[Token], min_chars: usize) -> Vec<WordCount> {
    let mut groups: IndexMap<(&str, PartOfSpeech), u32> = IndexMap::new();
    for token in tokens.iter().filter(|t| passes_filter(t, min_chars)) {
        *groups.entry((token.surface.as_str(), token.pos)).or_insert(0) += 1;
    }

    let mut counts: Vec<WordCount> = groups
        .into_iter()
        .map(|((word, pos), count)| WordCount {
            word: word.to_string(),
            pos,
            count,
        })
        .collect();

    // Stable sort, so equal counts keep the first-occurrence order the
    // IndexMap preserved.
    counts.sort_by_key(|entry| Reverse(entry.count));
    counts
}

/// The head of the frequency table, for chart rendering.
pub fn top_n(counts: &[WordCount], n: usize) -> &[WordCount] {
    &counts[..counts.len().min(n)]
}
