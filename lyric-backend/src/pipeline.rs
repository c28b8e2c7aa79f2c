//! The analysis pipeline: tokenize, aggregate, translate.
//!
//! Outcomes are memoized by an xxh3 hash of the input text and options, so
//! re-analyzing unchanged lyrics reuses the previous result instead of
//! calling the analyzer and the translation backend again.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use lyric_utils::aggregate::{DEFAULT_MIN_CHARS, aggregate, filtered_token_count};
use lyric_utils::{Language, Token, TranslatedLine, WordCount};
use xxhash_rust::xxh3::xxh3_64;

use crate::analyzer::{AnalyzeError, Analyzer};
use crate::translate::{Translator, translate_lines};

#[derive(Clone, Copy, Debug)]
pub struct AnalyzeOptions {
    pub target_language: Language,
    pub min_chars: usize,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            target_language: Language::English,
            min_chars: DEFAULT_MIN_CHARS,
        }
    }
}

/// Immutable result of one analysis, shared between the memo cache and any
/// sessions pointing at it.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub input_hash: u64,
    pub line_count: usize,
    pub token_count: usize,
    pub filtered_count: usize,
    pub word_counts: Vec<WordCount>,
    pub lines: Vec<TranslatedLine>,
}

/// Memoized outcomes live on the same clock as sessions. Without a TTL the
/// cache would pin every distinct lyric ever analyzed for the life of the
/// process.
pub const MEMO_TTL: Duration = Duration::from_secs(60 * 60);

pub struct MemoCache {
    outcomes: DashMap<u64, (Instant, Arc<AnalysisOutcome>)>,
    ttl: Duration,
}

impl MemoCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            outcomes: DashMap::new(),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Lookup with lazy expiry: stale entries are removed on the way out.
    fn get(&self, hash: u64) -> Option<Arc<AnalysisOutcome>> {
        let fresh = {
            let entry = self.outcomes.get(&hash)?;
            let (inserted_at, outcome) = entry.value();
            (inserted_at.elapsed() <= self.ttl).then(|| outcome.clone())
        };
        if fresh.is_none() {
            self.outcomes.remove(&hash);
        }
        fresh
    }

    fn insert(&self, hash: u64, outcome: Arc<AnalysisOutcome>) {
        self.outcomes.insert(hash, (Instant::now(), outcome));
    }
}

/// Memoization key over the input text and everything that changes the
/// outcome.
pub fn input_hash(text: &str, opts: &AnalyzeOptions) -> u64 {
    let hash_input = format!(
        "{}::{}::{text}",
        opts.target_language.iso_639_1(),
        opts.min_chars
    );
    xxh3_64(hash_input.as_bytes())
}

pub async fn run_analysis<A: Analyzer, T: Translator>(
    analyzer: &A,
    translator: &T,
    memo: &MemoCache,
    text: &str,
    opts: AnalyzeOptions,
) -> Result<Arc<AnalysisOutcome>, AnalyzeError> {
    let hash = input_hash(text, &opts);
    if let Some(outcome) = memo.get(hash) {
        log::debug!("analysis cache hit for input hash {hash}");
        return Ok(outcome);
    }

    let tokens: Vec<Token> = analyzer.tokenize(text)?;
    let word_counts = aggregate(&tokens, opts.min_chars);
    let filtered_count = filtered_token_count(&tokens, opts.min_chars);
    let lines = translate_lines(translator, text, opts.target_language).await;

    let outcome = Arc::new(AnalysisOutcome {
        input_hash: hash,
        line_count: lines.len(),
        token_count: tokens.len(),
        filtered_count,
        word_counts,
        lines,
    });
    memo.insert(hash, outcome.clone());
    Ok(outcome)
}
