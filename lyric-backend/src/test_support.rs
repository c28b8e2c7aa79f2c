//! In-process stand-ins for the analyzer and translator, shared by the unit
//! and router tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use lyric_utils::{Language, Token};

use crate::analyzer::{AnalyzeError, Analyzer, token_from_tagged};
use crate::translate::Translator;

/// Whitespace tagger over a fixed Kiwi-style tag table.
pub(crate) struct TableAnalyzer {
    pub calls: AtomicUsize,
}

impl TableAnalyzer {
    pub(crate) fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn tag(word: &str) -> Vec<(&'static str, &'static str)> {
        match word {
            "나는" => vec![("나", "NP"), ("는", "JX")],
            "너를" => vec![("너", "NP"), ("를", "JKO")],
            "사랑해" => vec![("사랑하", "VV"), ("어", "EF")],
            "너무" => vec![("너무", "MAG")],
            "많이" => vec![("많이", "MAG")],
            "봄" => vec![("봄", "NNG")],
            "하늘" => vec![("하늘", "NNG")],
            other => {
                // Unknown words come back untagged.
                let leaked: &'static str = Box::leak(other.to_string().into_boxed_str());
                vec![(leaked, "UNK")]
            }
        }
    }

    pub(crate) fn tokenize_str(text: &str) -> Vec<Token> {
        text.split_whitespace()
            .flat_map(Self::tag)
            .map(|(form, tag)| token_from_tagged(form, tag))
            .collect()
    }
}

impl Analyzer for TableAnalyzer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>, AnalyzeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::tokenize_str(text))
    }
}

/// Translator that always succeeds and counts its calls.
pub(crate) struct CountingTranslator {
    pub calls: AtomicUsize,
}

impl CountingTranslator {
    pub(crate) fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

impl Translator for CountingTranslator {
    async fn translate(&self, text: &str, dest: Language) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{}({text})", dest.iso_639_1()))
    }
}

/// Analyzer whose dictionary failed to load; every request errors.
pub(crate) struct FailingAnalyzer;

impl Analyzer for FailingAnalyzer {
    fn tokenize(&self, _text: &str) -> Result<Vec<Token>, AnalyzeError> {
        Err(AnalyzeError::Analyzer("dictionary not loaded".to_string()))
    }
}

/// Translator whose backend is unreachable.
pub(crate) struct FailingTranslator;

impl Translator for FailingTranslator {
    async fn translate(&self, _text: &str, _dest: Language) -> anyhow::Result<String> {
        anyhow::bail!("translation backend unreachable")
    }
}
