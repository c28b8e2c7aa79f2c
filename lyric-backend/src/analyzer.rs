//! Tokenizer adapter over the Kiwi Korean morphological analyzer.
//!
//! Kiwi's handles are not thread-safe, so the analyzer lives on its own
//! worker thread and requests are funneled through a channel. Analyzer
//! failures are wrapped in [`AnalyzeError`] and surfaced to the caller
//! instead of tearing down the request.

use std::sync::mpsc;

use anyhow::Context;
use lyric_utils::{PartOfSpeech, Token};

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("morphological analyzer failure: {0}")]
    Analyzer(String),
    #[error("morphological analyzer worker is not running")]
    WorkerGone,
}

pub trait Analyzer: Send + Sync + 'static {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>, AnalyzeError>;
}

/// Map one Kiwi morpheme (lemmatized form plus Sejong tag) to a domain
/// token. Verbs and adjectives come out of Kiwi as bare stems, so the
/// dictionary citation form is restored by appending 다.
pub fn token_from_tagged(form: &str, tag: &str) -> Token {
    let pos = if tag.starts_with("NN") {
        PartOfSpeech::Noun
    } else if tag.starts_with("VV") || tag.starts_with("VX") {
        PartOfSpeech::Verb
    } else if tag.starts_with("VA") {
        PartOfSpeech::Adjective
    } else if tag == "MAG" || tag == "MAJ" {
        PartOfSpeech::Adverb
    } else {
        PartOfSpeech::Other
    };

    let surface = match pos {
        PartOfSpeech::Verb | PartOfSpeech::Adjective if !form.ends_with('다') => {
            format!("{form}다")
        }
        _ => form.to_string(),
    };

    Token::new(surface, pos)
}

struct Job {
    text: String,
    reply: mpsc::Sender<Result<Vec<Token>, AnalyzeError>>,
}

/// Production analyzer. One Kiwi instance, owned by a dedicated thread for
/// the lifetime of the process.
pub struct KiwiAnalyzer {
    jobs: mpsc::Sender<Job>,
}

impl KiwiAnalyzer {
    /// Start the worker thread and initialize Kiwi on it. Initialization
    /// errors are reported here rather than on the first request.
    pub fn spawn() -> anyhow::Result<Self> {
        let (jobs, job_rx) = mpsc::channel::<Job>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();

        std::thread::Builder::new()
            .name("kiwi-analyzer".to_string())
            .spawn(move || {
                let kiwi = match kiwi_rs::Kiwi::init() {
                    Ok(kiwi) => {
                        let _ = ready_tx.send(Ok(()));
                        kiwi
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };

                while let Ok(Job { text, reply }) = job_rx.recv() {
                    let result = kiwi
                        .tokenize(&text)
                        .map(|tokens| {
                            tokens
                                .iter()
                                .map(|t| token_from_tagged(&t.form, &t.tag))
                                .collect()
                        })
                        .map_err(|e| AnalyzeError::Analyzer(e.to_string()));
                    let _ = reply.send(result);
                }
            })
            .context("failed to spawn the analyzer worker thread")?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self { jobs }),
            Ok(Err(e)) => Err(anyhow::anyhow!("failed to initialize Kiwi: {e}")),
            Err(_) => Err(anyhow::anyhow!("analyzer worker exited during startup")),
        }
    }
}

impl Analyzer for KiwiAnalyzer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>, AnalyzeError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.jobs
            .send(Job {
                text: text.to_string(),
                reply: reply_tx,
            })
            .map_err(|_| AnalyzeError::WorkerGone)?;
        reply_rx.recv().map_err(|_| AnalyzeError::WorkerGone)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noun_tags_map_to_noun() {
        assert_eq!(
            token_from_tagged("사랑", "NNG"),
            Token::new("사랑", PartOfSpeech::Noun)
        );
        assert_eq!(
            token_from_tagged("서울", "NNP"),
            Token::new("서울", PartOfSpeech::Noun)
        );
    }

    #[test]
    fn test_verb_stem_gets_citation_form() {
        assert_eq!(
            token_from_tagged("사랑하", "VV"),
            Token::new("사랑하다", PartOfSpeech::Verb)
        );
        // Auxiliary verbs count as verbs too.
        assert_eq!(
            token_from_tagged("있", "VX"),
            Token::new("있다", PartOfSpeech::Verb)
        );
    }

    #[test]
    fn test_adjective_stem_gets_citation_form() {
        assert_eq!(
            token_from_tagged("예쁘", "VA"),
            Token::new("예쁘다", PartOfSpeech::Adjective)
        );
    }

    #[test]
    fn test_citation_form_not_doubled() {
        // Some dictionary entries already carry the 다 ending.
        assert_eq!(token_from_tagged("사랑하다", "VV").surface, "사랑하다");
    }

    #[test]
    fn test_adverb_tags() {
        assert_eq!(token_from_tagged("너무", "MAG").pos, PartOfSpeech::Adverb);
        assert_eq!(token_from_tagged("그러나", "MAJ").pos, PartOfSpeech::Adverb);
    }

    #[test]
    fn test_particles_and_endings_are_other() {
        assert_eq!(token_from_tagged("는", "JX").pos, PartOfSpeech::Other);
        assert_eq!(token_from_tagged("를", "JKO").pos, PartOfSpeech::Other);
        assert_eq!(token_from_tagged("어", "EF").pos, PartOfSpeech::Other);
        // The surface of a non-predicate never gains an ending.
        assert_eq!(token_from_tagged("는", "JX").surface, "는");
    }
}
