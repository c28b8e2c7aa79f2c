//! Translation adapter.
//!
//! Wraps the Google Cloud Translation v2 endpoint with an in-memory cache
//! keyed by an xxh3 hash of (source, target, text). Per-line failures are
//! non-fatal: [`translate_lines`] substitutes the error sentinel and keeps
//! going, so an unreachable translation backend never aborts an analysis.

use std::time::Duration;

use anyhow::Context;
use dashmap::DashMap;
use html_escape::decode_html_entities;
use lyric_utils::{Language, TranslatedLine, Translation};
use xxhash_rust::xxh3::xxh3_64;

pub trait Translator: Send + Sync + 'static {
    fn translate(
        &self,
        text: &str,
        dest: Language,
    ) -> impl Future<Output = anyhow::Result<String>> + Send;
}

/// Outbound request timeout, so a stalled translation backend cannot hang
/// an analysis indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct GoogleTranslator {
    client: reqwest::Client,
    source_language: String,
    api_key: String,
    cache: DashMap<u64, String>,
}

impl GoogleTranslator {
    pub fn new(source_language: Language) -> anyhow::Result<Self> {
        let api_key = std::env::var("GOOGLE_TRANSLATE_API_KEY")
            .context("GOOGLE_TRANSLATE_API_KEY not set")?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build the translation HTTP client")?;

        Ok(Self {
            client,
            source_language: source_language.iso_639_1().to_string(),
            api_key,
            cache: DashMap::new(),
        })
    }

    /// An empty translation means the response was malformed or an error
    /// payload; caching it would pin the failure past a backend recovery.
    fn remember(&self, hash: u64, translated: &str) {
        if !translated.is_empty() {
            self.cache.insert(hash, translated.to_string());
        }
    }
}

impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, dest: Language) -> anyhow::Result<String> {
        let target = dest.iso_639_1();
        let hash_input = format!("{}::{}::{text}", self.source_language, target);
        let hash = xxh3_64(hash_input.as_bytes());

        if let Some(t) = self.cache.get(&hash) {
            return Ok(t.clone());
        }

        let url = format!(
            "https://translation.googleapis.com/language/translate/v2?key={}",
            self.api_key
        );
        let resp = self
            .client
            .post(&url)
            .form(&[
                ("q", text),
                ("source", self.source_language.as_str()),
                ("target", target),
                ("format", "text"),
            ])
            .send()
            .await
            .context("Failed to call Google Translate API")?;
        let value: serde_json::Value = resp
            .json()
            .await
            .context("Failed to parse Google Translate response")?;
        let translated = value["data"]["translations"][0]["translatedText"]
            .as_str()
            .unwrap_or("")
            .to_string();
        let translated = decode_html_entities(&translated).to_string();

        self.remember(hash, &translated);
        Ok(translated)
    }
}

/// Translate every non-empty line of the input. Adapter errors (and empty
/// responses) become [`Translation::Failed`] for that line only.
pub async fn translate_lines<T: Translator>(
    translator: &T,
    text: &str,
    dest: Language,
) -> Vec<TranslatedLine> {
    let mut lines = Vec::new();
    for source in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let translated = match translator.translate(source, dest).await {
            Ok(translated) if !translated.is_empty() => Translation::Text(translated),
            Ok(_) => {
                log::warn!("empty translation for line '{source}'");
                Translation::Failed
            }
            Err(e) => {
                log::warn!("translation failed for line '{source}': {e:#}");
                Translation::Failed
            }
        };
        lines.push(TranslatedLine {
            source: source.to_string(),
            translated,
        });
    }
    lines
}
