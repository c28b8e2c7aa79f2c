pub mod aggregate;
pub mod grammar;
pub mod quiz;
pub mod report;

/// Languages a study session can translate lyrics into (or out of).
#[derive(
    Clone, Copy, Debug, serde::Serialize, serde::Deserialize, Hash, Eq, PartialEq, Ord, PartialOrd,
)]
pub enum Language {
    Korean,
    English,
    French,
    Spanish,
    German,
    Japanese,
    Chinese,
}

impl Language {
    pub fn iso_639_1(&self) -> &'static str {
        match self {
            Language::Korean => "ko",
            Language::English => "en",
            Language::French => "fr",
            Language::Spanish => "es",
            Language::German => "de",
            Language::Japanese => "ja",
            Language::Chinese => "zh",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let word = match self {
            Language::Korean => "Korean",
            Language::English => "English",
            Language::French => "French",
            Language::Spanish => "Spanish",
            Language::German => "German",
            Language::Japanese => "Japanese",
            Language::Chinese => "Chinese",
        };
        write!(f, "{word}")
    }
}

#[derive(
    Clone, Copy, Debug, serde::Serialize, serde::Deserialize, Hash, Eq, PartialEq, Ord, PartialOrd,
)]
pub enum PartOfSpeech {
    #[serde(rename = "NOUN")]
    Noun,
    #[serde(rename = "VERB")]
    Verb,
    #[serde(rename = "ADJ")]
    Adjective,
    #[serde(rename = "ADV")]
    Adverb,
    #[serde(rename = "X")]
    Other,
}

impl PartOfSpeech {
    /// The content-word categories the frequency table is built from.
    pub const CONTENT_WORDS: [PartOfSpeech; 4] = [
        PartOfSpeech::Noun,
        PartOfSpeech::Verb,
        PartOfSpeech::Adjective,
        PartOfSpeech::Adverb,
    ];

    pub fn is_content_word(&self) -> bool {
        Self::CONTENT_WORDS.contains(self)
    }

    /// Korean label used in reports and quiz options.
    pub fn korean_label(&self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "명사",
            PartOfSpeech::Verb => "동사",
            PartOfSpeech::Adjective => "형용사",
            PartOfSpeech::Adverb => "부사",
            PartOfSpeech::Other => "기타",
        }
    }
}

impl std::fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let word = match self {
            PartOfSpeech::Noun => "noun",
            PartOfSpeech::Verb => "verb",
            PartOfSpeech::Adjective => "adjective",
            PartOfSpeech::Adverb => "adverb",
            PartOfSpeech::Other => "other",
        };
        write!(f, "{word}")
    }
}

/// One lemmatized token as produced by the morphological analyzer.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, Eq, PartialEq, Ord, PartialOrd)]
pub struct Token {
    pub surface: String,
    pub pos: PartOfSpeech,
}

impl Token {
    pub fn new(surface: impl Into<String>, pos: PartOfSpeech) -> Self {
        Self {
            surface: surface.into(),
            pos,
        }
    }
}

/// Frequency of one (word, part-of-speech) pair. The sum of all counts in an
/// aggregation equals the number of tokens that survived filtering.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, Eq, PartialEq, Ord, PartialOrd)]
pub struct WordCount {
    pub word: String,
    pub pos: PartOfSpeech,
    pub count: u32,
}

impl WordCount {
    /// Lookup link for the word on Naver's Korean dictionary. The word is
    /// inserted verbatim; downstream display code owns any escaping.
    pub fn dictionary_url(&self) -> String {
        format!("https://ko.dict.naver.com/#/search?query={}", self.word)
    }
}

/// Sentinel shown in place of a translation when the adapter failed.
pub const TRANSLATION_ERROR_SENTINEL: &str = "Translation Error";

/// The outcome of translating one line. A failure is a first-class value so
/// that one bad line never aborts the rest of the analysis.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum Translation {
    Text(String),
    Failed,
}

impl Translation {
    pub fn as_str(&self) -> &str {
        match self {
            Translation::Text(text) => text,
            Translation::Failed => TRANSLATION_ERROR_SENTINEL,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Translation::Failed)
    }
}

impl serde::Serialize for Translation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Translation {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text == TRANSLATION_ERROR_SENTINEL {
            Ok(Translation::Failed)
        } else {
            Ok(Translation::Text(text))
        }
    }
}

/// One line of the bilingual transcript.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, Eq, PartialEq)]
pub struct TranslatedLine {
    pub source: String,
    pub translated: Translation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dictionary_url_is_verbatim() {
        let wc = WordCount {
            word: "사랑하다".to_string(),
            pos: PartOfSpeech::Verb,
            count: 2,
        };
        assert_eq!(
            wc.dictionary_url(),
            "https://ko.dict.naver.com/#/search?query=사랑하다"
        );
    }

    #[test]
    fn test_dictionary_url_keeps_reserved_characters() {
        // The contract is no transformation of the word, even when it holds
        // characters that are reserved in URLs.
        let wc = WordCount {
            word: "A&B?".to_string(),
            pos: PartOfSpeech::Noun,
            count: 1,
        };
        assert_eq!(
            wc.dictionary_url(),
            "https://ko.dict.naver.com/#/search?query=A&B?"
        );
    }

    #[test]
    fn test_translation_serializes_to_sentinel() {
        let line = TranslatedLine {
            source: "사랑해".to_string(),
            translated: Translation::Failed,
        };
        let json = serde_json::to_string(&line).unwrap();
        assert!(json.contains("Translation Error"));

        let back: TranslatedLine = serde_json::from_str(&json).unwrap();
        assert!(back.translated.is_failed());
    }

    #[test]
    fn test_translation_roundtrip_text() {
        let t = Translation::Text("I love you".to_string());
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"I love you\"");
        let back: Translation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_content_word_allow_list() {
        assert!(PartOfSpeech::Noun.is_content_word());
        assert!(PartOfSpeech::Adverb.is_content_word());
        assert!(!PartOfSpeech::Other.is_content_word());
    }
}
