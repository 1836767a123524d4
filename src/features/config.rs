//! Configuration for the count-vectors featurizer.
//!
//! Every option has a default, so a configuration file only needs to name the
//! values it changes:
//!
//! ```
//! use wordbag::features::config::{Analyzer, CountVectorsConfig, DocumentFrequency};
//!
//! let config = CountVectorsConfig::from_json_str(
//!     r#"{"analyzer": "char_wb", "min_ngram": 2, "max_ngram": 4, "max_df": 0.9}"#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.analyzer, Analyzer::CharWb);
//! assert_eq!(config.min_df, DocumentFrequency::Count(1));
//! assert_eq!(config.max_df, DocumentFrequency::Fraction(0.9));
//! assert!(config.lowercase);
//! ```

use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::analysis::char_filter::strip_accents::StripAccents;
use crate::analysis::token_filter::stop::StopWords;
use crate::analysis::tokenizer::regex::{DEFAULT_TOKEN_PATTERN, RegexTokenizer};
use crate::error::{Result, WordbagError};

/// How text is split into terms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Analyzer {
    /// Word n-grams extracted with the token pattern.
    #[default]
    Word,
    /// Character n-grams over the whole text.
    Char,
    /// Character n-grams built inside word boundaries.
    CharWb,
}

impl Analyzer {
    pub fn is_word(&self) -> bool {
        matches!(self, Analyzer::Word)
    }
}

/// A document frequency bound: an absolute number of documents or a
/// fraction of the corpus.
///
/// In JSON an integer means a count and a float means a fraction, so `1`
/// and `1.0` are different bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DocumentFrequency {
    Count(usize),
    Fraction(f64),
}

impl DocumentFrequency {
    /// The bound expressed as a number of documents for a corpus of `n_docs`.
    pub fn resolve(&self, n_docs: usize) -> f64 {
        match *self {
            DocumentFrequency::Count(count) => count as f64,
            DocumentFrequency::Fraction(fraction) => fraction * n_docs as f64,
        }
    }

    fn validate(&self, name: &str) -> Result<()> {
        if let DocumentFrequency::Fraction(fraction) = *self {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(WordbagError::config(format!(
                    "{name} as a fraction must be within [0.0, 1.0], got {fraction}"
                )));
            }
        }
        Ok(())
    }
}

// Untagged in human-readable formats; tagged otherwise, since compact binary
// formats cannot tell an integer from a float on the way back in.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum UntaggedFrequency {
    Count(usize),
    Fraction(f64),
}

#[derive(Serialize, Deserialize)]
enum TaggedFrequency {
    Count(usize),
    Fraction(f64),
}

impl Serialize for DocumentFrequency {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match (serializer.is_human_readable(), *self) {
            (true, DocumentFrequency::Count(c)) => UntaggedFrequency::Count(c).serialize(serializer),
            (true, DocumentFrequency::Fraction(f)) => {
                UntaggedFrequency::Fraction(f).serialize(serializer)
            }
            (false, DocumentFrequency::Count(c)) => TaggedFrequency::Count(c).serialize(serializer),
            (false, DocumentFrequency::Fraction(f)) => {
                TaggedFrequency::Fraction(f).serialize(serializer)
            }
        }
    }
}

impl<'de> Deserialize<'de> for DocumentFrequency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            Ok(match UntaggedFrequency::deserialize(deserializer)? {
                UntaggedFrequency::Count(c) => DocumentFrequency::Count(c),
                UntaggedFrequency::Fraction(f) => DocumentFrequency::Fraction(f),
            })
        } else {
            Ok(match TaggedFrequency::deserialize(deserializer)? {
                TaggedFrequency::Count(c) => DocumentFrequency::Count(c),
                TaggedFrequency::Fraction(f) => DocumentFrequency::Fraction(f),
            })
        }
    }
}

/// Options of the count-vectors featurizer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountVectorsConfig {
    /// Emit one row per whitespace token instead of a single bag of words.
    pub sequence: bool,
    /// Use one vocabulary for message text, intents and responses.
    pub use_shared_vocab: bool,
    /// Emit sparse matrices instead of dense arrays.
    pub sparse: bool,
    pub analyzer: Analyzer,
    /// Regular expression matching a token under the word analyzer.
    pub token_pattern: String,
    pub strip_accents: Option<StripAccents>,
    pub stop_words: Option<StopWords>,
    pub min_df: DocumentFrequency,
    pub max_df: DocumentFrequency,
    pub min_ngram: usize,
    pub max_ngram: usize,
    /// Keep only this many terms, ordered by total count.
    pub max_features: Option<usize>,
    pub lowercase: bool,
    /// Marker every unseen word is mapped to at inference time.
    #[serde(rename = "OOV_token")]
    pub oov_token: Option<String>,
    /// Training words that are forced onto the OOV marker.
    #[serde(rename = "OOV_words")]
    pub oov_words: Vec<String>,
}

impl Default for CountVectorsConfig {
    fn default() -> Self {
        CountVectorsConfig {
            sequence: false,
            use_shared_vocab: false,
            sparse: false,
            analyzer: Analyzer::Word,
            token_pattern: DEFAULT_TOKEN_PATTERN.to_string(),
            strip_accents: None,
            stop_words: None,
            min_df: DocumentFrequency::Count(1),
            max_df: DocumentFrequency::Fraction(1.0),
            min_ngram: 1,
            max_ngram: 1,
            max_features: None,
            lowercase: true,
            oov_token: None,
            oov_words: Vec::new(),
        }
    }
}

impl CountVectorsConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: CountVectorsConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file and validate it.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reject values that would make fitting impossible.
    pub fn validate(&self) -> Result<()> {
        if self.min_ngram == 0 {
            return Err(WordbagError::config("min_ngram must be at least 1"));
        }
        if self.max_ngram < self.min_ngram {
            return Err(WordbagError::config(format!(
                "max_ngram ({}) must be >= min_ngram ({})",
                self.max_ngram, self.min_ngram
            )));
        }
        if self.max_features == Some(0) {
            return Err(WordbagError::config("max_features must be positive"));
        }
        self.min_df.validate("min_df")?;
        self.max_df.validate("max_df")?;
        if self.analyzer.is_word() {
            RegexTokenizer::with_pattern(&self.token_pattern)
                .map_err(|e| WordbagError::config(e.to_string()))?;
        }
        Ok(())
    }

    /// Warn about options the character analyzers do not use.
    pub fn check_analyzer(&self) {
        if self.analyzer.is_word() {
            return;
        }
        if self.oov_token.is_some() {
            warn!("analyzer is not 'word', so OOV_token is ignored");
        }
        if self.stop_words.is_some() {
            warn!("analyzer is not 'word', so stop_words are ignored");
        }
        if self.max_ngram == 1 {
            warn!("analyzer is not 'word' and max_ngram is 1, so features are single characters");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token_filter::stop::StopWordsLanguage;

    #[test]
    fn test_defaults() {
        let config = CountVectorsConfig::from_json_str("{}").unwrap();
        assert_eq!(config, CountVectorsConfig::default());
        assert_eq!(config.token_pattern, r"(?u)\b\w\w+\b");
        assert_eq!(config.max_df, DocumentFrequency::Fraction(1.0));
    }

    #[test]
    fn test_original_key_spellings() {
        let config = CountVectorsConfig::from_json_str(
            r#"{"OOV_token": "oov", "OOV_words": ["foo"], "stop_words": "english", "strip_accents": "ascii"}"#,
        )
        .unwrap();
        assert_eq!(config.oov_token.as_deref(), Some("oov"));
        assert_eq!(config.oov_words, vec!["foo".to_string()]);
        assert_eq!(config.stop_words, Some(StopWords::Language(StopWordsLanguage::English)));
        assert_eq!(config.strip_accents, Some(StripAccents::Ascii));
    }

    #[test]
    fn test_document_frequency_int_or_float() {
        let config = CountVectorsConfig::from_json_str(r#"{"min_df": 2, "max_df": 0.5}"#).unwrap();
        assert_eq!(config.min_df, DocumentFrequency::Count(2));
        assert_eq!(config.max_df.resolve(10), 5.0);
        assert_eq!(config.min_df.resolve(10), 2.0);
    }

    #[test]
    fn test_document_frequency_binary_round_trip() {
        let config = CountVectorsConfig {
            min_df: DocumentFrequency::Count(3),
            max_df: DocumentFrequency::Fraction(0.75),
            stop_words: Some(StopWords::Custom(vec!["a".into()])),
            ..Default::default()
        };
        let bytes = bincode::serialize(&config).unwrap();
        let decoded: CountVectorsConfig = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(CountVectorsConfig::from_json_str(r#"{"min_ngram": 0}"#).is_err());
        assert!(CountVectorsConfig::from_json_str(r#"{"min_ngram": 3, "max_ngram": 2}"#).is_err());
        assert!(CountVectorsConfig::from_json_str(r#"{"max_df": 1.5}"#).is_err());
        assert!(CountVectorsConfig::from_json_str(r#"{"max_features": 0}"#).is_err());
        assert!(CountVectorsConfig::from_json_str(r#"{"token_pattern": "("}"#).is_err());
        // The token pattern is unused by the character analyzers.
        assert!(
            CountVectorsConfig::from_json_str(r#"{"analyzer": "char", "token_pattern": "("}"#)
                .is_ok()
        );
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"sequence": true, "sparse": true}"#).unwrap();

        let config = CountVectorsConfig::from_json_file(&path).unwrap();
        assert!(config.sequence);
        assert!(config.sparse);
        assert!(CountVectorsConfig::from_json_file(dir.path().join("missing.json")).is_err());
    }
}
