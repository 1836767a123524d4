//! Case folding, accent stripping and out-of-vocabulary substitution.
//!
//! A [`TextNormalizer`] is derived once from the configuration and shared by
//! every vectorizer of a featurizer, so that training and inference apply the
//! same normalization.

use std::collections::BTreeSet;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::analysis::char_filter::CharFilter;
use crate::analysis::char_filter::strip_accents::{StripAccents, StripAccentsCharFilter};
use crate::analysis::token::Token;
use crate::features::config::CountVectorsConfig;
use crate::features::vocabulary::Vocabulary;

/// Turns a word into its lemmas.
///
/// Used only to bring the configured OOV words into the same form as
/// lemmatized message text.
pub trait Lemmatizer {
    fn lemmatize(&self, text: &str) -> Vec<String>;
}

impl<F> Lemmatizer for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn lemmatize(&self, text: &str) -> Vec<String> {
        self(text)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextNormalizer {
    lowercase: bool,
    strip_accents: Option<StripAccents>,
    oov_token: Option<String>,
    oov_words: BTreeSet<String>,
}

impl TextNormalizer {
    pub fn from_config(config: &CountVectorsConfig) -> Self {
        let fold = |s: &str| {
            if config.lowercase {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        };

        let oov_token = config.oov_token.as_deref().map(fold);
        let oov_words = if oov_token.is_none() && !config.oov_words.is_empty() {
            warn!(
                "OOV_words {:?} were given, but OOV_token was not; OOV words are ignored",
                config.oov_words
            );
            BTreeSet::new()
        } else {
            config.oov_words.iter().map(|w| fold(w)).collect()
        };

        TextNormalizer {
            lowercase: config.lowercase,
            strip_accents: config.strip_accents,
            oov_token,
            oov_words,
        }
    }

    /// A copy whose OOV words are replaced by their lemmas.
    pub fn with_lemmatized_oov_words(&self, lemmatizer: &dyn Lemmatizer) -> Self {
        let oov_words = self
            .oov_words
            .iter()
            .flat_map(|word| lemmatizer.lemmatize(word))
            .map(|lemma| {
                if self.lowercase {
                    lemma.to_lowercase()
                } else {
                    lemma
                }
            })
            .collect();

        TextNormalizer {
            oov_words,
            ..self.clone()
        }
    }

    pub fn oov_token(&self) -> Option<&str> {
        self.oov_token.as_deref()
    }

    pub fn oov_words(&self) -> impl Iterator<Item = &str> {
        self.oov_words.iter().map(String::as_str)
    }

    /// Lowercase, then strip accents.
    pub fn preprocess(&self, text: &str) -> String {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        match self.strip_accents {
            Some(mode) => StripAccentsCharFilter::new(mode).filter(&text),
            None => text,
        }
    }

    /// Substitution while a vocabulary is being built: configured OOV words
    /// become the OOV marker.
    pub fn substitute_training(&self, tokens: Vec<Token>) -> Vec<Token> {
        match &self.oov_token {
            Some(marker) if !self.oov_words.is_empty() => tokens
                .into_iter()
                .map(|token| {
                    if self.oov_words.contains(&token.text) {
                        Token { text: marker.clone(), ..token }
                    } else {
                        token
                    }
                })
                .collect(),
            _ => tokens,
        }
    }

    /// Substitution against a trained vocabulary: unseen tokens become the
    /// OOV marker, provided the marker itself was learned.
    pub fn substitute_unseen(&self, tokens: Vec<Token>, vocabulary: &Vocabulary) -> Vec<Token> {
        match &self.oov_token {
            Some(marker) if vocabulary.contains(marker) => tokens
                .into_iter()
                .map(|token| {
                    if vocabulary.contains(&token.text) {
                        token
                    } else {
                        Token { text: marker.clone(), ..token }
                    }
                })
                .collect(),
            _ => tokens,
        }
    }

    /// Warn when the OOV marker never occurs in a corpus.
    ///
    /// Only meaningful when the marker is configured without OOV words;
    /// otherwise substitution puts it into the corpus. Returns whether the
    /// marker was found (or the check does not apply).
    pub fn check_oov_present(&self, corpus: &[String], channel: &str) -> bool {
        let marker = match &self.oov_token {
            Some(marker) if self.oov_words.is_empty() => marker,
            _ => return true,
        };

        let present = corpus.iter().any(|text| {
            text.contains(marker.as_str()) || (self.lowercase && text.to_lowercase().contains(marker.as_str()))
        });
        if !present {
            warn!(
                "OOV_token='{marker}' was given, but it is not present in the {channel} training data; \
                 all unseen words will be ignored during prediction"
            );
        }
        present
    }
}
