//! Character n-gram tokenizer implementation.

use serde::{Deserialize, Serialize};

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::{Result, WordbagError};

/// A tokenizer that generates character n-grams.
///
/// In plain mode every run of two or more whitespace characters is first
/// collapsed to a single space, then every window of `min_gram..=max_gram`
/// characters is emitted. In word-bounded mode n-grams are built inside each
/// whitespace-separated word, padded with one space on each side; a word
/// shorter than `n` yields a single n-gram and ends the loop for that word.
///
/// Plain n-grams carry their own character span. Word-bounded n-grams carry
/// the span of the word they were built from, since the padding spaces have
/// no position in the text.
///
/// # Examples
///
/// ```
/// use wordbag::analysis::tokenizer::ngram::CharNgramTokenizer;
/// use wordbag::analysis::tokenizer::Tokenizer;
///
/// let tokenizer = CharNgramTokenizer::new(2, 2).unwrap();
/// let grams: Vec<_> = tokenizer.tokenize("hello").unwrap().map(|t| t.text).collect();
/// assert_eq!(grams, vec!["he", "el", "ll", "lo"]);
///
/// let tokenizer = CharNgramTokenizer::word_bounded(2, 2).unwrap();
/// let grams: Vec<_> = tokenizer.tokenize("hi").unwrap().map(|t| t.text).collect();
/// assert_eq!(grams, vec![" h", "hi", "i "]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CharNgramTokenizer {
    /// Minimum n-gram size
    min_gram: usize,
    /// Maximum n-gram size
    max_gram: usize,
    /// Build n-grams inside word boundaries only
    word_bounded: bool,
}

impl CharNgramTokenizer {
    /// Create a plain character n-gram tokenizer.
    ///
    /// # Errors
    ///
    /// Returns an error if `min_gram` is 0 or `max_gram` is less than `min_gram`.
    pub fn new(min_gram: usize, max_gram: usize) -> Result<Self> {
        Self::build(min_gram, max_gram, false)
    }

    /// Create a tokenizer that builds n-grams inside word boundaries.
    pub fn word_bounded(min_gram: usize, max_gram: usize) -> Result<Self> {
        Self::build(min_gram, max_gram, true)
    }

    fn build(min_gram: usize, max_gram: usize, word_bounded: bool) -> Result<Self> {
        if min_gram == 0 {
            return Err(WordbagError::analysis("min_gram must be at least 1"));
        }
        if max_gram < min_gram {
            return Err(WordbagError::analysis(format!(
                "max_gram ({max_gram}) must be >= min_gram ({min_gram})"
            )));
        }
        Ok(Self {
            min_gram,
            max_gram,
            word_bounded,
        })
    }

    pub fn is_word_bounded(&self) -> bool {
        self.word_bounded
    }

    fn plain_ngrams(&self, text: &str) -> Vec<Token> {
        let chars = collapse_whitespace(text);
        let mut tokens = Vec::new();
        let upper = self.max_gram.min(chars.len());

        for n in self.min_gram..=upper {
            for start in 0..=(chars.len() - n) {
                let gram: String = chars[start..start + n].iter().collect();
                tokens.push(Token::new(gram, start, start + n));
            }
        }
        tokens
    }

    fn word_bounded_ngrams(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();

        for (word_start, word) in words_with_offsets(text) {
            let mut padded = Vec::with_capacity(word.len() + 2);
            padded.push(' ');
            padded.extend(word.iter().copied());
            padded.push(' ');
            let word_end = word_start + word.len();

            for n in self.min_gram..=self.max_gram {
                let mut offset = 0;
                let mut emit = |offset: usize| {
                    let end = (offset + n).min(padded.len());
                    let gram: String = padded[offset..end].iter().collect();
                    tokens.push(Token::new(gram, word_start, word_end));
                };

                emit(offset);
                while offset + n < padded.len() {
                    offset += 1;
                    emit(offset);
                }
                // A word shorter than n is counted only once.
                if offset == 0 {
                    break;
                }
            }
        }
        tokens
    }
}

impl Tokenizer for CharNgramTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let tokens = if self.word_bounded {
            self.word_bounded_ngrams(text)
        } else {
            self.plain_ngrams(text)
        };
        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        if self.word_bounded { "char_wb_ngram" } else { "char_ngram" }
    }
}

/// Collapse every run of two or more whitespace characters into one space.
fn collapse_whitespace(text: &str) -> Vec<char> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_whitespace() {
            let mut j = i;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j - i >= 2 {
                out.push(' ');
            } else {
                out.push(chars[i]);
            }
            i = j;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

/// Whitespace-separated words with their starting character offsets.
fn words_with_offsets(text: &str) -> Vec<(usize, Vec<char>)> {
    let mut words = Vec::new();
    let mut current = Vec::new();
    let mut start = 0;

    for (offset, c) in text.chars().enumerate() {
        if c.is_whitespace() {
            if !current.is_empty() {
                words.push((start, std::mem::take(&mut current)));
            }
        } else {
            if current.is_empty() {
                start = offset;
            }
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push((start, current));
    }
    words
}
