//! Token types for text analysis.
//!
//! A [`Token`] is the unit produced by upstream tokenization and consumed by
//! both the featurizer (which joins token texts or lemmas back into a
//! canonical string) and the BILOU tagger (which aligns entity offsets to
//! token boundaries).
//!
//! Offsets are **character** offsets, not byte offsets: entity annotations
//! in training data are expressed in characters, and the tagger compares the
//! two directly.
//!
//! # Examples
//!
//! ```
//! use wordbag::analysis::token::Token;
//!
//! let token = Token::new("Berlin", 10, 16).with_lemma("berlin");
//! assert_eq!(token.text, "Berlin");
//! assert_eq!(token.lemma_or_text(), "berlin");
//! assert_eq!(token.char_len(), 6);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single token with its character span in the original text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token
    pub text: String,

    /// Character offset where the token starts (inclusive)
    pub start: usize,

    /// Character offset where the token ends (exclusive)
    pub end: usize,

    /// Lemma attached by an upstream lemmatizer, if any
    pub lemma: Option<String>,
}

impl Token {
    /// Create a new token with text and character offsets.
    pub fn new<S: Into<String>>(text: S, start: usize, end: usize) -> Self {
        Token {
            text: text.into(),
            start,
            end,
            lemma: None,
        }
    }

    /// Attach a lemma to this token.
    pub fn with_lemma<S: Into<String>>(mut self, lemma: S) -> Self {
        self.lemma = Some(lemma.into());
        self
    }

    /// The lemma if one is attached, the surface text otherwise.
    pub fn lemma_or_text(&self) -> &str {
        self.lemma.as_deref().unwrap_or(&self.text)
    }

    /// Number of characters covered by this token's span.
    pub fn char_len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the token text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A token stream represents a sequence of tokens from a tokenizer.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;

/// Trait for types that can produce a token stream.
pub trait IntoTokenStream {
    /// Convert this type into a token stream.
    fn into_token_stream(self) -> TokenStream;
}

impl IntoTokenStream for Vec<Token> {
    fn into_token_stream(self) -> TokenStream {
        Box::new(self.into_iter())
    }
}
