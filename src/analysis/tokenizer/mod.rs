//! Tokenizer implementations for text analysis.
//!
//! Tokenizers split (already normalized) text into [`Token`]s. All of them
//! report **character** offsets.
//!
//! # Available Tokenizers
//!
//! - [`whitespace::WhitespaceTokenizer`] - Splits on whitespace characters
//! - [`regex::RegexTokenizer`] - Extracts every match of a token pattern
//! - [`ngram::CharNgramTokenizer`] - Character n-grams, optionally inside word boundaries
//!
//! # Examples
//!
//! ```
//! use wordbag::analysis::tokenizer::Tokenizer;
//! use wordbag::analysis::tokenizer::whitespace::WhitespaceTokenizer;
//!
//! let tokenizer = WhitespaceTokenizer::new();
//! let tokens: Vec<_> = tokenizer.tokenize("Hello world").unwrap().collect();
//! assert_eq!(tokens.len(), 2);
//! assert_eq!(tokens[1].start, 6);
//! ```
//!
//! [`Token`]: crate::analysis::token::Token

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
///
/// The trait requires `Send + Sync` so vectorizers can analyze documents in
/// parallel.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod ngram;
pub mod regex;
pub mod whitespace;
