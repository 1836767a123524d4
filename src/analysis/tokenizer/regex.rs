//! Regex-based tokenizer implementation.

use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::Tokenizer;
use crate::analysis::token::{Token, TokenStream};
use crate::error::{Result, WordbagError};

/// Default token pattern: two or more word characters between word boundaries.
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// A regex-based tokenizer that extracts every match of a pattern as a token.
///
/// Serializes as its pattern string and recompiles on deserialization.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegexTokenizer {
    /// The regex pattern used to extract tokens
    pattern: Arc<Regex>,
}

impl RegexTokenizer {
    /// Create a new regex tokenizer with [`DEFAULT_TOKEN_PATTERN`].
    pub fn new() -> Result<Self> {
        Self::with_pattern(DEFAULT_TOKEN_PATTERN)
    }

    /// Create a new regex tokenizer with a custom pattern.
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| WordbagError::analysis(format!("Invalid regex pattern: {e}")))?;

        Ok(RegexTokenizer {
            pattern: Arc::new(regex),
        })
    }

    /// Get the regex pattern used by this tokenizer.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl TryFrom<String> for RegexTokenizer {
    type Error = WordbagError;

    fn try_from(pattern: String) -> Result<Self> {
        Self::with_pattern(&pattern)
    }
}

impl From<RegexTokenizer> for String {
    fn from(tokenizer: RegexTokenizer) -> Self {
        tokenizer.pattern().to_string()
    }
}

impl Tokenizer for RegexTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = Vec::new();
        let mut last_byte = 0;
        let mut last_char = 0;

        for mat in self.pattern.find_iter(text) {
            let start = last_char + text[last_byte..mat.start()].chars().count();
            let end = start + mat.as_str().chars().count();
            tokens.push(Token::new(mat.as_str(), start, end));
            last_byte = mat.end();
            last_char = end;
        }

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "regex"
    }
}
