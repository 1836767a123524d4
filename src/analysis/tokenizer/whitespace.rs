//! Whitespace tokenizer implementation.

use super::Tokenizer;
use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// A tokenizer that splits text on whitespace.
///
/// Used to split already-processed text into per-token sub-strings for
/// sequence featurization, and handy for producing message tokens with
/// character offsets.
#[derive(Clone, Debug, Default)]
pub struct WhitespaceTokenizer;

impl WhitespaceTokenizer {
    /// Create a new whitespace tokenizer.
    pub fn new() -> Self {
        WhitespaceTokenizer
    }
}

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut start = 0;

        for (offset, c) in text.chars().enumerate() {
            if c.is_whitespace() {
                if !current.is_empty() {
                    tokens.push(Token::new(std::mem::take(&mut current), start, offset));
                }
            } else {
                if current.is_empty() {
                    start = offset;
                }
                current.push(c);
            }
        }

        if !current.is_empty() {
            let end = start + current.chars().count();
            tokens.push(Token::new(current, start, end));
        }

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "whitespace"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_tokenizer() {
        let tokenizer = WhitespaceTokenizer::new();
        let tokens: Vec<Token> = tokenizer.tokenize("hello  world\ttest").unwrap().collect();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "hello");
        assert_eq!(tokens[1].text, "world");
        assert_eq!(tokens[2].text, "test");

        assert_eq!((tokens[1].start, tokens[1].end), (7, 12));
        assert_eq!((tokens[2].start, tokens[2].end), (13, 17));
    }

    #[test]
    fn test_character_offsets() {
        let tokenizer = WhitespaceTokenizer::new();
        let tokens: Vec<Token> = tokenizer.tokenize(" Zürich  café ").unwrap().collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!((tokens[0].start, tokens[0].end), (1, 7));
        assert_eq!((tokens[1].start, tokens[1].end), (9, 13));
    }

    #[test]
    fn test_blank_input() {
        let tokenizer = WhitespaceTokenizer::new();
        assert_eq!(tokenizer.tokenize("   ").unwrap().count(), 0);
        assert_eq!(tokenizer.tokenize("").unwrap().count(), 0);
    }

    #[test]
    fn test_tokenizer_name() {
        assert_eq!(WhitespaceTokenizer::new().name(), "whitespace");
    }
}
