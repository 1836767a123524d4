//! Text analysis building blocks.
//!
//! Char filters normalize raw text, tokenizers split it into tokens, and
//! token filters drop tokens before n-gram construction. The vectorizers in
//! [`crate::features`] assemble these into their analysis pipelines.

pub mod char_filter;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
