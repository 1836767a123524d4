//! Token filters applied between tokenization and n-gram construction.
//!
//! Only the word vectorizer runs token filters; character n-grams are built
//! from the normalized text directly.

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// A transformation over a token stream, e.g. dropping stop words.
pub trait Filter: Send + Sync {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    fn name(&self) -> &'static str;
}

pub mod stop;

pub use stop::StopFilter;
