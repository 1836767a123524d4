//! Char filter implementations for text normalization.
//!
//! Char filters pre-process the text string before it is passed to the
//! tokenizer. The featurizer chains them as: lowercase, accent stripping,
//! then numeric-run replacement.
//!
//! # Available Filters
//!
//! - [`strip_accents::StripAccentsCharFilter`] - Accent removal (`unicode` or `ascii`)
//! - [`pattern_replace::PatternReplaceCharFilter`] - Regex-based replacement
//!
//! # Examples
//!
//! ```
//! use wordbag::analysis::char_filter::CharFilter;
//! use wordbag::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
//!
//! let filter = PatternReplaceCharFilter::numbers().unwrap();
//! assert_eq!(filter.filter("book 2 rooms"), "book __NUMBER__ rooms");
//! ```

/// Trait for character filters that transform text before tokenization.
pub trait CharFilter: Send + Sync {
    /// Apply this filter to the input text and return the filtered text.
    fn filter(&self, input: &str) -> String;

    /// Get the name of this char filter.
    fn name(&self) -> &'static str;
}

pub mod pattern_replace;
pub mod strip_accents;
