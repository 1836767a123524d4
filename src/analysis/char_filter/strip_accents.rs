use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::CharFilter;

/// Supported accent stripping strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StripAccents {
    /// Compatibility-decompose and drop every non-ASCII character.
    Ascii,
    /// Compatibility-decompose and drop combining marks only.
    Unicode,
}

/// A char filter that removes accents from text.
#[derive(Debug, Clone, Copy)]
pub struct StripAccentsCharFilter {
    mode: StripAccents,
}

impl StripAccentsCharFilter {
    pub fn new(mode: StripAccents) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> StripAccents {
        self.mode
    }
}

impl CharFilter for StripAccentsCharFilter {
    fn filter(&self, input: &str) -> String {
        match self.mode {
            StripAccents::Ascii => input.nfkd().filter(|c| c.is_ascii()).collect(),
            StripAccents::Unicode => {
                if input.is_ascii() {
                    return input.to_string();
                }
                input.nfkd().filter(|&c| !is_combining_mark(c)).collect()
            }
        }
    }

    fn name(&self) -> &'static str {
        "strip_accents"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unicode_strip() {
        let filter = StripAccentsCharFilter::new(StripAccents::Unicode);
        assert_eq!(filter.filter("Amélie"), "Amelie");
        // Decomposed input gives the same result.
        assert_eq!(filter.filter("Am\u{0065}\u{0301}lie"), "Amelie");
        // Characters without a decomposition survive.
        assert_eq!(filter.filter("東京 naïve"), "東京 naive");
    }

    #[test]
    fn test_ascii_strip() {
        let filter = StripAccentsCharFilter::new(StripAccents::Ascii);
        assert_eq!(filter.filter("crème brûlée"), "creme brulee");
        assert_eq!(filter.filter("東京 café"), " cafe");
    }

    #[test]
    fn test_mode_deserialization() {
        let mode: StripAccents = serde_json::from_str("\"unicode\"").unwrap();
        assert_eq!(mode, StripAccents::Unicode);
    }
}
