use regex::Regex;

use super::CharFilter;
use crate::error::{Result, WordbagError};

/// Matches runs of ASCII digits that form a whole word.
pub const NUMBER_PATTERN: &str = r"\b[0-9]+\b";

/// Literal that replaces every whole-word digit run.
pub const NUMBER_TOKEN: &str = "__NUMBER__";

/// A char filter that replaces every match of a regex pattern.
#[derive(Clone, Debug)]
pub struct PatternReplaceCharFilter {
    pattern: Regex,
    replacement: String,
}

impl PatternReplaceCharFilter {
    /// Create a new pattern replace char filter.
    pub fn new(pattern: &str, replacement: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| WordbagError::analysis(format!("Invalid regex pattern: {e}")))?;
        Ok(Self {
            pattern,
            replacement: replacement.to_string(),
        })
    }

    /// Collapse every purely numeric token into [`NUMBER_TOKEN`], so that
    /// `42` and `7` count toward the same vocabulary slot.
    pub fn numbers() -> Result<Self> {
        Self::new(NUMBER_PATTERN, NUMBER_TOKEN)
    }
}

impl CharFilter for PatternReplaceCharFilter {
    fn filter(&self, input: &str) -> String {
        let mut output = String::with_capacity(input.len());
        let mut last_match_end = 0;

        for m in self.pattern.find_iter(input) {
            output.push_str(&input[last_match_end..m.start()]);
            output.push_str(&self.replacement);
            last_match_end = m.end();
        }

        output.push_str(&input[last_match_end..]);
        output
    }

    fn name(&self) -> &'static str {
        "pattern_replace"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_replace() {
        let filter = PatternReplaceCharFilter::new(r"(\d+)", "NUM").unwrap();
        assert_eq!(filter.filter("Year 2024"), "Year NUM");
    }

    #[test]
    fn test_remove_pattern() {
        let filter = PatternReplaceCharFilter::new(r"-", "").unwrap();
        assert_eq!(filter.filter("123-456-789"), "123456789");
    }

    #[test]
    fn test_numbers_only_whole_words() {
        let filter = PatternReplaceCharFilter::numbers().unwrap();
        assert_eq!(filter.filter("42 or 7"), "__NUMBER__ or __NUMBER__");
        // Digits glued to letters are not a standalone number.
        assert_eq!(filter.filter("ab12d 3d"), "ab12d 3d");
        assert_eq!(filter.filter("room 12, floor 3."), "room __NUMBER__, floor __NUMBER__.");
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(PatternReplaceCharFilter::new("(", "x").is_err());
    }
}
