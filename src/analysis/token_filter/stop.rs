//! Stop filter implementation.
//!
//! Removes stop words from a token stream. Stop words are dropped after
//! tokenization and before n-gram construction, so a bigram never spans a
//! removed word's slot.
//!
//! # Examples
//!
//! ```
//! use wordbag::analysis::token::Token;
//! use wordbag::analysis::token_filter::Filter;
//! use wordbag::analysis::token_filter::stop::StopFilter;
//!
//! let filter = StopFilter::english();
//! let tokens = vec![
//!     Token::new("the", 0, 3),
//!     Token::new("quick", 4, 9),
//!     Token::new("fox", 10, 13),
//! ];
//!
//! let result: Vec<_> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();
//! assert_eq!(result.len(), 2);
//! assert_eq!(result[0].text, "quick");
//! ```

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// English stop words, the list bag-of-words featurizers conventionally use.
const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below", "beside",
    "besides", "between", "beyond", "bill", "both", "bottom", "but", "by", "call", "can",
    "cannot", "cant", "co", "con", "could", "couldnt", "cry", "de", "describe", "detail", "do",
    "done", "down", "due", "during", "each", "eg", "eight", "either", "eleven", "else",
    "elsewhere", "empty", "enough", "etc", "even", "ever", "every", "everyone", "everything",
    "everywhere", "except", "few", "fifteen", "fifty", "fill", "find", "fire", "first", "five",
    "for", "former", "formerly", "forty", "found", "four", "from", "front", "full", "further",
    "get", "give", "go", "had", "has", "hasnt", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed", "interest", "into",
    "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd",
    "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover",
    "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
    "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto", "or",
    "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "part",
    "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed",
    "seeming", "seems", "serious", "several", "she", "should", "show", "side", "since",
    "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than", "that", "the",
    "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "thick", "thin", "third", "this",
    "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together", "too",
    "top", "toward", "towards", "twelve", "twenty", "two", "un", "under", "until", "up", "upon",
    "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when", "whence",
    "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon", "wherever",
    "whether", "which", "while", "whither", "who", "whoever", "whole", "whom", "whose", "why",
    "will", "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];

/// English stop words as a HashSet.
pub static ENGLISH_STOP_WORDS_SET: LazyLock<HashSet<String>> = LazyLock::new(|| {
    ENGLISH_STOP_WORDS.iter().map(|&s| s.to_string()).collect()
});

/// Named stop word lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopWordsLanguage {
    English,
}

/// Stop word configuration: a named list or an explicit one.
///
/// Human-readable formats accept either `"english"` or a list of words;
/// binary formats store the variant tag.
#[derive(Clone, Debug, PartialEq)]
pub enum StopWords {
    Language(StopWordsLanguage),
    Custom(Vec<String>),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum UntaggedStopWords {
    Language(StopWordsLanguage),
    Custom(Vec<String>),
}

#[derive(Serialize, Deserialize)]
enum TaggedStopWords {
    Language(StopWordsLanguage),
    Custom(Vec<String>),
}

impl Serialize for StopWords {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let human_readable = serializer.is_human_readable();
        match (human_readable, self.clone()) {
            (true, StopWords::Language(l)) => UntaggedStopWords::Language(l).serialize(serializer),
            (true, StopWords::Custom(w)) => UntaggedStopWords::Custom(w).serialize(serializer),
            (false, StopWords::Language(l)) => TaggedStopWords::Language(l).serialize(serializer),
            (false, StopWords::Custom(w)) => TaggedStopWords::Custom(w).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for StopWords {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            Ok(match UntaggedStopWords::deserialize(deserializer)? {
                UntaggedStopWords::Language(l) => StopWords::Language(l),
                UntaggedStopWords::Custom(w) => StopWords::Custom(w),
            })
        } else {
            Ok(match TaggedStopWords::deserialize(deserializer)? {
                TaggedStopWords::Language(l) => StopWords::Language(l),
                TaggedStopWords::Custom(w) => StopWords::Custom(w),
            })
        }
    }
}

/// A filter that removes stop words from the token stream.
#[derive(Clone, Debug)]
pub struct StopFilter {
    /// The set of stop words to remove
    stop_words: Arc<HashSet<String>>,
}

impl StopFilter {
    /// Create a stop filter with the English stop word list.
    pub fn english() -> Self {
        Self::with_stop_words(ENGLISH_STOP_WORDS_SET.clone())
    }

    /// Create a new stop filter with custom stop words.
    pub fn with_stop_words(stop_words: HashSet<String>) -> Self {
        StopFilter {
            stop_words: Arc::new(stop_words),
        }
    }

    /// Create a new stop filter from a list of stop words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_stop_words(words.into_iter().map(|s| s.into()).collect())
    }

    /// Build the filter described by a stop word configuration.
    pub fn from_config(config: &StopWords) -> Self {
        match config {
            StopWords::Language(StopWordsLanguage::English) => Self::english(),
            StopWords::Custom(words) => Self::from_words(words.iter().cloned()),
        }
    }

    /// Check if a word is a stop word.
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Get the number of stop words.
    pub fn len(&self) -> usize {
        self.stop_words.len()
    }

    /// Check if the stop word set is empty.
    pub fn is_empty(&self) -> bool {
        self.stop_words.is_empty()
    }
}

impl Filter for StopFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens: Vec<Token> = tokens
            .filter(|token| !self.is_stop_word(&token.text))
            .collect();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}
