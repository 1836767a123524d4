//! Count vectorizers: learn a vocabulary from a corpus and turn documents
//! into term count rows.
//!
//! Two analyzers share the [`Vectorizer`] interface:
//!
//! - [`WordVectorizer`] collapses numbers, extracts tokens with a regex,
//!   substitutes OOV words, drops stop words and builds word n-grams.
//! - [`CharVectorizer`] builds character n-grams, optionally inside word
//!   boundaries.
//!
//! # Examples
//!
//! ```
//! use wordbag::features::config::CountVectorsConfig;
//! use wordbag::features::normalizer::TextNormalizer;
//! use wordbag::features::vectorizer::{CountVectorizer, Vectorizer};
//!
//! let config = CountVectorsConfig::default();
//! let normalizer = TextNormalizer::from_config(&config);
//! let mut vectorizer = CountVectorizer::from_config(&config, normalizer).unwrap();
//!
//! vectorizer.fit(&["book a flight".to_string(), "book 2 rooms".to_string()]).unwrap();
//! let counts = vectorizer.transform(&["book book 7 rooms".to_string()]).unwrap();
//!
//! let vocabulary = vectorizer.vocabulary().unwrap();
//! assert_eq!(vocabulary.terms(), vec!["__NUMBER__", "book", "flight", "rooms"]);
//! assert_eq!(counts.get(0, vocabulary.get("book").unwrap()), 2.0);
//! assert_eq!(counts.get(0, vocabulary.get("__NUMBER__").unwrap()), 1.0);
//! ```

use std::collections::BTreeMap;

use log::debug;
use rayon::prelude::*;

use crate::analysis::char_filter::CharFilter;
use crate::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
use crate::analysis::token::{IntoTokenStream, Token};
use crate::analysis::token_filter::{Filter, StopFilter};
use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::ngram::CharNgramTokenizer;
use crate::analysis::tokenizer::regex::RegexTokenizer;
use crate::error::{Result, WordbagError};
use crate::features::config::{Analyzer, CountVectorsConfig};
use crate::features::matrix::CsrMatrix;
use crate::features::normalizer::TextNormalizer;
use crate::features::vocabulary::{Vocabulary, VocabularyBounds};

/// A vectorizer learns a vocabulary once and then counts terms against it.
pub trait Vectorizer: Send + Sync {
    /// Build the vocabulary from a corpus, replacing any previous one.
    ///
    /// An empty or fully pruned vocabulary is reported as
    /// [`WordbagError::Vocabulary`].
    fn fit(&mut self, corpus: &[String]) -> Result<()>;

    /// Count the vocabulary terms of every document, one row per document.
    ///
    /// Terms outside the vocabulary are dropped.
    fn transform(&self, corpus: &[String]) -> Result<CsrMatrix>;

    /// The learned vocabulary, `None` before fitting.
    fn vocabulary(&self) -> Option<&Vocabulary>;

    fn name(&self) -> &'static str;

    fn vocabulary_size(&self) -> usize {
        self.vocabulary().map_or(0, Vocabulary::len)
    }
}

/// Analysis shared by both vectorizers: document in, terms out.
trait Analyze: Send + Sync {
    fn analyze(&self, document: &str, vocabulary: Option<&Vocabulary>) -> Result<Vec<String>>;
}

fn fit_vocabulary<A: Analyze>(
    analyzer: &A,
    corpus: &[String],
    bounds: &VocabularyBounds,
) -> Result<Vocabulary> {
    let documents = corpus
        .par_iter()
        .map(|document| analyzer.analyze(document, None))
        .collect::<Result<Vec<_>>>()?;
    Ok(Vocabulary::build(&documents, bounds)?)
}

fn count_terms<A: Analyze>(
    analyzer: &A,
    vocabulary: Option<&Vocabulary>,
    corpus: &[String],
) -> Result<CsrMatrix> {
    let vocabulary =
        vocabulary.ok_or_else(|| WordbagError::featurization("vectorizer is not fitted"))?;

    let rows = corpus
        .par_iter()
        .map(|document| {
            let mut row: BTreeMap<usize, f64> = BTreeMap::new();
            for term in analyzer.analyze(document, Some(vocabulary))? {
                if let Some(index) = vocabulary.get(&term) {
                    *row.entry(index).or_insert(0.0) += 1.0;
                }
            }
            Ok::<_, WordbagError>(row)
        })
        .collect::<Result<Vec<_>>>()?;

    CsrMatrix::from_rows(vocabulary.len(), rows)
}

/// Word n-grams joined by a single space, unigrams first.
pub fn word_ngrams(tokens: &[String], min_n: usize, max_n: usize) -> Vec<String> {
    if max_n == 1 {
        return tokens.to_vec();
    }

    let mut ngrams = Vec::new();
    let mut min_n = min_n;
    if min_n == 1 {
        ngrams.extend_from_slice(tokens);
        min_n += 1;
    }
    for n in min_n..=max_n.min(tokens.len()) {
        for window in tokens.windows(n) {
            ngrams.push(window.join(" "));
        }
    }
    ngrams
}

/// Counts word n-grams.
#[derive(Clone, Debug)]
pub struct WordVectorizer {
    normalizer: TextNormalizer,
    numbers: PatternReplaceCharFilter,
    tokenizer: RegexTokenizer,
    stop_filter: Option<StopFilter>,
    min_n: usize,
    max_n: usize,
    bounds: VocabularyBounds,
    vocabulary: Option<Vocabulary>,
}

impl WordVectorizer {
    pub fn new(config: &CountVectorsConfig, normalizer: TextNormalizer) -> Result<Self> {
        Ok(WordVectorizer {
            normalizer,
            numbers: PatternReplaceCharFilter::numbers()?,
            tokenizer: RegexTokenizer::with_pattern(&config.token_pattern)?,
            stop_filter: config.stop_words.as_ref().map(StopFilter::from_config),
            min_n: config.min_ngram,
            max_n: config.max_ngram,
            bounds: bounds_from_config(config),
            vocabulary: None,
        })
    }

    fn tokens(&self, document: &str, vocabulary: Option<&Vocabulary>) -> Result<Vec<Token>> {
        let text = self.numbers.filter(&self.normalizer.preprocess(document));
        let tokens: Vec<Token> = self.tokenizer.tokenize(&text)?.collect();

        Ok(match vocabulary {
            Some(vocabulary) => self.normalizer.substitute_unseen(tokens, vocabulary),
            None => self.normalizer.substitute_training(tokens),
        })
    }
}

impl Analyze for WordVectorizer {
    fn analyze(&self, document: &str, vocabulary: Option<&Vocabulary>) -> Result<Vec<String>> {
        let tokens = self.tokens(document, vocabulary)?;
        let terms: Vec<String> = match &self.stop_filter {
            Some(filter) => filter
                .filter(tokens.into_token_stream())?
                .map(|token| token.text)
                .collect(),
            None => tokens.into_iter().map(|token| token.text).collect(),
        };
        Ok(word_ngrams(&terms, self.min_n, self.max_n))
    }
}

impl Vectorizer for WordVectorizer {
    fn fit(&mut self, corpus: &[String]) -> Result<()> {
        let vocabulary = fit_vocabulary(&*self, corpus, &self.bounds)?;
        debug!("word vocabulary fitted with {} terms", vocabulary.len());
        self.vocabulary = Some(vocabulary);
        Ok(())
    }

    fn transform(&self, corpus: &[String]) -> Result<CsrMatrix> {
        count_terms(self, self.vocabulary.as_ref(), corpus)
    }

    fn vocabulary(&self) -> Option<&Vocabulary> {
        self.vocabulary.as_ref()
    }

    fn name(&self) -> &'static str {
        "word"
    }
}

/// Counts character n-grams.
#[derive(Clone, Debug)]
pub struct CharVectorizer {
    normalizer: TextNormalizer,
    tokenizer: CharNgramTokenizer,
    bounds: VocabularyBounds,
    vocabulary: Option<Vocabulary>,
}

impl CharVectorizer {
    pub fn new(config: &CountVectorsConfig, normalizer: TextNormalizer) -> Result<Self> {
        let tokenizer = match config.analyzer {
            Analyzer::CharWb => CharNgramTokenizer::word_bounded(config.min_ngram, config.max_ngram)?,
            _ => CharNgramTokenizer::new(config.min_ngram, config.max_ngram)?,
        };
        Ok(CharVectorizer {
            normalizer,
            tokenizer,
            bounds: bounds_from_config(config),
            vocabulary: None,
        })
    }
}

impl Analyze for CharVectorizer {
    fn analyze(&self, document: &str, _vocabulary: Option<&Vocabulary>) -> Result<Vec<String>> {
        let text = self.normalizer.preprocess(document);
        Ok(self.tokenizer.tokenize(&text)?.map(|gram| gram.text).collect())
    }
}

impl Vectorizer for CharVectorizer {
    fn fit(&mut self, corpus: &[String]) -> Result<()> {
        let vocabulary = fit_vocabulary(&*self, corpus, &self.bounds)?;
        debug!("{} vocabulary fitted with {} terms", self.name(), vocabulary.len());
        self.vocabulary = Some(vocabulary);
        Ok(())
    }

    fn transform(&self, corpus: &[String]) -> Result<CsrMatrix> {
        count_terms(self, self.vocabulary.as_ref(), corpus)
    }

    fn vocabulary(&self) -> Option<&Vocabulary> {
        self.vocabulary.as_ref()
    }

    fn name(&self) -> &'static str {
        if self.tokenizer.is_word_bounded() { "char_wb" } else { "char" }
    }
}

fn bounds_from_config(config: &CountVectorsConfig) -> VocabularyBounds {
    VocabularyBounds {
        min_df: config.min_df,
        max_df: config.max_df,
        max_features: config.max_features,
    }
}

/// The vectorizer selected by the `analyzer` option.
#[derive(Clone, Debug)]
pub enum CountVectorizer {
    Word(WordVectorizer),
    Char(CharVectorizer),
}

impl CountVectorizer {
    pub fn from_config(config: &CountVectorsConfig, normalizer: TextNormalizer) -> Result<Self> {
        Ok(match config.analyzer {
            Analyzer::Word => CountVectorizer::Word(WordVectorizer::new(config, normalizer)?),
            Analyzer::Char | Analyzer::CharWb => {
                CountVectorizer::Char(CharVectorizer::new(config, normalizer)?)
            }
        })
    }

    /// Rebuild a fitted vectorizer around a previously learned vocabulary.
    pub fn with_vocabulary(
        config: &CountVectorsConfig,
        normalizer: TextNormalizer,
        vocabulary: Vocabulary,
    ) -> Result<Self> {
        let mut vectorizer = Self::from_config(config, normalizer)?;
        match &mut vectorizer {
            CountVectorizer::Word(v) => v.vocabulary = Some(vocabulary),
            CountVectorizer::Char(v) => v.vocabulary = Some(vocabulary),
        }
        Ok(vectorizer)
    }

    fn inner(&self) -> &dyn Vectorizer {
        match self {
            CountVectorizer::Word(v) => v,
            CountVectorizer::Char(v) => v,
        }
    }
}

impl Vectorizer for CountVectorizer {
    fn fit(&mut self, corpus: &[String]) -> Result<()> {
        match self {
            CountVectorizer::Word(v) => v.fit(corpus),
            CountVectorizer::Char(v) => v.fit(corpus),
        }
    }

    fn transform(&self, corpus: &[String]) -> Result<CsrMatrix> {
        self.inner().transform(corpus)
    }

    fn vocabulary(&self) -> Option<&Vocabulary> {
        self.inner().vocabulary()
    }

    fn name(&self) -> &'static str {
        self.inner().name()
    }
}
