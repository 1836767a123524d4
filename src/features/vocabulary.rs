//! Frozen term-to-index vocabularies.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::error::VocabularyError;
use crate::features::config::DocumentFrequency;

/// Limits applied to the terms extracted from a corpus.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VocabularyBounds {
    pub min_df: DocumentFrequency,
    pub max_df: DocumentFrequency,
    pub max_features: Option<usize>,
}

impl Default for VocabularyBounds {
    fn default() -> Self {
        VocabularyBounds {
            min_df: DocumentFrequency::Count(1),
            max_df: DocumentFrequency::Fraction(1.0),
            max_features: None,
        }
    }
}

/// A mapping from term to column index.
///
/// Indices cover `0..len()` without gaps and follow the lexicographic order
/// of the terms.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    terms: AHashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from analyzed documents, one term list per document.
    pub fn build(
        documents: &[Vec<String>],
        bounds: &VocabularyBounds,
    ) -> std::result::Result<Self, VocabularyError> {
        let mut document_frequency: AHashMap<&str, usize> = AHashMap::new();
        let mut term_frequency: AHashMap<&str, usize> = AHashMap::new();

        for document in documents {
            let mut seen = AHashSet::new();
            for term in document {
                *term_frequency.entry(term.as_str()).or_insert(0) += 1;
                if seen.insert(term.as_str()) {
                    *document_frequency.entry(term.as_str()).or_insert(0) += 1;
                }
            }
        }

        if document_frequency.is_empty() {
            return Err(VocabularyError::Empty);
        }

        let n_docs = documents.len();
        let min_docs = bounds.min_df.resolve(n_docs);
        let max_docs = bounds.max_df.resolve(n_docs);
        if max_docs < min_docs {
            return Err(VocabularyError::InconsistentDfBounds { min_docs, max_docs });
        }

        let mut kept: Vec<(&str, usize)> = document_frequency
            .iter()
            .filter(|&(_, &df)| df as f64 >= min_docs && df as f64 <= max_docs)
            .map(|(&term, _)| (term, term_frequency.get(term).copied().unwrap_or(0)))
            .collect();

        if let Some(limit) = bounds.max_features {
            if kept.len() > limit {
                kept.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
                kept.truncate(limit);
            }
        }

        if kept.is_empty() {
            return Err(VocabularyError::Pruned);
        }

        kept.sort_unstable_by(|a, b| a.0.cmp(b.0));
        let terms = kept
            .into_iter()
            .enumerate()
            .map(|(index, (term, _))| (term.to_string(), index))
            .collect();

        Ok(Vocabulary { terms })
    }

    pub fn get(&self, term: &str) -> Option<usize> {
        self.terms.get(term).copied()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms in column order.
    pub fn terms(&self) -> Vec<&str> {
        let mut terms: Vec<(&str, usize)> =
            self.terms.iter().map(|(t, &i)| (t.as_str(), i)).collect();
        terms.sort_unstable_by_key(|&(_, i)| i);
        terms.into_iter().map(|(t, _)| t).collect()
    }
}
