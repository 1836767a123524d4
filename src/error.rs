//! Error types for the wordbag library.
//!
//! All fallible operations return [`WordbagError`] through the crate-wide
//! [`Result`] alias. Vocabulary construction has its own error type,
//! [`VocabularyError`], because the featurizer handles it differently from
//! every other failure: it is never propagated out of training, it moves
//! the component into its failed state instead.
//!
//! # Examples
//!
//! ```
//! use wordbag::error::{Result, WordbagError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(WordbagError::config("min_ngram must be at least 1"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for wordbag operations.
#[derive(Error, Debug)]
pub enum WordbagError {
    /// I/O errors (model files, configuration files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Analysis-related errors (tokenization, n-gram extraction, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Invalid configuration values
    #[error("Configuration error: {0}")]
    Config(String),

    /// Vocabulary could not be built
    #[error("Vocabulary error: {0}")]
    Vocabulary(#[from] VocabularyError),

    /// Features could not be computed or combined
    #[error("Featurization error: {0}")]
    Featurization(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Reasons a vocabulary can end up empty after fitting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VocabularyError {
    /// No term was extracted from the corpus at all.
    #[error("empty vocabulary; perhaps the documents only contain stop words")]
    Empty,

    /// Every extracted term was removed by the document frequency bounds
    /// or the feature cap.
    #[error("after pruning, no terms remain; try a lower min_df or a higher max_df")]
    Pruned,

    /// `max_df` resolves to fewer documents than `min_df`.
    #[error("max_df corresponds to {max_docs} documents, fewer than min_df ({min_docs})")]
    InconsistentDfBounds { min_docs: f64, max_docs: f64 },
}

/// Result type alias for operations that may fail with WordbagError.
pub type Result<T> = std::result::Result<T, WordbagError>;

impl WordbagError {
    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        WordbagError::Analysis(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        WordbagError::Config(msg.into())
    }

    /// Create a new featurization error.
    pub fn featurization<S: Into<String>>(msg: S) -> Self {
        WordbagError::Featurization(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        WordbagError::Serialization(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        WordbagError::Other(msg.into())
    }
}

impl From<bincode::Error> for WordbagError {
    fn from(err: bincode::Error) -> Self {
        WordbagError::Serialization(err.to_string())
    }
}
