//! Count-vector featurization.
//!
//! - [`config`] - Featurizer options and their JSON form
//! - [`normalizer`] - Case folding, accent stripping and OOV substitution
//! - [`vocabulary`] - Document-frequency filtered vocabularies
//! - [`vectorizer`] - Word and character count vectorizers
//! - [`matrix`] - Dense and sparse feature containers
//! - [`featurizer`] - Training and processing of messages
//! - [`persistence`] - Saving and restoring a trained featurizer

pub mod config;
pub mod featurizer;
pub mod matrix;
pub mod normalizer;
pub mod persistence;
pub mod vectorizer;
pub mod vocabulary;

pub use config::{Analyzer, CountVectorsConfig, DocumentFrequency};
pub use featurizer::{CountVectorsFeaturizer, FeaturizerState};
pub use matrix::{CsrMatrix, Features};
pub use normalizer::{Lemmatizer, TextNormalizer};
pub use persistence::PersistMetadata;
pub use vectorizer::{CountVectorizer, Vectorizer};
pub use vocabulary::Vocabulary;
