//! # Wordbag
//!
//! Bag-of-words featurization and BILOU entity tagging for NLU pipelines.
//!
//! ## Features
//!
//! - Word and character n-gram count vectors
//! - Shared or per-channel vocabularies for text, intents and responses
//! - Out-of-vocabulary substitution and number normalization
//! - Dense, sparse and per-token sequence output
//! - BILOU tags from entity character offsets

pub mod analysis;
pub mod error;
pub mod features;
pub mod message;
pub mod tagging;

pub mod prelude {
    pub use crate::analysis::token::Token;
    pub use crate::error::{Result, VocabularyError, WordbagError};
    pub use crate::features::{
        CountVectorsConfig, CountVectorsFeaturizer, FeaturizerState, Features, Lemmatizer,
    };
    pub use crate::message::{EntitySpan, Message, MessageValue, TrainingData};
    pub use crate::tagging::bilou::{bilou_tags, build_tag_id_dict, tags_to_ids};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
