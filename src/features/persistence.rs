//! Saving and restoring a featurizer.
//!
//! The configuration, the normalizer and the learned vocabularies are written
//! as one bincode blob. Vectorizers are rebuilt around the vocabularies on
//! load, which recompiles their regexes.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WordbagError};
use crate::features::config::CountVectorsConfig;
use crate::features::featurizer::{CountVectorsFeaturizer, FeaturizerState, Vectorizers};
use crate::features::normalizer::TextNormalizer;
use crate::features::vectorizer::{CountVectorizer, Vectorizer};
use crate::features::vocabulary::Vocabulary;

/// What [`CountVectorsFeaturizer::load`] needs to find a persisted featurizer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistMetadata {
    /// File name relative to the model directory.
    pub file: String,
}

#[derive(Serialize, Deserialize)]
enum VocabularySnapshot {
    Shared(Vocabulary),
    Separate { text: Vocabulary, label: Vocabulary },
}

#[derive(Serialize, Deserialize)]
enum StateSnapshot {
    Untrained,
    Failed,
    Ready(VocabularySnapshot),
    TestDataFeaturized(VocabularySnapshot),
}

#[derive(Serialize, Deserialize)]
struct FeaturizerSnapshot {
    config: CountVectorsConfig,
    normalizer: TextNormalizer,
    state: StateSnapshot,
}

fn vocabulary_of(vectorizer: &CountVectorizer) -> Vocabulary {
    vectorizer.vocabulary().cloned().unwrap_or_default()
}

impl From<&Vectorizers> for VocabularySnapshot {
    fn from(vectorizers: &Vectorizers) -> Self {
        match vectorizers {
            Vectorizers::Shared(shared) => VocabularySnapshot::Shared(vocabulary_of(shared)),
            Vectorizers::Separate { text, label } => VocabularySnapshot::Separate {
                text: vocabulary_of(text),
                label: vocabulary_of(label),
            },
        }
    }
}

impl From<&CountVectorsFeaturizer> for FeaturizerSnapshot {
    fn from(featurizer: &CountVectorsFeaturizer) -> Self {
        let state = match featurizer.state() {
            FeaturizerState::Untrained => StateSnapshot::Untrained,
            FeaturizerState::Failed => StateSnapshot::Failed,
            FeaturizerState::Ready(v) => StateSnapshot::Ready(v.into()),
            FeaturizerState::TestDataFeaturized(v) => StateSnapshot::TestDataFeaturized(v.into()),
        };
        FeaturizerSnapshot {
            config: featurizer.config().clone(),
            normalizer: featurizer.normalizer().clone(),
            state,
        }
    }
}

impl FeaturizerSnapshot {
    fn restore_vectorizers(&self, snapshot: VocabularySnapshot) -> Result<Vectorizers> {
        let rebuild = |vocabulary| {
            CountVectorizer::with_vocabulary(&self.config, self.normalizer.clone(), vocabulary)
        };
        Ok(match snapshot {
            VocabularySnapshot::Shared(vocabulary) => Vectorizers::Shared(rebuild(vocabulary)?),
            VocabularySnapshot::Separate { text, label } => Vectorizers::Separate {
                text: rebuild(text)?,
                label: rebuild(label)?,
            },
        })
    }
}

impl TryFrom<FeaturizerSnapshot> for CountVectorsFeaturizer {
    type Error = WordbagError;

    fn try_from(mut snapshot: FeaturizerSnapshot) -> Result<Self> {
        let state = match std::mem::replace(&mut snapshot.state, StateSnapshot::Untrained) {
            StateSnapshot::Untrained => FeaturizerState::Untrained,
            StateSnapshot::Failed => FeaturizerState::Failed,
            StateSnapshot::Ready(v) => FeaturizerState::Ready(snapshot.restore_vectorizers(v)?),
            StateSnapshot::TestDataFeaturized(v) => {
                FeaturizerState::TestDataFeaturized(snapshot.restore_vectorizers(v)?)
            }
        };
        Ok(CountVectorsFeaturizer::from_parts(
            snapshot.config,
            snapshot.normalizer,
            state,
        ))
    }
}

impl CountVectorsFeaturizer {
    /// Write this featurizer to `<model_dir>/<file_name>.bin`.
    pub fn persist<P: AsRef<Path>>(&self, file_name: &str, model_dir: P) -> Result<PersistMetadata> {
        let file = format!("{file_name}.bin");
        let mut writer = BufWriter::new(File::create(model_dir.as_ref().join(&file))?);
        bincode::serialize_into(&mut writer, &FeaturizerSnapshot::from(self))?;
        writer.flush()?;
        Ok(PersistMetadata { file })
    }

    /// Restore a persisted featurizer.
    ///
    /// When there is no metadata, or the file cannot be read, a warning is
    /// logged and a fresh untrained featurizer is built from `config`.
    pub fn load<P: AsRef<Path>>(
        config: CountVectorsConfig,
        meta: Option<&PersistMetadata>,
        model_dir: P,
    ) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        match meta {
            Some(meta) => {
                let path = model_dir.join(&meta.file);
                match Self::read(&path) {
                    Ok(featurizer) => return Ok(featurizer),
                    Err(err) => warn!(
                        "failed to load featurizer from {}: {err}; starting untrained",
                        path.display()
                    ),
                }
            }
            None => warn!(
                "failed to load featurizer, maybe path {} doesn't exist; starting untrained",
                model_dir.display()
            ),
        }
        Self::new(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let snapshot: FeaturizerSnapshot = bincode::deserialize_from(reader)?;
        Self::try_from(snapshot)
    }
}
