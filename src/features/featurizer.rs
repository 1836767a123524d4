//! The count-vectors featurizer.
//!
//! Learns one vocabulary shared by message text, intents and responses, or
//! one for message text and one for intent/response labels, and writes
//! bag-of-words (or per-token) features onto messages.
//!
//! # Examples
//!
//! ```
//! use wordbag::features::config::CountVectorsConfig;
//! use wordbag::features::featurizer::CountVectorsFeaturizer;
//! use wordbag::message::{Message, TrainingData, TEXT_FEATURES};
//!
//! let mut training_data = TrainingData::new(vec![
//!     Message::builder("book a flight").intent("book").build(),
//!     Message::builder("cancel my flight").intent("cancel").build(),
//! ]);
//!
//! let config = CountVectorsConfig {
//!     use_shared_vocab: true,
//!     ..Default::default()
//! };
//! let mut featurizer = CountVectorsFeaturizer::new(config).unwrap();
//! featurizer.train(&mut training_data, None).unwrap();
//! assert!(featurizer.is_trained());
//!
//! let mut message = Message::new("flight to cancel");
//! featurizer.process(&mut message, None).unwrap();
//! let features = message.get_features(TEXT_FEATURES).unwrap();
//! assert_eq!(features.as_dense().unwrap().sum(), 2.0);
//! ```

use std::mem;

use log::{error, info};
use ndarray::{Array3, s};

use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::whitespace::WhitespaceTokenizer;
use crate::error::{Result, WordbagError};
use crate::features::config::CountVectorsConfig;
use crate::features::matrix::{BatchFeatures, Features, SEQUENCE_PADDING};
use crate::features::normalizer::{Lemmatizer, TextNormalizer};
use crate::features::vectorizer::{CountVectorizer, Vectorizer};
use crate::message::{
    INTENT_FEATURES, INTENT_TOKENS, LEMMA_TOKENS, Message, MessageValue, RESPONSE_FEATURES,
    RESPONSE_TOKENS, TEXT_FEATURES, TOKENS, TrainingData,
};

/// Text to featurize for a message: lemmas if available, then token texts,
/// then the raw text.
pub fn message_text(message: &Message) -> String {
    if let Some(tokens) = message.get_tokens(LEMMA_TOKENS).filter(|t| !t.is_empty()) {
        join(tokens.iter().map(|t| t.lemma_or_text()))
    } else if let Some(tokens) = message.get_tokens(TOKENS).filter(|t| !t.is_empty()) {
        join(tokens.iter().map(|t| t.text.as_str()))
    } else {
        message.text().to_string()
    }
}

/// Space-joined intent tokens; empty when the message has none.
pub fn intent_text(message: &Message) -> String {
    message
        .get_tokens(INTENT_TOKENS)
        .map(|tokens| join(tokens.iter().map(|t| t.text.as_str())))
        .unwrap_or_default()
}

/// Space-joined response tokens; a single space when the message has none.
pub fn response_text(message: &Message) -> String {
    message
        .get_tokens(RESPONSE_TOKENS)
        .map(|tokens| join(tokens.iter().map(|t| t.text.as_str())))
        .unwrap_or_else(|| " ".to_string())
}

fn join<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.collect::<Vec<_>>().join(" ")
}

/// The fitted vectorizers of a trained featurizer.
#[derive(Clone, Debug)]
pub enum Vectorizers {
    /// One vocabulary for every channel.
    Shared(CountVectorizer),
    /// Message text on `text`; intents and responses on `label`.
    Separate {
        text: CountVectorizer,
        label: CountVectorizer,
    },
}

impl Vectorizers {
    /// Vectorizer for message text.
    pub fn text(&self) -> &CountVectorizer {
        match self {
            Vectorizers::Shared(vectorizer) => vectorizer,
            Vectorizers::Separate { text, .. } => text,
        }
    }

    /// Vectorizer for intent and response labels.
    pub fn label(&self) -> &CountVectorizer {
        match self {
            Vectorizers::Shared(vectorizer) => vectorizer,
            Vectorizers::Separate { label, .. } => label,
        }
    }
}

/// Lifecycle of a featurizer.
///
/// `Untrained` moves to `Ready` or `Failed` on training; `Ready` moves to
/// `TestDataFeaturized` the first time a held-out test set is featurized.
#[derive(Clone, Debug)]
pub enum FeaturizerState {
    Untrained,
    /// Training produced no usable vocabulary.
    Failed,
    Ready(Vectorizers),
    TestDataFeaturized(Vectorizers),
}

impl FeaturizerState {
    pub fn vectorizers(&self) -> Option<&Vectorizers> {
        match self {
            FeaturizerState::Ready(v) | FeaturizerState::TestDataFeaturized(v) => Some(v),
            FeaturizerState::Untrained | FeaturizerState::Failed => None,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.vectorizers().is_some()
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FeaturizerState::Failed)
    }

    pub fn is_test_data_featurized(&self) -> bool {
        matches!(self, FeaturizerState::TestDataFeaturized(_))
    }
}

/// Per-channel corpora of a set of examples.
struct Channels {
    text: Vec<String>,
    intent: Vec<String>,
    response: Vec<String>,
}

impl Channels {
    fn from_examples<'a>(examples: impl Iterator<Item = &'a Message>) -> Self {
        let mut channels = Channels {
            text: Vec::new(),
            intent: Vec::new(),
            response: Vec::new(),
        };
        for example in examples {
            channels.text.push(message_text(example));
            channels.intent.push(intent_text(example));
            channels.response.push(response_text(example));
        }
        channels
    }
}

fn concat(corpora: &[&[String]]) -> Vec<String> {
    corpora.iter().flat_map(|corpus| corpus.iter().cloned()).collect()
}

/// Features computed for one example: text, intent, response.
type ExampleFeatures = (Features, Features, Features);

/// Converts message text, intents and responses into count features.
#[derive(Clone, Debug)]
pub struct CountVectorsFeaturizer {
    config: CountVectorsConfig,
    normalizer: TextNormalizer,
    state: FeaturizerState,
}

impl CountVectorsFeaturizer {
    /// Create an untrained featurizer.
    pub fn new(config: CountVectorsConfig) -> Result<Self> {
        config.validate()?;
        config.check_analyzer();
        let normalizer = TextNormalizer::from_config(&config);
        Ok(CountVectorsFeaturizer {
            config,
            normalizer,
            state: FeaturizerState::Untrained,
        })
    }

    pub(crate) fn from_parts(
        config: CountVectorsConfig,
        normalizer: TextNormalizer,
        state: FeaturizerState,
    ) -> Self {
        CountVectorsFeaturizer {
            config,
            normalizer,
            state,
        }
    }

    pub fn config(&self) -> &CountVectorsConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    pub fn state(&self) -> &FeaturizerState {
        &self.state
    }

    pub fn is_trained(&self) -> bool {
        self.state.is_trained()
    }

    /// Fit the vocabularies on the intent examples of `training_data` and
    /// set `text_features`, `intent_features` and `response_features` on
    /// each of them.
    ///
    /// A vocabulary that ends up empty is not an error: the featurizer moves
    /// to [`FeaturizerState::Failed`] and no example is modified. Check
    /// [`is_trained`](Self::is_trained) afterwards.
    pub fn train(
        &mut self,
        training_data: &mut TrainingData,
        lemmatizer: Option<&dyn Lemmatizer>,
    ) -> Result<()> {
        let normalizer = match lemmatizer {
            Some(lemmatizer) => self.normalizer.with_lemmatized_oov_words(lemmatizer),
            None => self.normalizer.clone(),
        };

        let channels = Channels::from_examples(training_data.intent_examples());
        normalizer.check_oov_present(&channels.text, "message");
        normalizer.check_oov_present(&channels.intent, "intent");
        normalizer.check_oov_present(&channels.response, "response");

        let (vectorizers, features) = match self.fit_channels(&normalizer, &channels) {
            Ok(fitted) => fitted,
            Err(WordbagError::Vocabulary(err)) => {
                error!("count vectors featurizer could not be trained: {err}");
                self.state = FeaturizerState::Failed;
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        let updates = training_data
            .intent_examples()
            .zip(features)
            .map(|(example, (text, intent, response))| {
                Ok::<_, WordbagError>((self.merge_text_features(example, text)?, intent, response))
            })
            .collect::<Result<Vec<_>>>()?;

        for (example, (text, intent, response)) in training_data.intent_examples_mut().zip(updates)
        {
            example.set(TEXT_FEATURES, MessageValue::Features(text));
            example.set(INTENT_FEATURES, MessageValue::Features(intent));
            example.set(RESPONSE_FEATURES, MessageValue::Features(response));
        }

        self.normalizer = normalizer;
        self.state = FeaturizerState::Ready(vectorizers);
        Ok(())
    }

    fn fit_channels(
        &self,
        normalizer: &TextNormalizer,
        channels: &Channels,
    ) -> Result<(Vectorizers, Vec<ExampleFeatures>)> {
        let new_vectorizer = || CountVectorizer::from_config(&self.config, normalizer.clone());

        let vectorizers = if self.config.use_shared_vocab {
            let mut shared = new_vectorizer()?;
            // Sequence vocabularies are not fitted on responses.
            if self.config.sequence {
                shared.fit(&concat(&[channels.text.as_slice(), channels.intent.as_slice()]))?;
            } else {
                shared.fit(&concat(&[
                    channels.text.as_slice(),
                    channels.intent.as_slice(),
                    channels.response.as_slice(),
                ]))?;
            }
            Vectorizers::Shared(shared)
        } else {
            let mut text = new_vectorizer()?;
            text.fit(&channels.text)?;
            let mut label = new_vectorizer()?;
            if self.config.sequence {
                label.fit(&concat(&[channels.intent.as_slice(), channels.response.as_slice()]))?;
            } else {
                label.fit(&channels.intent)?;
            }
            Vectorizers::Separate { text, label }
        };

        let text = self.featurize(vectorizers.text(), &channels.text)?;
        let intent = self.featurize(vectorizers.label(), &channels.intent)?;
        let response = self.featurize(vectorizers.label(), &channels.response)?;

        let features = text
            .into_examples()
            .into_iter()
            .zip(intent.into_examples())
            .zip(response.into_examples())
            .map(|((text, intent), response)| (text, intent, response))
            .collect();

        Ok((vectorizers, features))
    }

    /// Featurize `message`, and on the first call that supplies `test_data`,
    /// the intents and responses of the test set.
    ///
    /// Returns the test set when it was featurized by this call. An untrained
    /// or failed featurizer logs an error and leaves the message unchanged.
    pub fn process<'a>(
        &mut self,
        message: &mut Message,
        test_data: Option<&'a mut TrainingData>,
    ) -> Result<Option<&'a mut TrainingData>> {
        if !self.state.is_trained() {
            error!(
                "there is no trained count vectorizer: the component is either not trained \
                 or didn't receive enough training data"
            );
            return Ok(None);
        }

        let featurized_test_data = match test_data {
            Some(test_data) if !self.state.is_test_data_featurized() => {
                self.featurize_test_data(test_data)?;
                Some(test_data)
            }
            _ => None,
        };

        let vectorizers = self
            .state
            .vectorizers()
            .ok_or_else(|| WordbagError::featurization("featurizer is not trained"))?;
        let features = self
            .featurize(vectorizers.text(), &[message_text(message)])?
            .into_examples()
            .into_iter()
            .next()
            .ok_or_else(|| WordbagError::featurization("no features produced for message"))?;
        let features = self.merge_text_features(message, features)?;
        message.set(TEXT_FEATURES, MessageValue::Features(features));

        Ok(featurized_test_data)
    }

    fn featurize_test_data(&mut self, test_data: &mut TrainingData) -> Result<()> {
        info!("adding bag-of-words features to the intents of the test set for the first time");

        let channels = Channels::from_examples(test_data.intent_examples());
        self.normalizer
            .check_oov_present(
                &concat(&[channels.intent.as_slice(), channels.response.as_slice()]),
                "test",
            );

        let vectorizers = self
            .state
            .vectorizers()
            .ok_or_else(|| WordbagError::featurization("featurizer is not trained"))?;
        let intent = self.featurize(vectorizers.label(), &channels.intent)?;
        let response = self.featurize(vectorizers.label(), &channels.response)?;

        let features = intent.into_examples().into_iter().zip(response.into_examples());
        for (example, (intent, response)) in test_data.intent_examples_mut().zip(features) {
            example.set(INTENT_FEATURES, MessageValue::Features(intent));
            example.set(RESPONSE_FEATURES, MessageValue::Features(response));
        }

        self.state = match mem::replace(&mut self.state, FeaturizerState::Untrained) {
            FeaturizerState::Ready(vectorizers) => FeaturizerState::TestDataFeaturized(vectorizers),
            state => state,
        };
        Ok(())
    }

    /// Dense bag-of-words features are appended to existing text features;
    /// every other kind replaces them.
    fn merge_text_features(&self, message: &Message, features: Features) -> Result<Features> {
        match features {
            Features::Dense(row) if !self.config.sequence && !self.config.sparse => {
                Features::combine_with_existing(message.get_features(TEXT_FEATURES), row)
            }
            features => Ok(features),
        }
    }

    fn featurize(&self, vectorizer: &CountVectorizer, texts: &[String]) -> Result<BatchFeatures> {
        if self.config.sequence {
            return self.create_sequence(vectorizer, texts);
        }

        let counts = vectorizer.transform(texts)?;
        Ok(if self.config.sparse {
            BatchFeatures::Sparse(counts)
        } else {
            BatchFeatures::Dense(counts.to_dense())
        })
    }

    /// One row per whitespace-separated token of each text.
    ///
    /// Dense output is padded to the longest text of the batch with
    /// [`SEQUENCE_PADDING`]; sparse output is not padded.
    pub fn create_sequence(
        &self,
        vectorizer: &CountVectorizer,
        texts: &[String],
    ) -> Result<BatchFeatures> {
        let tokenizer = WhitespaceTokenizer::new();
        let matrices = texts
            .iter()
            .map(|text| {
                let tokens: Vec<String> = tokenizer.tokenize(text)?.map(|t| t.text).collect();
                vectorizer.transform(&tokens)
            })
            .collect::<Result<Vec<_>>>()?;

        if self.config.sparse {
            return Ok(BatchFeatures::SparseSequence(matrices));
        }

        let feature_len = vectorizer.vocabulary_size();
        let seq_len = matrices.iter().map(|m| m.n_rows()).max().unwrap_or(0);
        let mut batch = Array3::from_elem((matrices.len(), seq_len, feature_len), SEQUENCE_PADDING);
        for (i, matrix) in matrices.iter().enumerate() {
            batch
                .slice_mut(s![i, ..matrix.n_rows(), ..])
                .assign(&matrix.to_dense());
        }
        Ok(BatchFeatures::DenseSequence(batch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;
    use crate::features::config::DocumentFrequency;
    use ndarray::array;

    fn tokens(text: &str) -> Vec<Token> {
        let mut offset = 0;
        text.split(' ')
            .map(|word| {
                let token = Token::new(word, offset, offset + word.chars().count());
                offset = token.end + 1;
                token
            })
            .collect()
    }

    fn example(text: &str, intent: &str) -> Message {
        Message::builder(text)
            .intent(intent)
            .intent_tokens(tokens(intent))
            .build()
    }

    fn training_data() -> TrainingData {
        TrainingData::new(vec![
            example("hello there", "greet"),
            example("book a table please", "book_table"),
            Message::new("an example without an intent"),
        ])
    }

    #[test]
    fn test_message_text_priority() {
        let raw = Message::new("Raw Text");
        assert_eq!(message_text(&raw), "Raw Text");

        let with_tokens = Message::builder("ignored").tokens(tokens("a b")).build();
        assert_eq!(message_text(&with_tokens), "a b");

        let with_lemmas = Message::builder("ignored")
            .tokens(tokens("a b"))
            .lemma_tokens(vec![
                Token::new("went", 0, 4).with_lemma("go"),
                Token::new("home", 5, 9),
            ])
            .build();
        assert_eq!(message_text(&with_lemmas), "go home");
    }

    #[test]
    fn test_label_texts() {
        let message = Message::new("hi");
        assert_eq!(intent_text(&message), "");
        assert_eq!(response_text(&message), " ");

        let message = Message::builder("hi")
            .intent_tokens(tokens("book table"))
            .response_tokens(tokens("sure thing"))
            .build();
        assert_eq!(intent_text(&message), "book table");
        assert_eq!(response_text(&message), "sure thing");
    }

    #[test]
    fn test_train_sets_features_on_intent_examples() {
        let mut data = training_data();
        let mut featurizer = CountVectorsFeaturizer::new(CountVectorsConfig::default()).unwrap();
        featurizer.train(&mut data, None).unwrap();

        assert!(matches!(featurizer.state(), FeaturizerState::Ready(Vectorizers::Separate { .. })));
        let first = &data.training_examples[0];
        assert!(first.get_features(TEXT_FEATURES).unwrap().as_dense().is_some());
        assert!(first.has(INTENT_FEATURES));
        assert!(first.has(RESPONSE_FEATURES));
        assert!(!data.training_examples[2].has(TEXT_FEATURES));
    }

    #[test]
    fn test_train_appends_to_existing_dense_features() {
        let mut message = example("hello world", "greet");
        message.set(TEXT_FEATURES, MessageValue::Features(Features::Dense(array![7.0])));
        let mut data = TrainingData::new(vec![message]);
        let mut featurizer = CountVectorsFeaturizer::new(CountVectorsConfig::default()).unwrap();
        featurizer.train(&mut data, None).unwrap();

        let features = data.training_examples[0].get_features(TEXT_FEATURES).unwrap();
        assert_eq!(features, &Features::Dense(array![7.0, 1.0, 1.0]));
    }

    #[test]
    fn test_failed_training_leaves_examples_untouched() {
        let mut data = training_data();
        let config = CountVectorsConfig {
            min_df: DocumentFrequency::Count(2),
            ..Default::default()
        };
        let mut featurizer = CountVectorsFeaturizer::new(config).unwrap();
        featurizer.train(&mut data, None).unwrap();

        assert!(featurizer.state().is_failed());
        assert!(data.training_examples.iter().all(|m| !m.has(TEXT_FEATURES)));

        let mut message = Message::new("hello");
        assert!(featurizer.process(&mut message, None).unwrap().is_none());
        assert!(!message.has(TEXT_FEATURES));
    }

    #[test]
    fn test_process_untrained_is_a_no_op() {
        let mut featurizer = CountVectorsFeaturizer::new(CountVectorsConfig::default()).unwrap();
        let mut message = Message::new("hello");
        let mut test_data = training_data();

        assert!(featurizer.process(&mut message, Some(&mut test_data)).unwrap().is_none());
        assert!(!message.has(TEXT_FEATURES));
        assert!(!test_data.training_examples[0].has(INTENT_FEATURES));
    }

    #[test]
    fn test_test_data_is_featurized_once() {
        let mut data = training_data();
        let mut featurizer = CountVectorsFeaturizer::new(CountVectorsConfig::default()).unwrap();
        featurizer.train(&mut data, None).unwrap();

        let mut test_data = TrainingData::new(vec![example("hello", "greet")]);
        let mut message = Message::new("hello");
        let returned = featurizer.process(&mut message, Some(&mut test_data)).unwrap();
        assert!(returned.is_some());
        assert!(featurizer.state().is_test_data_featurized());
        assert!(test_data.training_examples[0].has(INTENT_FEATURES));

        let mut again = TrainingData::new(vec![example("hello", "greet")]);
        let returned = featurizer.process(&mut message, Some(&mut again)).unwrap();
        assert!(returned.is_none());
        assert!(!again.training_examples[0].has(INTENT_FEATURES));
        assert!(message.has(TEXT_FEATURES));
    }

    #[test]
    fn test_dense_sequence_padding() {
        let config = CountVectorsConfig {
            sequence: true,
            ..Default::default()
        };
        let mut data = TrainingData::new(vec![
            example("hello world", "greet"),
            example("book that table", "book_table"),
        ]);
        let mut featurizer = CountVectorsFeaturizer::new(config).unwrap();
        featurizer.train(&mut data, None).unwrap();

        let vectorizers = featurizer.state().vectorizers().unwrap();
        let vocabulary_size = vectorizers.text().vocabulary_size();
        let batch = featurizer
            .create_sequence(
                vectorizers.text(),
                &["hello world".to_string(), "book that table".to_string()],
            )
            .unwrap();

        match batch {
            BatchFeatures::DenseSequence(batch) => {
                assert_eq!(batch.shape(), &[2, 3, vocabulary_size]);
                assert!(batch.slice(s![0, 2, ..]).iter().all(|&v| v == -1.0));
                assert_eq!(batch.slice(s![0, 0, ..]).sum(), 1.0);
            }
            other => panic!("expected a dense sequence, got {other:?}"),
        }
    }

    #[test]
    fn test_sparse_sequence_is_not_padded() {
        let config = CountVectorsConfig {
            sequence: true,
            sparse: true,
            use_shared_vocab: true,
            ..Default::default()
        };
        let mut data = TrainingData::new(vec![
            example("hello world", "greet"),
            example("book that table", "book_table"),
        ]);
        let mut featurizer = CountVectorsFeaturizer::new(config).unwrap();
        featurizer.train(&mut data, None).unwrap();

        let features = data.training_examples[0].get_features(TEXT_FEATURES).unwrap();
        assert_eq!(features.as_sparse().unwrap().n_rows(), 2);
        let features = data.training_examples[1].get_features(TEXT_FEATURES).unwrap();
        assert_eq!(features.as_sparse().unwrap().n_rows(), 3);
    }
}
