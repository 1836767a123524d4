//! Message and training data containers.
//!
//! A [`Message`] is an associative container: raw text plus named fields set
//! by upstream components (tokens, entity annotations) and by this crate
//! (features, BILOU tags). Field names are the constants in this module.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analysis::token::Token;
use crate::features::matrix::Features;

/// Raw message text.
pub const TEXT: &str = "text";
/// Tokens of the message text.
pub const TOKENS: &str = "tokens";
/// Tokens of the message text carrying lemmas.
pub const LEMMA_TOKENS: &str = "lemma_tokens";
/// Intent label.
pub const INTENT: &str = "intent";
/// Tokens of the intent label.
pub const INTENT_TOKENS: &str = "intent_tokens";
/// Tokens of the response text.
pub const RESPONSE_TOKENS: &str = "response_tokens";
/// Entity span annotations.
pub const ENTITIES: &str = "entities";
/// Features of the message text.
pub const TEXT_FEATURES: &str = "text_features";
/// Features of the intent label.
pub const INTENT_FEATURES: &str = "intent_features";
/// Features of the response text.
pub const RESPONSE_FEATURES: &str = "response_features";
/// Per-token BILOU tags.
pub const BILOU_ENTITIES: &str = "bilou_entities";

/// An entity annotation in character offsets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Character offset where the entity starts (inclusive)
    pub start: usize,
    /// Character offset where the entity ends (exclusive)
    pub end: usize,
    /// Entity label
    pub entity: String,
    /// Annotated surface value, if recorded
    pub value: Option<String>,
}

impl EntitySpan {
    pub fn new<S: Into<String>>(start: usize, end: usize, entity: S) -> Self {
        EntitySpan {
            start,
            end,
            entity: entity.into(),
            value: None,
        }
    }

    pub fn with_value<S: Into<String>>(mut self, value: S) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// A value stored in a message field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MessageValue {
    Text(String),
    Tokens(Vec<Token>),
    Entities(Vec<EntitySpan>),
    Features(Features),
    Tags(Vec<String>),
}

/// A single utterance flowing through the pipeline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    text: String,
    fields: HashMap<String, MessageValue>,
}

impl Message {
    /// Create a new message with no fields set.
    pub fn new<S: Into<String>>(text: S) -> Self {
        Message {
            text: text.into(),
            fields: HashMap::new(),
        }
    }

    /// Create a builder for constructing messages.
    pub fn builder<S: Into<String>>(text: S) -> MessageBuilder {
        MessageBuilder::new(text)
    }

    /// The raw message text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Set a field, replacing any previous value.
    pub fn set<S: Into<String>>(&mut self, name: S, value: MessageValue) {
        self.fields.insert(name.into(), value);
    }

    /// Get a field value.
    pub fn get(&self, name: &str) -> Option<&MessageValue> {
        self.fields.get(name)
    }

    /// Check if the message has a field.
    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Remove a field from the message.
    pub fn remove(&mut self, name: &str) -> Option<MessageValue> {
        self.fields.remove(name)
    }

    /// A text field, or `None` if absent or of another kind.
    pub fn get_text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(MessageValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// A token field, or `None` if absent or of another kind.
    pub fn get_tokens(&self, name: &str) -> Option<&[Token]> {
        match self.fields.get(name) {
            Some(MessageValue::Tokens(tokens)) => Some(tokens),
            _ => None,
        }
    }

    /// A features field, or `None` if absent or of another kind.
    pub fn get_features(&self, name: &str) -> Option<&Features> {
        match self.fields.get(name) {
            Some(MessageValue::Features(features)) => Some(features),
            _ => None,
        }
    }

    /// A tag sequence field, or `None` if absent or of another kind.
    pub fn get_tags(&self, name: &str) -> Option<&[String]> {
        match self.fields.get(name) {
            Some(MessageValue::Tags(tags)) => Some(tags),
            _ => None,
        }
    }

    /// The entity annotations; absent annotations read as an empty list.
    pub fn entities(&self) -> &[EntitySpan] {
        match self.fields.get(ENTITIES) {
            Some(MessageValue::Entities(entities)) => entities,
            _ => &[],
        }
    }

    /// The intent label, if any.
    pub fn intent(&self) -> Option<&str> {
        self.get_text(INTENT)
    }
}

/// A builder for constructing messages in a fluent manner.
#[derive(Debug)]
pub struct MessageBuilder {
    message: Message,
}

impl MessageBuilder {
    pub fn new<S: Into<String>>(text: S) -> Self {
        MessageBuilder {
            message: Message::new(text),
        }
    }

    pub fn intent<S: Into<String>>(mut self, intent: S) -> Self {
        self.message.set(INTENT, MessageValue::Text(intent.into()));
        self
    }

    pub fn tokens(mut self, tokens: Vec<Token>) -> Self {
        self.message.set(TOKENS, MessageValue::Tokens(tokens));
        self
    }

    pub fn lemma_tokens(mut self, tokens: Vec<Token>) -> Self {
        self.message.set(LEMMA_TOKENS, MessageValue::Tokens(tokens));
        self
    }

    pub fn intent_tokens(mut self, tokens: Vec<Token>) -> Self {
        self.message.set(INTENT_TOKENS, MessageValue::Tokens(tokens));
        self
    }

    pub fn response_tokens(mut self, tokens: Vec<Token>) -> Self {
        self.message.set(RESPONSE_TOKENS, MessageValue::Tokens(tokens));
        self
    }

    pub fn entities(mut self, entities: Vec<EntitySpan>) -> Self {
        self.message.set(ENTITIES, MessageValue::Entities(entities));
        self
    }

    pub fn text_features(mut self, features: Features) -> Self {
        self.message.set(TEXT_FEATURES, MessageValue::Features(features));
        self
    }

    pub fn build(self) -> Message {
        self.message
    }
}

/// A corpus of training examples.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingData {
    pub training_examples: Vec<Message>,
}

impl TrainingData {
    pub fn new(training_examples: Vec<Message>) -> Self {
        TrainingData { training_examples }
    }

    /// Examples that carry an intent label, in corpus order.
    pub fn intent_examples(&self) -> impl Iterator<Item = &Message> {
        self.training_examples.iter().filter(|m| m.intent().is_some())
    }

    /// Mutable access to the examples that carry an intent label.
    pub fn intent_examples_mut(&mut self) -> impl Iterator<Item = &mut Message> {
        self.training_examples
            .iter_mut()
            .filter(|m| m.intent().is_some())
    }

    pub fn len(&self) -> usize {
        self.training_examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.training_examples.is_empty()
    }
}
