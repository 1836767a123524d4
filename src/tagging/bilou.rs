//! BILOU tagging of entity spans.
//!
//! Entity annotations are character ranges; sequence labelling needs one tag
//! per token. A token is tagged `U-<label>` when an entity covers exactly that
//! token, otherwise `B-`, `I-` and `L-` mark the first, inner and last tokens
//! of a multi-token entity. Tokens outside every entity are `O`.
//!
//! Entities whose offsets do not fall on token boundaries are skipped. The
//! tokens they overlap keep the `-` marker, which shows where tokenization
//! and annotation disagree.
//!
//! # Examples
//!
//! ```
//! use wordbag::analysis::token::Token;
//! use wordbag::message::EntitySpan;
//! use wordbag::tagging::bilou::bilou_tags;
//!
//! let tokens = vec![
//!     Token::new("fly", 0, 3),
//!     Token::new("to", 4, 6),
//!     Token::new("new", 7, 10),
//!     Token::new("york", 11, 15),
//! ];
//! let entities = vec![EntitySpan::new(7, 15, "city")];
//!
//! assert_eq!(bilou_tags(&tokens, &entities), vec!["O", "O", "B-city", "L-city"]);
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use crate::analysis::token::Token;
use crate::message::{BILOU_ENTITIES, EntitySpan, Message, MessageValue, TOKENS, TrainingData};

/// Tag of tokens outside every entity.
pub const OUTSIDE_TAG: &str = "O";

/// Tag of tokens overlapping an entity that does not align with token
/// boundaries.
pub const UNKNOWN_TAG: &str = "-";

/// A tag-to-id mapping; `"O"` is always 0.
pub type TagIdDict = HashMap<String, usize>;

/// The position of a token inside an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BilouPrefix {
    Begin,
    Inside,
    Unit,
    Last,
}

impl BilouPrefix {
    /// All prefixes in id assignment order.
    pub const ALL: [BilouPrefix; 4] = [
        BilouPrefix::Begin,
        BilouPrefix::Inside,
        BilouPrefix::Unit,
        BilouPrefix::Last,
    ];

    /// The prefix as written in front of a label, e.g. `"B-"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            BilouPrefix::Begin => "B-",
            BilouPrefix::Inside => "I-",
            BilouPrefix::Unit => "U-",
            BilouPrefix::Last => "L-",
        }
    }

    pub fn letter(&self) -> char {
        match self {
            BilouPrefix::Begin => 'B',
            BilouPrefix::Inside => 'I',
            BilouPrefix::Unit => 'U',
            BilouPrefix::Last => 'L',
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == prefix)
    }

    /// `"<prefix><label>"`.
    pub fn tag(&self, label: &str) -> String {
        format!("{}{label}", self.as_str())
    }
}

impl fmt::Display for BilouPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// The BILOU prefix of a tag, if it has one.
pub fn bilou_prefix_from_tag(tag: &str) -> Option<BilouPrefix> {
    tag.get(..2).and_then(BilouPrefix::from_prefix)
}

/// The entity label of a tag, i.e. the tag without its BILOU prefix.
pub fn entity_name_from_tag(tag: &str) -> &str {
    match bilou_prefix_from_tag(tag) {
        Some(_) => &tag[2..],
        None => tag,
    }
}

/// Strip the BILOU prefix from every tag.
pub fn remove_bilou_prefixes<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    tags.iter()
        .map(|tag| entity_name_from_tag(tag.as_ref()).to_string())
        .collect()
}

/// BILOU tags for `tokens`, with `O` for tokens outside every entity.
pub fn bilou_tags(tokens: &[Token], entities: &[EntitySpan]) -> Vec<String> {
    bilou_tags_from_offsets(tokens, entities, OUTSIDE_TAG)
}

/// BILOU tags for `tokens`, with `missing` for tokens outside every entity.
///
/// The result always has one tag per token. Later entities overwrite the
/// tags of earlier ones where they overlap.
pub fn bilou_tags_from_offsets(
    tokens: &[Token],
    entities: &[EntitySpan],
    missing: &str,
) -> Vec<String> {
    let mut start_to_index = HashMap::new();
    let mut end_to_index = HashMap::new();
    for (index, token) in tokens.iter().enumerate() {
        start_to_index.insert(token.start, index);
        end_to_index.insert(token.end, index);
    }

    let mut tags = vec![UNKNOWN_TAG.to_string(); tokens.len()];

    for entity in entities {
        // Only entities that align with token boundaries are tagged.
        let (Some(&first), Some(&last)) =
            (start_to_index.get(&entity.start), end_to_index.get(&entity.end))
        else {
            continue;
        };

        if first == last {
            tags[first] = BilouPrefix::Unit.tag(&entity.entity);
        } else {
            tags[first] = BilouPrefix::Begin.tag(&entity.entity);
            for tag in tags.iter_mut().take(last).skip(first + 1) {
                *tag = BilouPrefix::Inside.tag(&entity.entity);
            }
            tags[last] = BilouPrefix::Last.tag(&entity.entity);
        }
    }

    let covered: HashSet<usize> = entities.iter().flat_map(|e| e.start..e.end).collect();
    for (tag, token) in tags.iter_mut().zip(tokens) {
        let overlaps = (token.start..token.end).any(|position| covered.contains(&position));
        if !overlaps && *tag == UNKNOWN_TAG {
            *tag = missing.to_string();
        }
    }

    tags
}

/// The entity annotations of a message as spans.
pub fn map_message_entities(message: &Message) -> Vec<EntitySpan> {
    message.entities().to_vec()
}

/// Set `bilou_entities` on every example that has entity annotations.
pub fn apply_bilou_schema(training_data: &mut TrainingData) {
    for message in &mut training_data.training_examples {
        if message.entities().is_empty() {
            continue;
        }

        let entities = map_message_entities(message);
        let tags = bilou_tags(message.get_tokens(TOKENS).unwrap_or_default(), &entities);
        message.set(BILOU_ENTITIES, MessageValue::Tags(tags));
    }
}

/// Assign ids to every BILOU tag seen in the training data.
///
/// Labels are sorted, then each label gets four consecutive ids in
/// `B, I, U, L` order starting at 1. `"O"` is 0.
///
/// The unresolved marker `-` counts as a label and sorts before every
/// letter, so corpora with misaligned entities reserve `B--` to `L--` as
/// ids 1 to 4. A bare `-` tag is still no key of the dictionary.
pub fn build_tag_id_dict(training_data: &TrainingData) -> TagIdDict {
    let labels: BTreeSet<&str> = training_data
        .training_examples
        .iter()
        .filter_map(|example| example.get_tags(BILOU_ENTITIES))
        .flatten()
        .map(|tag| entity_name_from_tag(tag))
        .filter(|&label| label != OUTSIDE_TAG)
        .collect();

    let mut tag_id_dict: TagIdDict = labels
        .iter()
        .enumerate()
        .flat_map(|(label_index, label)| {
            BilouPrefix::ALL
                .into_iter()
                .enumerate()
                .map(move |(prefix_index, prefix)| {
                    (
                        prefix.tag(label),
                        label_index * BilouPrefix::ALL.len() + prefix_index + 1,
                    )
                })
        })
        .collect();
    tag_id_dict.insert(OUTSIDE_TAG.to_string(), 0);

    tag_id_dict
}

/// Ids of the message's BILOU tags; tags missing from the dictionary map to
/// the id of `"O"`.
///
/// A message without tags gets the `"O"` id for each of its tokens.
pub fn tags_to_ids(message: &Message, tag_id_dict: &TagIdDict) -> Vec<usize> {
    let outside = tag_id_dict.get(OUTSIDE_TAG).copied().unwrap_or(0);

    match message.get_tags(BILOU_ENTITIES).filter(|tags| !tags.is_empty()) {
        Some(tags) => tags
            .iter()
            .map(|tag| tag_id_dict.get(tag).copied().unwrap_or(outside))
            .collect(),
        None => vec![outside; message.get_tokens(TOKENS).map_or(0, <[Token]>::len)],
    }
}
