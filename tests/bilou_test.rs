//! Integration tests for BILOU tagging.

use wordbag::message::BILOU_ENTITIES;
use wordbag::prelude::*;
use wordbag::tagging::bilou::{apply_bilou_schema, bilou_tags_from_offsets, remove_bilou_prefixes};

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

fn annotated(text: &str, entities: Vec<EntitySpan>) -> Message {
    Message::builder(text)
        .tokens(tokens(text))
        .entities(entities)
        .build()
}

#[test]
fn test_one_tag_per_token() {
    let tokens = tokens("show me flights from san francisco to new york");
    let entity_lists = vec![
        vec![],
        vec![EntitySpan::new(21, 34, "from")],
        vec![EntitySpan::new(21, 34, "from"), EntitySpan::new(38, 46, "to")],
        vec![EntitySpan::new(22, 30, "broken")],
    ];

    for entities in entity_lists {
        assert_eq!(bilou_tags(&tokens, &entities).len(), tokens.len());
    }
}

#[test]
fn test_no_entities_is_all_outside() {
    let tokens = tokens("nothing to see here");
    assert_eq!(bilou_tags(&tokens, &[]), vec!["O"; 4]);
}

#[test]
fn test_multi_token_entity() {
    let tokens = tokens("show me flights from san francisco to new york");
    let entities = vec![EntitySpan::new(21, 34, "from"), EntitySpan::new(38, 46, "to")];
    assert_eq!(
        bilou_tags(&tokens, &entities),
        vec!["O", "O", "O", "O", "B-from", "L-from", "O", "B-to", "L-to"]
    );
}

#[test]
fn test_misaligned_entity_is_dropped() {
    let tokens = tokens("i live in amsterdam");
    // Starts in the middle of "amsterdam".
    let entities = vec![EntitySpan::new(12, 19, "city")];
    let tags = bilou_tags(&tokens, &entities);

    assert_eq!(tags, vec!["O", "O", "O", "-"]);
    assert!(remove_bilou_prefixes(&tags).iter().all(|t| t != "city"));
}

#[test]
fn test_missing_tag_only_fills_unresolved_slots() {
    let tokens = tokens("a b c");
    let entities = vec![EntitySpan::new(2, 3, "x")];
    assert_eq!(
        bilou_tags_from_offsets(&tokens, &entities, "MISSING"),
        vec!["MISSING", "U-x", "MISSING"]
    );
}

#[test]
fn test_tag_ids_are_stable() {
    let build = || {
        let mut data = TrainingData::new(vec![
            annotated("fly to paris", vec![EntitySpan::new(7, 12, "city")]),
            annotated("at 5 pm", vec![EntitySpan::new(3, 7, "time")]),
            annotated("to rome at noon", vec![
                EntitySpan::new(3, 7, "city"),
                EntitySpan::new(11, 15, "time"),
            ]),
            annotated("no entities", vec![]),
        ]);
        apply_bilou_schema(&mut data);
        (build_tag_id_dict(&data), data)
    };

    let (first, data) = build();
    let (second, _) = build();
    assert_eq!(first, second);
    assert_eq!(first["O"], 0);
    assert_eq!(first["B-city"], 1);
    assert_eq!(first["L-time"], 8);
    assert!(!data.training_examples[3].has(BILOU_ENTITIES));

    let ids = tags_to_ids(&data.training_examples[1], &first);
    assert_eq!(ids, vec![0, first["B-time"], first["L-time"]]);
}

#[test]
fn test_unresolved_marker_shifts_label_ids() {
    let mut data = TrainingData::new(vec![
        annotated("in paris", vec![EntitySpan::new(3, 8, "city")]),
        annotated("newyork", vec![EntitySpan::new(0, 3, "city")]),
    ]);
    apply_bilou_schema(&mut data);
    let dict = build_tag_id_dict(&data);

    assert_eq!(dict.len(), 9);
    assert_eq!(dict.get("B--"), Some(&1));
    assert_eq!(dict.get("B-city"), Some(&5));
    assert_eq!(dict.get("U-city"), Some(&7));
    assert_eq!(tags_to_ids(&data.training_examples[0], &dict), vec![0, 7]);
    assert_eq!(tags_to_ids(&data.training_examples[1], &dict), vec![0]);
}

#[test]
fn test_unknown_tags_map_to_outside() {
    let mut data = TrainingData::new(vec![
        annotated("in paris", vec![EntitySpan::new(3, 8, "city")]),
        annotated("big apple", vec![EntitySpan::new(0, 5, "city")]),
        annotated("newyork", vec![EntitySpan::new(0, 3, "city")]),
    ]);
    apply_bilou_schema(&mut data);
    let dict = build_tag_id_dict(&data);

    assert_eq!(dict["B--"], 1);
    assert_eq!(dict["L--"], 4);
    assert_eq!(dict["B-city"], 5);
    assert_eq!(dict["U-city"], 7);

    assert_eq!(
        data.training_examples[2].get_tags(BILOU_ENTITIES).unwrap(),
        &["-".to_string()]
    );
    assert_eq!(tags_to_ids(&data.training_examples[2], &dict), vec![0]);

    // "apple" extends past the annotated end offset.
    assert_eq!(
        data.training_examples[1].get_tags(BILOU_ENTITIES).unwrap(),
        &["-".to_string(), "-".to_string()]
    );
    assert_eq!(tags_to_ids(&data.training_examples[1], &dict), vec![0, 0]);
    assert_eq!(
        tags_to_ids(&data.training_examples[0], &dict),
        vec![0, dict["U-city"]]
    );
}
