//! Sequence tagging utilities.
//!
//! - [`bilou`] - BILOU tags from entity spans, and tag ids for training

pub mod bilou;

pub use bilou::{
    BilouPrefix, TagIdDict, apply_bilou_schema, bilou_tags, bilou_tags_from_offsets,
    build_tag_id_dict, tags_to_ids,
};
