//! Thesaurus tables.
//!
//! A thesaurus is loaded once from its serialized form ([`ThesaurusData`])
//! and turned into a [`ThesaurusIndex`]: dense, typed tables indexed by
//! segment, meaning and entity ids, with a string lookup only at the segment
//! boundary.

pub mod data;
pub mod index;

pub use data::ThesaurusData;
pub use index::{Entity, EntityRef, Meaning, ThesaurusIndex};

/// Dense, 0-based id of a segment.
pub type SegmentId = u32;

/// Id of a meaning (word sense).
pub type MeaningId = u32;

/// Id of a named entity.
pub type EntityId = u32;
