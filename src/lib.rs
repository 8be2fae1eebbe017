//! # lexpand
//!
//! Thesaurus-driven query expansion with a cached query-performance backend.
//!
//! ## Features
//!
//! - Query normalization, stopword removal and frequency-driven segmentation
//! - Expansion with lemmas, normalized thesaurus forms, synonyms, plurals and
//!   entity aliases, every candidate tagged with how it was derived
//! - A textual CNF signature codec
//! - A grow-only, snapshot-able cache of backend query evaluations over a
//!   length-prefixed JSON socket protocol

pub mod analysis;
pub mod cache;
pub mod cli;
pub mod error;
pub mod expansion;
pub mod linguistics;
pub mod query;
pub mod segmenter;
pub mod stats;
pub mod thesaurus;

pub mod prelude {
    pub use crate::cache::{PerformanceRequest, QueryPerformanceCache};
    pub use crate::error::{LexpandError, Result};
    pub use crate::expansion::{Expansion, ExpansionConfig, ThesaurusExpander};
    pub use crate::query::{QueryRepr, SignatureMode, TermTags, decode, encode};
    pub use crate::thesaurus::{ThesaurusData, ThesaurusIndex};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
