//! Thesaurus-driven query expansion.
//!
//! The expansion engine turns a free-text query into two CNF
//! representations: the base query (every query term used unchanged) and the
//! candidate query, where each position may also be matched by lemmas,
//! normalized thesaurus forms, synonyms, plurals and entity aliases.
//!
//! # Pipeline
//!
//! ```text
//! raw text → normalize → segment + drop stopwords → segment
//!          → per term: base term ∪ morphological candidates ∪ entity candidates
//!          → drop candidates equal to another query term
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use lexpand::expansion::{ThesaurusExpander, Vocabulary};
//! use lexpand::segmenter::FrequencyTable;
//! use lexpand::thesaurus::{ThesaurusData, ThesaurusIndex};
//!
//! # fn main() -> lexpand::error::Result<()> {
//! let mut data = ThesaurusData::default();
//! let full = data.add_segment("bank of england");
//! let short = data.add_segment("boe");
//! let entity = data.add_entity(vec!["Org".to_string()], vec![full, short]);
//! data.link_entity(full, entity, vec![]);
//!
//! let mut phrases = FrequencyTable::new();
//! phrases.insert("bank of england".to_string(), 1_000);
//!
//! let expander = ThesaurusExpander::builder(Arc::new(ThesaurusIndex::from_data(data)?))
//!     .vocabulary(Vocabulary::from_words(["boe"]))
//!     .phrase_frequencies(phrases)
//!     .build()?;
//!
//! let expansion = expander.expand("Bank of England")?;
//! assert_eq!(expansion.terms, vec!["bank of england"]);
//! assert_eq!(expansion.candidates[0][0][1].term, "boe");
//! # Ok(())
//! # }
//! ```

mod builder;
mod config;
mod engine;
pub mod filter;
pub mod resources;

pub use builder::ThesaurusExpanderBuilder;
pub use config::ExpansionConfig;
pub use engine::{Expansion, ThesaurusExpander};
pub use filter::Vocabulary;
