//! Text analysis for query expansion.
//!
//! This module turns raw query and alias text into the normalized,
//! space-separated form that the thesaurus and the frequency tables are keyed
//! by, and provides the stopword set used while segmenting queries.

pub mod normalize;
pub mod stop;

pub use normalize::{AliasOptions, AsciiNormalizer, TextNormalizer};
pub use stop::StopWords;
