//! Candidate filters.
//!
//! Each filter is a predicate over immutable term sets, applied by the
//! expansion engine at a fixed step of the pipeline.

use std::path::Path;

use ahash::AHashSet;

use crate::error::Result;
use crate::expansion::resources::load_term_list;
use crate::query::repr::Synset;

/// Whether `needle` occurs in `haystack` as a whole sub-phrase, i.e. bounded
/// by spaces or the ends of the string. A phrase contains itself.
///
/// ```
/// use lexpand::expansion::filter::contains_phrase;
///
/// assert!(contains_phrase("bank of england", "england"));
/// assert!(contains_phrase("bank", "bank"));
/// assert!(!contains_phrase("banking", "bank"));
/// ```
pub fn contains_phrase(haystack: &str, needle: &str) -> bool {
    format!(" {haystack} ").contains(&format!(" {needle} "))
}

/// The accepted vocabulary: the words an expansion may consist of.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    words: AHashSet<String>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Load a newline-delimited word list.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_words(load_term_list(path)?))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Whether every word of `candidate` belongs to the vocabulary.
    pub fn accepts(&self, candidate: &str) -> bool {
        candidate.split(' ').all(|word| self.words.contains(word))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Drop the candidates that equal a literal query term.
pub fn exclude_query_terms(candidates: Synset, query_terms: &AHashSet<&str>) -> Synset {
    candidates
        .into_iter()
        .filter(|candidate| !query_terms.contains(candidate.term.as_str()))
        .collect()
}
