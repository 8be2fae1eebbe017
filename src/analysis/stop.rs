//! Stopword set.
//!
//! Stopwords are removed from a query only after it has been segmented, so
//! that a stopword inside a recognized multi-word segment (the "of" in
//! "bank of england") survives. This module only owns the word set; the
//! removal policy lives in the expansion engine.
//!
//! # Examples
//!
//! ```
//! use lexpand::analysis::stop::StopWords;
//!
//! let stopwords = StopWords::new(); // Uses default English stop words
//! assert!(stopwords.is_stop_word("the"));
//! assert!(!stopwords.is_stop_word("bank"));
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use crate::error::Result;
use crate::expansion::resources::load_term_list;

/// Default English stop words list, already in normalized form.
const DEFAULT_ENGLISH_STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for",
    "with", "about", "against", "between", "into", "through", "during", "before", "after",
    "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
    "again", "further", "then", "once", "here", "there", "when", "where", "why", "how", "all",
    "any", "both", "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not",
    "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will", "just", "don",
    "should", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "couldn", "didn",
    "doesn", "hadn", "hasn", "haven", "isn", "ma", "mightn", "mustn", "needn", "shan",
    "shouldn", "wasn", "weren", "won", "wouldn",
];

/// Default English stop words as a HashSet.
pub static DEFAULT_ENGLISH_STOP_WORDS_SET: LazyLock<HashSet<String>> = LazyLock::new(|| {
    DEFAULT_ENGLISH_STOP_WORDS
        .iter()
        .map(|&s| s.to_string())
        .collect()
});

/// An immutable, cheaply clonable set of stopwords.
#[derive(Clone, Debug)]
pub struct StopWords {
    words: Arc<HashSet<String>>,
}

impl StopWords {
    /// Create a stopword set with the default English stop words.
    pub fn new() -> Self {
        Self::with_stop_words(DEFAULT_ENGLISH_STOP_WORDS_SET.clone())
    }

    /// Create an empty stopword set.
    pub fn empty() -> Self {
        Self::with_stop_words(HashSet::new())
    }

    /// Create a stopword set from an existing set.
    pub fn with_stop_words(words: HashSet<String>) -> Self {
        StopWords {
            words: Arc::new(words),
        }
    }

    /// Create a stopword set from a list of words.
    ///
    /// ```
    /// use lexpand::analysis::stop::StopWords;
    ///
    /// let stopwords = StopWords::from_words(vec!["foo", "bar", "baz"]);
    /// assert_eq!(stopwords.len(), 3);
    /// ```
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_stop_words(words.into_iter().map(|s| s.into()).collect())
    }

    /// Load a newline-delimited stopword file.
    ///
    /// Blank lines and lines starting with `#` are ignored.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_words(load_term_list(path)?))
    }

    /// Check if a word (or segment) is a stop word.
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Get the number of stop words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if the stop word set is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_stop_words() {
        let stopwords = StopWords::new();
        assert!(stopwords.is_stop_word("of"));
        assert!(stopwords.is_stop_word("the"));
        assert!(!stopwords.is_stop_word("england"));
        assert!(!stopwords.is_stop_word("bank of england"));
    }

    #[test]
    fn test_empty_stop_words() {
        let stopwords = StopWords::empty();
        assert!(stopwords.is_empty());
        assert!(!stopwords.is_stop_word("the"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "the").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  of  ").unwrap();

        let stopwords = StopWords::load_from_file(file.path()).unwrap();
        assert_eq!(stopwords.len(), 2);
        assert!(stopwords.is_stop_word("of"));
        assert!(!stopwords.is_stop_word("# comment"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = StopWords::load_from_file("/nonexistent/lexpand/stopwords.txt");
        assert!(matches!(result, Err(crate::error::LexpandError::Config(_))));
    }
}
