//! Linguistic capabilities consumed by the expansion engine.
//!
//! The engine needs two morphological operations: the lemma of a term under a
//! given part of speech, and the plural of a noun. Both come from a
//! [`LinguisticProvider`]. Two table-driven providers ship with the crate;
//! anything richer (a real lemmatizer or inflection engine) plugs in through
//! the trait.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LexpandError, Result};

/// The parts of speech meanings are tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartOfSpeech {
    Adj,
    Adv,
    Noun,
    Verb,
}

impl PartOfSpeech {
    /// All parts of speech, in their canonical order.
    pub const ALL: [PartOfSpeech; 4] = [
        PartOfSpeech::Adj,
        PartOfSpeech::Adv,
        PartOfSpeech::Noun,
        PartOfSpeech::Verb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PartOfSpeech::Adj => "adj",
            PartOfSpeech::Adv => "adv",
            PartOfSpeech::Noun => "noun",
            PartOfSpeech::Verb => "verb",
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartOfSpeech {
    type Err = LexpandError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "adj" => Ok(PartOfSpeech::Adj),
            "adv" => Ok(PartOfSpeech::Adv),
            "noun" => Ok(PartOfSpeech::Noun),
            "verb" => Ok(PartOfSpeech::Verb),
            other => Err(LexpandError::config(format!(
                "Unknown part of speech '{other}'"
            ))),
        }
    }
}

/// Source of lemmas and plurals.
///
/// Implementations must be deterministic: the expansion of a query is a pure
/// function of its text only if the provider is.
pub trait LinguisticProvider: Send + Sync {
    /// The lemma of `term` read as `pos`. Multi-word terms are lemmatized word
    /// by word. Unknown words are their own lemma.
    fn lemma(&self, term: &str, pos: PartOfSpeech) -> String;

    /// The plural form of `term` read as `pos`.
    fn plural(&self, term: &str, pos: PartOfSpeech) -> String;

    /// Get the name of this provider for logging.
    fn name(&self) -> &'static str;
}

/// A provider that leaves every term unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityLinguistics;

impl LinguisticProvider for IdentityLinguistics {
    fn lemma(&self, term: &str, _pos: PartOfSpeech) -> String {
        term.trim().to_string()
    }

    fn plural(&self, term: &str, _pos: PartOfSpeech) -> String {
        term.trim().to_string()
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}

/// A provider backed by explicit lemma and plural tables.
///
/// The JSON form is:
///
/// ```json
/// {
///   "lemmas": { "noun": { "banks": "bank" }, "verb": { "ran": "run" } },
///   "plurals": { "bank": "banks" }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableLinguistics {
    #[serde(default)]
    lemmas: HashMap<PartOfSpeech, HashMap<String, String>>,
    #[serde(default)]
    plurals: HashMap<String, String>,
}

impl TableLinguistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the tables from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LexpandError::config(format!(
                "Failed to read linguistic tables '{}': {}",
                path.display(),
                e
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            LexpandError::config(format!(
                "Failed to parse linguistic tables from '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Register `form` as an inflection of `lemma` under `pos`.
    pub fn add_lemma<S: Into<String>>(mut self, pos: PartOfSpeech, form: S, lemma: S) -> Self {
        self.lemmas
            .entry(pos)
            .or_default()
            .insert(form.into(), lemma.into());
        self
    }

    /// Register the plural of a noun.
    pub fn add_plural<S: Into<String>>(mut self, singular: S, plural: S) -> Self {
        self.plurals.insert(singular.into(), plural.into());
        self
    }

    fn word_lemma<'a>(&'a self, word: &'a str, pos: PartOfSpeech) -> &'a str {
        self.lemmas
            .get(&pos)
            .and_then(|table| table.get(word))
            .map(String::as_str)
            .unwrap_or(word)
    }
}

impl LinguisticProvider for TableLinguistics {
    fn lemma(&self, term: &str, pos: PartOfSpeech) -> String {
        let term = term.trim();
        if !term.contains(' ') {
            return self.word_lemma(term, pos).to_string();
        }
        term.split_whitespace()
            .map(|word| self.word_lemma(word, pos))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn plural(&self, term: &str, _pos: PartOfSpeech) -> String {
        let term = term.trim();
        if let Some(plural) = self.plurals.get(term) {
            return plural.clone();
        }
        // Phrases inflect on their head word, taken to be the last one.
        match term.rsplit_once(' ') {
            Some((head, last)) => match self.plurals.get(last) {
                Some(plural) => format!("{head} {plural}"),
                None => term.to_string(),
            },
            None => term.to_string(),
        }
    }

    fn name(&self) -> &'static str {
        "table"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_of_speech_parse() {
        assert_eq!("noun".parse::<PartOfSpeech>().unwrap(), PartOfSpeech::Noun);
        assert_eq!(PartOfSpeech::Adv.to_string(), "adv");
        assert!("adj_sat".parse::<PartOfSpeech>().is_err());
    }

    #[test]
    fn test_identity_linguistics() {
        let provider = IdentityLinguistics;
        assert_eq!(provider.lemma(" banks ", PartOfSpeech::Noun), "banks");
        assert_eq!(provider.plural("bank", PartOfSpeech::Noun), "bank");
    }

    #[test]
    fn test_table_lemma_word_by_word() {
        let provider = TableLinguistics::new()
            .add_lemma(PartOfSpeech::Noun, "banks", "bank")
            .add_lemma(PartOfSpeech::Verb, "running", "run");

        assert_eq!(provider.lemma("banks", PartOfSpeech::Noun), "bank");
        assert_eq!(provider.lemma("banks", PartOfSpeech::Verb), "banks");
        assert_eq!(provider.lemma("central banks", PartOfSpeech::Noun), "central bank");
    }

    #[test]
    fn test_table_plural() {
        let provider = TableLinguistics::new()
            .add_plural("bank", "banks")
            .add_plural("mouse", "mice");

        assert_eq!(provider.plural("bank", PartOfSpeech::Noun), "banks");
        assert_eq!(provider.plural("field mouse", PartOfSpeech::Noun), "field mice");
        assert_eq!(provider.plural("river", PartOfSpeech::Noun), "river");
    }

    #[test]
    fn test_table_from_json() {
        let json = r#"{"lemmas": {"noun": {"banks": "bank"}}, "plurals": {"bank": "banks"}}"#;
        let provider: TableLinguistics = serde_json::from_str(json).unwrap();
        assert_eq!(provider.lemma("banks", PartOfSpeech::Noun), "bank");
        assert_eq!(provider.plural("bank", PartOfSpeech::Noun), "banks");
    }
}
