//! Expansion engine configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LexpandError, Result};
use crate::linguistics::PartOfSpeech;

/// Configuration for [`ThesaurusExpander`](super::ThesaurusExpander).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Parts of speech lemmas and synonyms are looked up under.
    pub parts_of_speech: Vec<PartOfSpeech>,
    /// Minimum phrase frequency for a multi-word segment to be used by the
    /// query segmenter.
    pub min_document_frequency: u64,
    /// Minimum phrase probability for a multi-word segment. The default of
    /// -1.0 accepts every phrase.
    pub min_segment_probability: f64,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            parts_of_speech: PartOfSpeech::ALL.to_vec(),
            min_document_frequency: 100,
            min_segment_probability: -1.0,
        }
    }
}

impl ExpansionConfig {
    /// Load a configuration from a JSON file. Missing fields take their
    /// default values.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LexpandError::config(format!(
                "Failed to read expansion config '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            LexpandError::config(format!(
                "Failed to parse expansion config '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.parts_of_speech.is_empty() {
            return Err(LexpandError::config("At least one part of speech is required"));
        }
        for (i, pos) in self.parts_of_speech.iter().enumerate() {
            if self.parts_of_speech[..i].contains(pos) {
                return Err(LexpandError::config(format!(
                    "Part of speech '{pos}' is listed twice"
                )));
            }
        }
        if self.min_segment_probability.is_nan() {
            return Err(LexpandError::config("min_segment_probability must be a number"));
        }
        Ok(())
    }

    pub fn supports(&self, pos: PartOfSpeech) -> bool {
        self.parts_of_speech.contains(&pos)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExpansionConfig::default();
        assert_eq!(config.parts_of_speech.len(), 4);
        assert_eq!(config.min_document_frequency, 100);
        assert_eq!(config.min_segment_probability, -1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_parts_of_speech() {
        let config = ExpansionConfig {
            parts_of_speech: vec![],
            ..ExpansionConfig::default()
        };
        assert!(matches!(config.validate(), Err(LexpandError::Config(_))));

        let config = ExpansionConfig {
            parts_of_speech: vec![PartOfSpeech::Noun, PartOfSpeech::Noun],
            ..ExpansionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"parts_of_speech": ["noun", "verb"]}}"#).unwrap();

        let config = ExpansionConfig::load_from_file(file.path()).unwrap();
        assert_eq!(
            config.parts_of_speech,
            vec![PartOfSpeech::Noun, PartOfSpeech::Verb]
        );
        assert_eq!(config.min_document_frequency, 100);
        assert!(!config.supports(PartOfSpeech::Adj));
    }
}
