//! Builder for creating ThesaurusExpander instances.

use std::sync::Arc;

use log::info;

use crate::analysis::{AsciiNormalizer, StopWords, TextNormalizer};
use crate::error::Result;
use crate::linguistics::{IdentityLinguistics, LinguisticProvider};
use crate::segmenter::{FrequencyTable, GreedySegmenter, Segmenter};
use crate::thesaurus::ThesaurusIndex;

use super::config::ExpansionConfig;
use super::engine::{ThesaurusExpander, build_lemma_tables};
use super::filter::Vocabulary;

/// Builder for creating a [`ThesaurusExpander`].
///
/// Only the thesaurus is mandatory. Unless replaced, the expander uses
/// [`AsciiNormalizer`], the default English [`StopWords`],
/// [`IdentityLinguistics`], an empty vocabulary (no morphological
/// candidates pass the goodness filter) and a [`GreedySegmenter`] built from
/// the phrase and AND frequencies.
pub struct ThesaurusExpanderBuilder {
    index: Arc<ThesaurusIndex>,
    config: ExpansionConfig,
    normalizer: Arc<dyn TextNormalizer>,
    linguistics: Arc<dyn LinguisticProvider>,
    segmenter: Option<Arc<dyn Segmenter>>,
    stopwords: StopWords,
    vocabulary: Vocabulary,
    phrase_frequencies: FrequencyTable,
    and_frequencies: FrequencyTable,
}

impl ThesaurusExpanderBuilder {
    /// Create a new builder over the given thesaurus.
    pub fn new(index: Arc<ThesaurusIndex>) -> Self {
        Self {
            index,
            config: ExpansionConfig::default(),
            normalizer: Arc::new(AsciiNormalizer::new()),
            linguistics: Arc::new(IdentityLinguistics),
            segmenter: None,
            stopwords: StopWords::new(),
            vocabulary: Vocabulary::new(),
            phrase_frequencies: FrequencyTable::new(),
            and_frequencies: FrequencyTable::new(),
        }
    }

    pub fn config(mut self, config: ExpansionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn normalizer(mut self, normalizer: Arc<dyn TextNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn linguistics(mut self, linguistics: Arc<dyn LinguisticProvider>) -> Self {
        self.linguistics = linguistics;
        self
    }

    /// Use a custom segmenter instead of the frequency-driven default. The
    /// frequency tables are then ignored.
    pub fn segmenter(mut self, segmenter: Arc<dyn Segmenter>) -> Self {
        self.segmenter = Some(segmenter);
        self
    }

    pub fn stopwords(mut self, stopwords: StopWords) -> Self {
        self.stopwords = stopwords;
        self
    }

    /// Set the accepted vocabulary of the goodness filter.
    pub fn vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// Set the phrase frequency of each segment.
    pub fn phrase_frequencies(mut self, frequencies: FrequencyTable) -> Self {
        self.phrase_frequencies = frequencies;
        self
    }

    /// Set the AND (co-occurrence) frequency of each segment's words.
    pub fn and_frequencies(mut self, frequencies: FrequencyTable) -> Self {
        self.and_frequencies = frequencies;
        self
    }

    /// Build the expander.
    ///
    /// Fails with a configuration error if the configuration is invalid.
    pub fn build(self) -> Result<ThesaurusExpander> {
        self.config.validate()?;

        let segmenter = match self.segmenter {
            Some(segmenter) => segmenter,
            None => {
                let index = &self.index;
                let phrases = self
                    .phrase_frequencies
                    .keys()
                    .filter(|segment| segment.contains(' ') && index.contains_segment(segment));
                Arc::new(GreedySegmenter::new(
                    phrases,
                    &self.phrase_frequencies,
                    &self.and_frequencies,
                    self.config.min_segment_probability,
                    self.config.min_document_frequency,
                )) as Arc<dyn Segmenter>
            }
        };

        let lemma_tables = build_lemma_tables(
            &self.index,
            self.linguistics.as_ref(),
            &self.config.parts_of_speech,
        );

        info!(
            "Built thesaurus expander: normalizer={}, linguistics={}, segmenter={}, {} vocabulary words, {} stopwords",
            self.normalizer.name(),
            self.linguistics.name(),
            segmenter.name(),
            self.vocabulary.len(),
            self.stopwords.len()
        );

        Ok(ThesaurusExpander {
            config: self.config,
            index: self.index,
            normalizer: self.normalizer,
            linguistics: self.linguistics,
            segmenter,
            stopwords: self.stopwords,
            vocabulary: self.vocabulary,
            lemma_tables,
        })
    }
}
