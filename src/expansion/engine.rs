//! The thesaurus expansion engine.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use log::debug;
use rayon::prelude::*;
use serde::Serialize;

use crate::analysis::{StopWords, TextNormalizer};
use crate::error::Result;
use crate::linguistics::{LinguisticProvider, PartOfSpeech};
use crate::query::repr::{
    DerivationKind, QueryRepr, Synset, Tag, TermTags, count_expansion_terms, group_or_terms,
};
use crate::query::signature::{SignatureMode, encode};
use crate::segmenter::Segmenter;
use crate::thesaurus::{SegmentId, ThesaurusIndex};

use super::builder::ThesaurusExpanderBuilder;
use super::config::ExpansionConfig;
use super::filter::{Vocabulary, contains_phrase, exclude_query_terms};

/// Lemma to the thesaurus segments having that lemma, per part of speech.
pub(super) type LemmaTables = AHashMap<PartOfSpeech, AHashMap<String, BTreeSet<SegmentId>>>;

/// Index every segment that expresses a meaning under one of `parts_of_speech`
/// by its lemma.
pub(super) fn build_lemma_tables(
    index: &ThesaurusIndex,
    linguistics: &dyn LinguisticProvider,
    parts_of_speech: &[PartOfSpeech],
) -> LemmaTables {
    let mut tables: LemmaTables = parts_of_speech
        .iter()
        .map(|&pos| (pos, AHashMap::new()))
        .collect();

    for (segment_id, segment) in index.segments() {
        let poses: BTreeSet<PartOfSpeech> = index
            .meanings_of(segment_id)
            .filter_map(|meaning| meaning.pos)
            .collect();

        for pos in poses {
            let Some(table) = tables.get_mut(&pos) else {
                continue;
            };
            table
                .entry(linguistics.lemma(segment, pos))
                .or_default()
                .insert(segment_id);
        }
    }

    tables
}

/// The result of expanding one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expansion {
    /// The query terms after normalization, stopword removal and segmentation.
    pub terms: Vec<String>,
    /// Every query term used unchanged.
    pub base: QueryRepr,
    /// Every query term together with its surviving candidates.
    pub candidates: QueryRepr,
}

impl Expansion {
    pub fn base_signature(&self, mode: SignatureMode) -> String {
        encode(&self.base, mode)
    }

    pub fn candidate_signature(&self, mode: SignatureMode) -> String {
        encode(&self.candidates, mode)
    }

    /// Number of candidate terms added on top of the base query.
    pub fn num_expansion_terms(&self) -> usize {
        count_expansion_terms(&self.candidates)
    }
}

/// Expands free-text queries with thesaurus, morphological and entity
/// alternatives.
///
/// The expander holds only immutable state, so one instance can serve any
/// number of threads.
pub struct ThesaurusExpander {
    pub(super) config: ExpansionConfig,
    pub(super) index: Arc<ThesaurusIndex>,
    pub(super) normalizer: Arc<dyn TextNormalizer>,
    pub(super) linguistics: Arc<dyn LinguisticProvider>,
    pub(super) segmenter: Arc<dyn Segmenter>,
    pub(super) stopwords: StopWords,
    pub(super) vocabulary: Vocabulary,
    pub(super) lemma_tables: LemmaTables,
}

impl ThesaurusExpander {
    /// Start building an expander over `index`.
    pub fn builder(index: Arc<ThesaurusIndex>) -> ThesaurusExpanderBuilder {
        ThesaurusExpanderBuilder::new(index)
    }

    pub fn config(&self) -> &ExpansionConfig {
        &self.config
    }

    pub fn index(&self) -> &ThesaurusIndex {
        &self.index
    }

    /// Expand a raw query.
    ///
    /// Both returned representations hold a single AND-group with one synset
    /// per query term. A query that normalizes to nothing yields one empty
    /// AND-group, which encodes to `(())` and does not decode back;
    /// the performance cache refuses to evaluate it.
    pub fn expand(&self, raw_query: &str) -> Result<Expansion> {
        let terms = self.query_terms(raw_query);
        if terms.is_empty() {
            debug!("Query '{raw_query}' is empty after normalization");
            return Ok(Expansion {
                terms,
                base: vec![Vec::new()],
                candidates: vec![Vec::new()],
            });
        }

        let query_terms: AHashSet<&str> = terms.iter().map(String::as_str).collect();

        let mut base = Vec::with_capacity(terms.len());
        let mut candidates = Vec::with_capacity(terms.len());
        for term in &terms {
            let mut derived = self.morphological_expansions(term);
            derived.extend(self.entity_expansions(term));
            let derived = exclude_query_terms(group_or_terms(derived), &query_terms);

            debug!("'{term}': {} candidates", derived.len());

            base.push(vec![TermTags::source(term.as_str())]);
            candidates.push(group_or_terms(
                std::iter::once(TermTags::source(term.as_str())).chain(derived),
            ));
        }

        Ok(Expansion {
            terms,
            base: vec![base],
            candidates: vec![candidates],
        })
    }

    /// Expand many queries in parallel. Results keep the order of `queries`.
    pub fn expand_batch<S: AsRef<str> + Sync>(&self, queries: &[S]) -> Result<Vec<Expansion>> {
        queries
            .par_iter()
            .map(|query| self.expand(query.as_ref()))
            .collect()
    }

    /// Normalize, drop stopwords and segment a raw query.
    pub fn query_terms(&self, raw_query: &str) -> Vec<String> {
        let normalized = self.normalizer.normalize(raw_query);
        let tokens: Vec<String> = normalized.split_whitespace().map(String::from).collect();
        let tokens = self.remove_stopwords(tokens);
        self.segmenter.segment(&tokens)
    }

    /// Drop stopword segments. Stopwords inside a multi-word segment are kept,
    /// and a query made only of stopwords is kept whole.
    fn remove_stopwords(&self, tokens: Vec<String>) -> Vec<String> {
        let kept: Vec<String> = self
            .segmenter
            .segment(&tokens)
            .into_iter()
            .filter(|segment| !self.stopwords.is_stop_word(segment))
            .collect();

        if kept.is_empty() {
            return tokens;
        }

        kept.iter()
            .flat_map(|segment| segment.split(' '))
            .map(String::from)
            .collect()
    }

    /// Lemmas, normalized forms, synonyms and plurals of `term`.
    fn morphological_expansions(&self, term: &str) -> Synset {
        let mut lemmas = Vec::new();
        let mut normalized: BTreeMap<PartOfSpeech, BTreeSet<SegmentId>> = BTreeMap::new();

        for &pos in &self.config.parts_of_speech {
            let lemma = self.linguistics.lemma(term, pos);
            let segment_ids = self
                .lemma_tables
                .get(&pos)
                .and_then(|table| table.get(&lemma))
                .cloned()
                .unwrap_or_default();
            normalized.insert(pos, segment_ids);
            lemmas.push((pos, lemma));
        }

        let mut normalized_terms: BTreeMap<PartOfSpeech, BTreeSet<&str>> = BTreeMap::new();
        let mut synonyms: BTreeMap<PartOfSpeech, BTreeSet<&str>> = BTreeMap::new();
        for (&pos, segment_ids) in &normalized {
            let terms = normalized_terms.entry(pos).or_default();
            let pos_synonyms = synonyms.entry(pos).or_default();

            for &segment_id in segment_ids {
                let Some(normalized_form) = self.index.segment(segment_id) else {
                    continue;
                };
                terms.insert(normalized_form);

                for meaning in self
                    .index
                    .meanings_of(segment_id)
                    .filter(|meaning| meaning.pos == Some(pos))
                {
                    for synonym in meaning
                        .segment_ids
                        .iter()
                        .filter_map(|&id| self.index.segment(id))
                    {
                        // A synonym that merely extends the normalized form is not one.
                        if !contains_phrase(synonym, normalized_form) {
                            pos_synonyms.insert(synonym);
                        }
                    }
                }
            }
        }

        let mut plurals = BTreeSet::new();
        if self.config.supports(PartOfSpeech::Noun) {
            let nouns = normalized_terms
                .get(&PartOfSpeech::Noun)
                .into_iter()
                .chain(synonyms.get(&PartOfSpeech::Noun))
                .flatten();
            for &noun in nouns {
                plurals.insert(self.linguistics.plural(noun, PartOfSpeech::Noun));
            }
        }

        let mut derived = Vec::new();
        for (pos, lemma) in lemmas {
            derived.push(TermTags::new(lemma, vec![Tag::derived(pos, DerivationKind::Lemma)]));
        }
        for (&pos, terms) in &normalized_terms {
            for &normalized_form in terms {
                derived.push(TermTags::new(
                    normalized_form,
                    vec![Tag::derived(pos, DerivationKind::Normalized)],
                ));
            }
        }
        for (&pos, terms) in &synonyms {
            for &synonym in terms {
                derived.push(TermTags::new(
                    synonym,
                    vec![Tag::derived(pos, DerivationKind::Synonym)],
                ));
            }
        }
        for plural in plurals {
            derived.push(TermTags::new(
                plural,
                vec![Tag::derived(PartOfSpeech::Noun, DerivationKind::Plural)],
            ));
        }

        group_or_terms(derived)
            .into_iter()
            .filter(|candidate| {
                !contains_phrase(&candidate.term, term) && self.vocabulary.accepts(&candidate.term)
            })
            .collect()
    }

    /// Alternate surface forms of the entities `term` refers to.
    fn entity_expansions(&self, term: &str) -> Synset {
        match self.index.segment_id(term) {
            Some(segment_id) => self.entity_alternates(segment_id),
            None if !term.contains(' ') => self
                .index
                .collapsed_segment_ids(term)
                .iter()
                .flat_map(|&segment_id| self.entity_alternates(segment_id))
                .collect(),
            None => Vec::new(),
        }
    }

    fn entity_alternates(&self, segment_id: SegmentId) -> Synset {
        let Some(source) = self.index.segment(segment_id) else {
            return Vec::new();
        };

        let mut alternates = Vec::new();
        for reference in self.index.entity_refs(segment_id) {
            let Some(entity) = self.index.entity(reference.entity_id) else {
                continue;
            };
            let tags: Vec<Tag> = entity
                .tags
                .iter()
                .chain(&reference.tags)
                .map(|tag| Tag::label(tag.as_str()))
                .collect();

            for alternate in entity
                .segment_ids
                .iter()
                .filter_map(|&id| self.index.segment(id))
            {
                if !contains_phrase(alternate, source) {
                    alternates.push(TermTags::new(alternate, tags.clone()));
                }
            }
        }
        alternates
    }
}
