//! CNF query representation and provenance tags.

use std::fmt;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::linguistics::PartOfSpeech;

/// How a morphological or thesaurus expansion was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DerivationKind {
    /// The lemma of the query term.
    Lemma,
    /// A thesaurus segment whose lemma equals the query term's lemma.
    Normalized,
    /// A segment sharing a meaning with a normalized form.
    Synonym,
    /// The plural of a noun normalized form or noun synonym.
    Plural,
}

impl DerivationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DerivationKind::Lemma => "Lem",
            DerivationKind::Normalized => "Norm",
            DerivationKind::Synonym => "Syn",
            DerivationKind::Plural => "Plu",
        }
    }
}

/// Provenance of an expansion term.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// Derived through the linguistic provider and the meaning tables.
    Derived {
        pos: PartOfSpeech,
        kind: DerivationKind,
    },
    /// An entity or collection-statistics tag.
    Label(String),
}

impl Tag {
    pub fn derived(pos: PartOfSpeech, kind: DerivationKind) -> Self {
        Tag::Derived { pos, kind }
    }

    pub fn label<S: Into<String>>(label: S) -> Self {
        Tag::Label(label.into())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Derived { pos, kind } => write!(f, "{}:{}", pos, kind.as_str()),
            Tag::Label(label) => f.write_str(label),
        }
    }
}

/// A term together with the tags of every path that produced it.
///
/// The base term of a query position (the literal query term, used unchanged)
/// has no tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermTags {
    pub term: String,
    pub tags: Vec<Tag>,
}

impl TermTags {
    pub fn new<S: Into<String>>(term: S, tags: Vec<Tag>) -> Self {
        TermTags {
            term: term.into(),
            tags,
        }
    }

    /// An untagged term.
    pub fn source<S: Into<String>>(term: S) -> Self {
        Self::new(term, Vec::new())
    }

    /// Add the tags not already present, keeping their order.
    pub fn merge_tags<I: IntoIterator<Item = Tag>>(&mut self, tags: I) {
        for tag in tags {
            if !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
    }

    pub fn is_multiword(&self) -> bool {
        self.term.contains(' ')
    }
}

/// Alternative terms for one query position (an OR-group).
pub type Synset = Vec<TermTags>;

/// One synset per query position (an AND-group).
pub type AndGroup = Vec<Synset>;

/// A disjunction of AND-groups, one per alternative segmentation.
pub type QueryRepr = Vec<AndGroup>;

/// Group term/tag pairs by term.
///
/// Terms keep the position of their first occurrence; the tags of later
/// occurrences are appended without duplicates.
pub fn group_or_terms<I: IntoIterator<Item = TermTags>>(term_tags: I) -> Synset {
    let mut positions: AHashMap<String, usize> = AHashMap::new();
    let mut grouped: Synset = Vec::new();

    for entry in term_tags {
        match positions.get(&entry.term) {
            Some(&position) => grouped[position].merge_tags(entry.tags),
            None => {
                let mut tags = Vec::with_capacity(entry.tags.len());
                for tag in entry.tags {
                    if !tags.contains(&tag) {
                        tags.push(tag);
                    }
                }
                positions.insert(entry.term.clone(), grouped.len());
                grouped.push(TermTags::new(entry.term, tags));
            }
        }
    }

    grouped
}

/// A copy of `repr` with every tag removed.
pub fn strip_tags(repr: &QueryRepr) -> QueryRepr {
    repr.iter()
        .map(|and_group| {
            and_group
                .iter()
                .map(|synset| {
                    synset
                        .iter()
                        .map(|entry| TermTags::source(entry.term.clone()))
                        .collect()
                })
                .collect()
        })
        .collect()
}

/// Number of terms in `repr` that carry at least one tag.
pub fn count_expansion_terms(repr: &QueryRepr) -> usize {
    repr.iter()
        .flatten()
        .flatten()
        .filter(|entry| !entry.tags.is_empty())
        .count()
}
