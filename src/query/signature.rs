//! Textual query signatures.
//!
//! A signature renders a [`QueryRepr`] in the boolean syntax understood by the
//! query backend:
//!
//! ```text
//! ((t1 | t2) ("multi word" | t3)) | ((t4))
//! ```
//!
//! Terms of a synset are joined by ` | `, the synsets of an AND-group are
//! wrapped in parentheses and joined by a space, and AND-groups are wrapped
//! once more and joined by ` | `. Multi-word terms are quoted. Tags are not
//! part of the signature.
//!
//! # Examples
//!
//! ```
//! use lexpand::query::{SignatureMode, TermTags, decode, encode};
//!
//! let repr = vec![vec![vec![TermTags::source("a"), TermTags::source("b")]]];
//! let signature = encode(&repr, SignatureMode::Preserve);
//! assert_eq!(signature, "((a | b))");
//! assert_eq!(decode(&signature).unwrap(), repr);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{LexpandError, Result};
use crate::query::repr::{AndGroup, QueryRepr, Synset, TermTags};

const AND_GROUP_SEPARATOR: &str = ")) | ((";
const SYNSET_SEPARATOR: &str = ") (";
const TERM_SEPARATOR: &str = " | ";

/// Whether [`encode`] canonicalizes its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignatureMode {
    /// Sort and de-duplicate terms, synsets and AND-groups, so that logically
    /// equal representations share one signature.
    #[default]
    Canonical,
    /// Keep the order of the representation.
    Preserve,
}

fn join(
    left: &str,
    separator: &str,
    right: &str,
    mut items: Vec<String>,
    mode: SignatureMode,
) -> String {
    if mode == SignatureMode::Canonical {
        items.sort();
        items.dedup();
    }
    format!("{left}{}{right}", items.join(separator))
}

fn encode_term(entry: &TermTags) -> String {
    if entry.is_multiword() {
        format!("\"{}\"", entry.term)
    } else {
        entry.term.clone()
    }
}

fn encode_and_group(and_group: &AndGroup, mode: SignatureMode) -> String {
    let synsets = and_group
        .iter()
        .map(|synset| join("", TERM_SEPARATOR, "", synset.iter().map(encode_term).collect(), mode))
        .collect();
    join("(", SYNSET_SEPARATOR, ")", synsets, mode)
}

/// Render a representation as a signature.
///
/// Terms must not contain `(`, `)` or `|`; the encoder does not check this.
pub fn encode(repr: &QueryRepr, mode: SignatureMode) -> String {
    let and_groups = repr
        .iter()
        .map(|and_group| encode_and_group(and_group, mode))
        .collect();
    join("(", ") | (", ")", and_groups, mode)
}

fn decode_term(raw: &str) -> Result<TermTags> {
    let term = if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        &raw[1..raw.len() - 1]
    } else {
        raw
    };

    if term.contains(' ') && term.contains('"') {
        return Err(LexpandError::format(format!(
            "Quoted term contains an embedded quote: {raw}"
        )));
    }

    Ok(TermTags::source(term))
}

fn decode_synset(raw: &str) -> Result<Synset> {
    raw.split(TERM_SEPARATOR).map(decode_term).collect()
}

fn decode_and_group(raw: &str) -> Result<AndGroup> {
    raw.split(SYNSET_SEPARATOR).map(decode_synset).collect()
}

/// Parse a signature back into an untagged representation.
pub fn decode(signature: &str) -> Result<QueryRepr> {
    if signature.len() < 4 || !signature.starts_with("((") || !signature.ends_with("))") {
        return Err(LexpandError::format(format!(
            "Signature must be wrapped in '((' and '))': {signature}"
        )));
    }

    signature[2..signature.len() - 2]
        .split(AND_GROUP_SEPARATOR)
        .map(decode_and_group)
        .collect()
}
