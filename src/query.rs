//! Query representations.
//!
//! An expanded query is kept in conjunctive normal form: a query
//! representation is a disjunction of AND-groups, an AND-group is a
//! conjunction of synsets (one per query position), and a synset is a
//! disjunction of alternative terms, each carrying the tags that record how
//! it was derived.
//!
//! [`signature`] converts a representation to and from its textual signature,
//! the string sent to the query backend and used as a cache key.

pub mod repr;
pub mod signature;

pub use repr::{AndGroup, DerivationKind, QueryRepr, Synset, Tag, TermTags};
pub use signature::{SignatureMode, decode, encode};
