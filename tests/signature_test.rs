//! Integration tests for the signature codec.

use lexpand::prelude::*;
use lexpand::query::repr::{QueryRepr, strip_tags};

fn repr(groups: &[&[&[&str]]]) -> QueryRepr {
    groups
        .iter()
        .map(|and_group| {
            and_group
                .iter()
                .map(|synset| synset.iter().map(|&term| TermTags::source(term)).collect())
                .collect()
        })
        .collect()
}

#[test]
fn test_two_term_synset() -> Result<()> {
    let query = repr(&[&[&["a", "b"]]]);
    assert_eq!(encode(&query, SignatureMode::Preserve), "((a | b))");
    assert_eq!(encode(&query, SignatureMode::Canonical), "((a | b))");
    assert_eq!(decode("((a | b))")?, query);
    Ok(())
}

#[test]
fn test_round_trip_preserves_structure() -> Result<()> {
    let queries = [
        repr(&[&[&["bank"]]]),
        repr(&[&[&["bank of england", "boe"], &["rates", "rate", "charges"]]]),
        repr(&[
            &[&["interest rate"], &["cut"]],
            &[&["interest"], &["rate"], &["cut", "cuts"]],
        ]),
    ];

    for query in queries {
        let signature = encode(&query, SignatureMode::Preserve);
        assert_eq!(decode(&signature)?, query, "signature: {signature}");
    }
    Ok(())
}

#[test]
fn test_canonical_signatures_collapse_equal_queries() {
    let first = repr(&[&[&["boe", "bank of england"], &["rates", "rate"]]]);
    let second = repr(&[&[&["rate", "rates"], &["bank of england", "boe", "boe"]]]);

    assert_ne!(
        encode(&first, SignatureMode::Preserve),
        encode(&second, SignatureMode::Preserve)
    );
    assert_eq!(
        encode(&first, SignatureMode::Canonical),
        encode(&second, SignatureMode::Canonical)
    );
}

#[test]
fn test_tags_are_not_part_of_the_signature() -> Result<()> {
    let tagged = vec![vec![vec![
        TermTags::source("bank"),
        TermTags::new(
            "banks",
            vec![lexpand::query::Tag::derived(
                lexpand::linguistics::PartOfSpeech::Noun,
                lexpand::query::DerivationKind::Plural,
            )],
        ),
    ]]];

    let signature = encode(&tagged, SignatureMode::Preserve);
    assert_eq!(signature, "((bank | banks))");
    assert_eq!(decode(&signature)?, strip_tags(&tagged));
    Ok(())
}

#[test]
fn test_malformed_signatures() {
    for signature in ["", "(a)", "((a)", "(a))", "a | b", "((\"bank \"of\" england\"))"] {
        assert!(
            matches!(decode(signature), Err(LexpandError::Format(_))),
            "accepted: {signature}"
        );
    }
}
