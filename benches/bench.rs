//! Criterion benchmarks for lexpand.
//!
//! Covers the hot paths of an expansion run:
//! - Text normalization
//! - Query expansion, single and batched
//! - Signature encoding and decoding

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use lexpand::analysis::normalize::normalize_text;
use lexpand::expansion::{ThesaurusExpander, Vocabulary};
use lexpand::linguistics::TableLinguistics;
use lexpand::query::{SignatureMode, decode, encode};
use lexpand::segmenter::FrequencyTable;
use lexpand::thesaurus::{ThesaurusData, ThesaurusIndex};

/// Build a thesaurus of `num_groups` synonym groups plus a few entities.
fn generate_thesaurus(num_groups: usize) -> ThesaurusData {
    let mut data = ThesaurusData::default();
    for i in 0..num_groups {
        let ids = vec![
            data.add_segment(format!("term{i}")),
            data.add_segment(format!("synonym{i}")),
            data.add_segment(format!("other synonym{i}")),
        ];
        data.add_meaning("noun", ids);
    }

    let full = data.add_segment("bank of england");
    let short = data.add_segment("boe");
    let entity = data.add_entity(vec!["Org".to_string()], vec![full, short]);
    data.link_entity(full, entity, vec!["Acronym".to_string()]);
    data
}

fn build_expander(num_groups: usize) -> ThesaurusExpander {
    let mut phrases = FrequencyTable::new();
    phrases.insert("bank of england".to_string(), 1_000);

    let mut linguistics = TableLinguistics::new();
    let mut words = vec!["boe".to_string(), "other".to_string()];
    for i in 0..num_groups {
        linguistics = linguistics.add_plural(format!("term{i}"), format!("term{i}s"));
        words.push(format!("term{i}"));
        words.push(format!("term{i}s"));
        words.push(format!("synonym{i}"));
    }

    let index = ThesaurusIndex::from_data(generate_thesaurus(num_groups)).unwrap();
    ThesaurusExpander::builder(Arc::new(index))
        .linguistics(Arc::new(linguistics))
        .vocabulary(Vocabulary::from_words(words))
        .phrase_frequencies(phrases)
        .build()
        .unwrap()
}

fn generate_queries(count: usize, num_groups: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            format!(
                "the Term{} of the Bank of England and term{}",
                i % num_groups,
                (i * 7) % num_groups
            )
        })
        .collect()
}

/// Benchmark text normalization.
fn bench_normalization(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalization");
    let text = "  Café au-lait & Crème Brûlée:\tthe Bank-of-England's   RATE\n\nDecision!! ";

    group.bench_function("normalize_text", |b| {
        b.iter(|| black_box(normalize_text(black_box(text))))
    });

    group.finish();
}

/// Benchmark query expansion.
fn bench_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("expansion");

    let num_groups = 1_000;
    let expander = build_expander(num_groups);
    let queries = generate_queries(200, num_groups);

    group.bench_function("expand_single_query", |b| {
        b.iter(|| black_box(expander.expand(black_box(&queries[0])).unwrap()))
    });

    group.throughput(Throughput::Elements(queries.len() as u64));
    group.bench_function("expand_batch", |b| {
        b.iter(|| black_box(expander.expand_batch(black_box(&queries)).unwrap()))
    });

    group.sample_size(10);
    group.bench_function("build_expander", |b| {
        b.iter(|| black_box(build_expander(black_box(100))))
    });

    group.finish();
}

/// Benchmark the signature codec.
fn bench_signature(c: &mut Criterion) {
    let mut group = c.benchmark_group("signature");

    let expander = build_expander(100);
    let expansion = expander
        .expand("term1 term2 term3 bank of england term4")
        .unwrap();
    let signature = encode(&expansion.candidates, SignatureMode::Preserve);

    group.bench_function("encode_preserve", |b| {
        b.iter(|| black_box(encode(black_box(&expansion.candidates), SignatureMode::Preserve)))
    });

    group.bench_function("encode_canonical", |b| {
        b.iter(|| black_box(encode(black_box(&expansion.candidates), SignatureMode::Canonical)))
    });

    group.bench_function("decode", |b| {
        b.iter(|| black_box(decode(black_box(&signature)).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_normalization, bench_expansion, bench_signature);

criterion_main!(benches);
