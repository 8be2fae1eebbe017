//! Command implementations for the lexpand CLI.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};

use crate::analysis::StopWords;
use crate::cache::{PerformanceRequest, QueryPerformanceCache};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::{LexpandError, Result};
use crate::expansion::resources::{load_frequency_table, load_term_list};
use crate::expansion::{ExpansionConfig, ThesaurusExpander, Vocabulary};
use crate::linguistics::TableLinguistics;
use crate::query::repr::{QueryRepr, TermTags};
use crate::query::signature::{decode, encode};
use crate::thesaurus::{ThesaurusData, ThesaurusIndex};

/// Execute a CLI command.
pub fn execute_command(args: LexpandArgs) -> Result<()> {
    match &args.command {
        Command::Expand(expand_args) => expand_queries(expand_args, &args),
        Command::Encode(encode_args) => encode_repr(encode_args, &args),
        Command::Decode(decode_args) => decode_signature(decode_args, &args),
        Command::Perf(perf_args) => query_performance(perf_args, &args),
        Command::CacheInfo(info_args) => cache_info(info_args, &args),
    }
}

/// Build an expander from the resource files named on the command line.
pub fn build_expander(args: &ExpandArgs) -> Result<ThesaurusExpander> {
    let index = ThesaurusIndex::from_data(ThesaurusData::load_from_file(&args.thesaurus)?)?;
    let mut builder = ThesaurusExpander::builder(Arc::new(index));

    if let Some(path) = &args.config {
        builder = builder.config(ExpansionConfig::load_from_file(path)?);
    }
    if let Some(path) = &args.vocabulary {
        builder = builder.vocabulary(Vocabulary::load_from_file(path)?);
    }
    if let Some(path) = &args.stopwords {
        builder = builder.stopwords(StopWords::load_from_file(path)?);
    }
    if let Some(path) = &args.phrase_frequencies {
        builder = builder.phrase_frequencies(load_frequency_table(path)?);
    }
    if let Some(path) = &args.and_frequencies {
        builder = builder.and_frequencies(load_frequency_table(path)?);
    }
    if let Some(path) = &args.linguistics {
        builder = builder.linguistics(Arc::new(TableLinguistics::load_from_file(path)?));
    }

    builder.build()
}

/// Expand the queries given as arguments and in the queries file.
fn expand_queries(args: &ExpandArgs, cli_args: &LexpandArgs) -> Result<()> {
    let mut queries = args.queries.clone();
    if let Some(path) = &args.queries_file {
        queries.extend(load_term_list(path)?);
    }
    if queries.is_empty() {
        return Err(LexpandError::config(
            "No queries given. Pass them as arguments or with --queries-file.",
        ));
    }

    let expander = build_expander(args)?;

    let start_time = Instant::now();
    let expansions = expander.expand_batch(&queries)?;
    let duration = start_time.elapsed();
    info!("Expanded {} queries in {:?}", queries.len(), duration);

    let mode = args.signature_mode.into();
    let results = ExpansionResults {
        expansions: queries
            .iter()
            .zip(&expansions)
            .map(|(query, expansion)| ExpansionResult::new(query, expansion, mode))
            .collect(),
        duration_ms: duration.as_millis() as u64,
    };

    output_result("Expansions", &results, cli_args)
}

/// Parse a JSON array of AND-groups of synsets of terms.
pub fn parse_repr_json(json: &str) -> Result<QueryRepr> {
    let groups: Vec<Vec<Vec<String>>> = serde_json::from_str(json).map_err(|e| {
        LexpandError::format(format!(
            "Expected a JSON array of AND-groups of synsets of terms: {e}"
        ))
    })?;

    Ok(groups
        .into_iter()
        .map(|and_group| {
            and_group
                .into_iter()
                .map(|synset| synset.into_iter().map(TermTags::source).collect())
                .collect()
        })
        .collect())
}

fn encode_repr(args: &EncodeArgs, cli_args: &LexpandArgs) -> Result<()> {
    let repr = parse_repr_json(&args.repr)?;
    let result = EncodeResult {
        signature: encode(&repr, args.signature_mode.into()),
    };
    output_result("Signature", &result, cli_args)
}

fn decode_signature(args: &DecodeArgs, cli_args: &LexpandArgs) -> Result<()> {
    let repr = decode(&args.signature)?;
    output_result("Representation", &DecodeResult::new(&repr), cli_args)
}

/// The default cache key of a relevant set: a checksum of its sorted,
/// deduplicated ids.
pub fn relevant_set_key(document_ids: &[u64]) -> u64 {
    let mut ids = document_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let mut hasher = crc32fast::Hasher::new();
    for id in ids {
        hasher.update(&id.to_le_bytes());
    }
    u64::from(hasher.finalize())
}

/// The cache key of a `--rel` list: the explicit `--rel-key`, or one derived
/// from the ids. A key without ids is rejected.
fn restriction_key(relevant: &[u64], rel_key: Option<u64>) -> Result<u64> {
    match rel_key {
        Some(_) if relevant.is_empty() => {
            Err(LexpandError::config("--rel-key requires a non-empty --rel list"))
        }
        Some(key) => Ok(key),
        None => Ok(relevant_set_key(relevant)),
    }
}

fn open_cache(path: &Path, host: &str, port: u16) -> Result<QueryPerformanceCache> {
    if path.exists() {
        QueryPerformanceCache::load(path)
    } else {
        debug!("No snapshot at {}, starting an empty cache", path.display());
        Ok(QueryPerformanceCache::new(host, port))
    }
}

fn query_performance(args: &PerfArgs, cli_args: &LexpandArgs) -> Result<()> {
    let repr = decode(&args.signature)?;
    let cache = open_cache(&args.cache, &args.host, args.port)?
        .with_signature_mode(args.signature_mode.into());

    let key = restriction_key(&args.relevant, args.rel_key)?;
    let request = PerformanceRequest::new(&repr)
        .restricted_to(&args.relevant, key)
        .include_time(!args.no_time)
        .force(args.force);

    let performance = cache.get_performance(&request)?;

    if !args.no_save {
        cache.save(&args.cache)?;
    }

    let result = PerfResult::new(cache.signature(&repr), &performance, cache.len());
    output_result("Query performance", &result, cli_args)
}

fn cache_info(args: &CacheInfoArgs, cli_args: &LexpandArgs) -> Result<()> {
    let cache = QueryPerformanceCache::load(&args.cache)?;
    let result = CacheInfoResult::new(cache.host(), cache.port(), cache.entries(), args.entries);
    output_result("Cache snapshot", &result, cli_args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repr_json() {
        let repr = parse_repr_json(r#"[[["a", "b"], ["c"]]]"#).unwrap();
        assert_eq!(encode(&repr, crate::query::SignatureMode::Preserve), "((a | b) (c))");
        assert!(matches!(parse_repr_json(r#"{"a": 1}"#), Err(LexpandError::Format(_))));
    }

    #[test]
    fn test_relevant_set_key_ignores_order_and_duplicates() {
        assert_eq!(relevant_set_key(&[3, 1, 2]), relevant_set_key(&[1, 2, 3, 3]));
        assert_ne!(relevant_set_key(&[1, 2]), relevant_set_key(&[1, 2, 3]));
    }

    #[test]
    fn test_restriction_key_requires_ids() {
        assert!(matches!(restriction_key(&[], Some(7)), Err(LexpandError::Config(_))));
        assert_eq!(restriction_key(&[4, 2], Some(7)).unwrap(), 7);
        assert_eq!(restriction_key(&[4, 2], None).unwrap(), relevant_set_key(&[2, 4]));
        assert_eq!(restriction_key(&[], None).unwrap(), relevant_set_key(&[]));
    }
}
