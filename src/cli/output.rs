//! Output formatting for CLI commands.

use serde::Serialize;

use crate::cache::{CacheKey, Performance};
use crate::cli::args::{LexpandArgs, OutputFormat};
use crate::error::Result;
use crate::expansion::Expansion;
use crate::query::{QueryRepr, SignatureMode};

/// Human-readable rendering of a command result.
pub trait HumanOutput {
    fn print_human(&self);
}

/// One term of a synset, with its tags rendered as strings.
#[derive(Debug, Serialize)]
pub struct TermOutput {
    pub term: String,
    pub tags: Vec<String>,
}

/// Result structure for an expanded query.
#[derive(Debug, Serialize)]
pub struct ExpansionResult {
    pub query: String,
    pub terms: Vec<String>,
    pub base_signature: String,
    pub candidate_signature: String,
    pub num_expansion_terms: usize,
    /// One synset per query term.
    pub synsets: Vec<Vec<TermOutput>>,
}

impl ExpansionResult {
    pub fn new(query: &str, expansion: &Expansion, mode: SignatureMode) -> Self {
        let synsets = expansion
            .candidates
            .iter()
            .flatten()
            .map(|synset| {
                synset
                    .iter()
                    .map(|entry| TermOutput {
                        term: entry.term.clone(),
                        tags: entry.tags.iter().map(ToString::to_string).collect(),
                    })
                    .collect()
            })
            .collect();

        Self {
            query: query.to_string(),
            terms: expansion.terms.clone(),
            base_signature: expansion.base_signature(mode),
            candidate_signature: expansion.candidate_signature(mode),
            num_expansion_terms: expansion.num_expansion_terms(),
            synsets,
        }
    }
}

/// Result structure for the expand command.
#[derive(Debug, Serialize)]
pub struct ExpansionResults {
    pub expansions: Vec<ExpansionResult>,
    pub duration_ms: u64,
}

impl HumanOutput for ExpansionResults {
    fn print_human(&self) {
        for (i, result) in self.expansions.iter().enumerate() {
            if i > 0 {
                println!();
            }
            println!("Query: {}", result.query);
            println!("  Terms:      {}", result.terms.join(" / "));
            println!("  Base:       {}", result.base_signature);
            println!("  Candidates: {}", result.candidate_signature);
            println!("  Expansion terms: {}", result.num_expansion_terms);
            for (term, synset) in result.terms.iter().zip(&result.synsets) {
                println!("  [{term}]");
                for entry in synset.iter().skip(1) {
                    if entry.tags.is_empty() {
                        println!("    {}", entry.term);
                    } else {
                        println!("    {} ({})", entry.term, entry.tags.join(", "));
                    }
                }
            }
        }
    }
}

/// Result structure for the encode command.
#[derive(Debug, Serialize)]
pub struct EncodeResult {
    pub signature: String,
}

impl HumanOutput for EncodeResult {
    fn print_human(&self) {
        println!("{}", self.signature);
    }
}

/// Result structure for the decode command.
#[derive(Debug, Serialize)]
pub struct DecodeResult {
    /// AND-groups of synsets of terms.
    pub repr: Vec<Vec<Vec<String>>>,
}

impl DecodeResult {
    pub fn new(repr: &QueryRepr) -> Self {
        Self {
            repr: repr
                .iter()
                .map(|and_group| {
                    and_group
                        .iter()
                        .map(|synset| synset.iter().map(|entry| entry.term.clone()).collect())
                        .collect()
                })
                .collect(),
        }
    }
}

impl HumanOutput for DecodeResult {
    fn print_human(&self) {
        for (i, and_group) in self.repr.iter().enumerate() {
            println!("AND-group {i}:");
            for synset in and_group {
                println!("  {}", synset.join(" | "));
            }
        }
    }
}

/// Result structure for the perf command.
#[derive(Debug, Serialize)]
pub struct PerfResult {
    pub signature: String,
    pub restricted: bool,
    pub num_ret: u64,
    pub num_rel: Option<u64>,
    pub num_rel_ret: Option<u64>,
    pub exe_time: Option<f64>,
    pub cache_entries: usize,
}

impl PerfResult {
    pub fn new(signature: String, performance: &Performance, cache_entries: usize) -> Self {
        let restricted = performance.as_restricted();
        Self {
            signature,
            restricted: restricted.is_some(),
            num_ret: performance.num_ret(),
            num_rel: restricted.map(|p| p.num_rel),
            num_rel_ret: restricted.map(|p| p.num_rel_ret),
            exe_time: performance.exe_time(),
            cache_entries,
        }
    }
}

impl HumanOutput for PerfResult {
    fn print_human(&self) {
        println!("Signature: {}", self.signature);
        println!("  Retrieved: {}", self.num_ret);
        if let (Some(num_rel), Some(num_rel_ret)) = (self.num_rel, self.num_rel_ret) {
            println!("  Relevant: {num_rel}");
            println!("  Relevant retrieved: {num_rel_ret}");
        }
        match self.exe_time {
            Some(time) => println!("  Execution time: {time:.4}s"),
            None => println!("  Execution time: n/a"),
        }
        println!("  Cache entries: {}", self.cache_entries);
    }
}

/// One cache entry.
#[derive(Debug, Serialize)]
pub struct CacheEntryOutput {
    pub signature: String,
    pub restriction: Option<u64>,
    pub performance: Performance,
}

/// Result structure for the cache-info command.
#[derive(Debug, Serialize)]
pub struct CacheInfoResult {
    pub host: String,
    pub port: u16,
    pub entries: usize,
    pub restricted_entries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_list: Option<Vec<CacheEntryOutput>>,
}

impl CacheInfoResult {
    pub fn new(host: &str, port: u16, entries: Vec<(CacheKey, Performance)>, list: bool) -> Self {
        let restricted_entries = entries.iter().filter(|(key, _)| key.is_restricted()).count();
        let total = entries.len();
        let entry_list = list.then(|| {
            entries
                .into_iter()
                .map(|(key, performance)| {
                    let restriction = match &key {
                        CacheKey::Restricted { restriction, .. } => Some(*restriction),
                        CacheKey::Unrestricted(_) => None,
                    };
                    CacheEntryOutput {
                        signature: key.signature().to_string(),
                        restriction,
                        performance,
                    }
                })
                .collect()
        });

        Self {
            host: host.to_string(),
            port,
            entries: total,
            restricted_entries,
            entry_list,
        }
    }
}

impl HumanOutput for CacheInfoResult {
    fn print_human(&self) {
        println!("Backend: {}:{}", self.host, self.port);
        println!("Entries: {} ({} restricted)", self.entries, self.restricted_entries);
        if let Some(entries) = &self.entry_list {
            for entry in entries {
                let restriction = entry
                    .restriction
                    .map(|key| format!(" [rel {key}]"))
                    .unwrap_or_default();
                let time = entry
                    .performance
                    .exe_time()
                    .map(|t| format!(" {t:.4}s"))
                    .unwrap_or_default();
                println!(
                    "  {}{restriction}: {} retrieved{time}",
                    entry.signature,
                    entry.performance.num_ret()
                );
            }
        }
    }
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize + HumanOutput>(
    message: &str,
    result: &T,
    args: &LexpandArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 {
                println!("{message}");
                println!();
            }
            result.print_human();
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &LexpandArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}
