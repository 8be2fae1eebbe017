//! Command line argument parsing for the lexpand CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::query::SignatureMode;

/// lexpand - thesaurus query expansion and query performance caching
#[derive(Parser, Debug, Clone)]
#[command(name = "lexpand")]
#[command(about = "Thesaurus query expansion with a cached query-performance backend")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct LexpandArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl LexpandArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n + 1,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Expand queries with a thesaurus
    Expand(ExpandArgs),

    /// Encode a JSON query representation as a signature
    Encode(EncodeArgs),

    /// Decode a signature into its query representation
    Decode(DecodeArgs),

    /// Get the performance of a query, through a cache snapshot
    Perf(PerfArgs),

    /// Show the contents of a cache snapshot
    #[command(name = "cache-info")]
    CacheInfo(CacheInfoArgs),
}

/// Arguments for expanding queries
#[derive(Parser, Debug, Clone)]
pub struct ExpandArgs {
    /// Thesaurus file (JSON)
    #[arg(short, long, value_name = "THESAURUS_FILE")]
    pub thesaurus: PathBuf,

    /// Queries to expand
    #[arg(value_name = "QUERY")]
    pub queries: Vec<String>,

    /// File with one query per line
    #[arg(long, value_name = "QUERIES_FILE")]
    pub queries_file: Option<PathBuf>,

    /// Expansion configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Accepted vocabulary, one word per line
    #[arg(long, value_name = "VOCABULARY_FILE")]
    pub vocabulary: Option<PathBuf>,

    /// Stopwords, one per line (default: built-in English list)
    #[arg(long, value_name = "STOPWORDS_FILE")]
    pub stopwords: Option<PathBuf>,

    /// Phrase frequencies, `segment<TAB>count` per line
    #[arg(long, value_name = "FREQUENCY_FILE")]
    pub phrase_frequencies: Option<PathBuf>,

    /// AND frequencies, `segment<TAB>count` per line
    #[arg(long, value_name = "FREQUENCY_FILE")]
    pub and_frequencies: Option<PathBuf>,

    /// Lemma and plural tables (JSON)
    #[arg(long, value_name = "LINGUISTICS_FILE")]
    pub linguistics: Option<PathBuf>,

    /// How signatures are rendered
    #[arg(long, default_value = "canonical")]
    pub signature_mode: SignatureModeArg,
}

/// Arguments for encoding a representation
#[derive(Parser, Debug, Clone)]
pub struct EncodeArgs {
    /// Representation as JSON: AND-groups of synsets of terms, e.g. '[[["a", "b"]]]'
    #[arg(value_name = "REPR_JSON")]
    pub repr: String,

    /// How the signature is rendered
    #[arg(long, default_value = "canonical")]
    pub signature_mode: SignatureModeArg,
}

/// Arguments for decoding a signature
#[derive(Parser, Debug, Clone)]
pub struct DecodeArgs {
    /// Signature, e.g. '((a | b))'
    #[arg(value_name = "SIGNATURE")]
    pub signature: String,
}

/// Arguments for a performance lookup
#[derive(Parser, Debug, Clone)]
pub struct PerfArgs {
    /// Signature of the query to evaluate
    #[arg(value_name = "SIGNATURE")]
    pub signature: String,

    /// Cache snapshot; created when missing
    #[arg(long, value_name = "CACHE_FILE")]
    pub cache: PathBuf,

    /// Backend host (used when the snapshot does not exist yet)
    #[arg(long, env = "LEXPAND_HOST", default_value = "localhost")]
    pub host: String,

    /// Backend port (used when the snapshot does not exist yet)
    #[arg(long, env = "LEXPAND_PORT", default_value = "9000")]
    pub port: u16,

    /// Relevant document ids, comma separated
    #[arg(long = "rel", value_delimiter = ',', value_name = "DOC_ID")]
    pub relevant: Vec<u64>,

    /// Cache key of the relevant set (default: a checksum of the ids)
    #[arg(long, value_name = "KEY")]
    pub rel_key: Option<u64>,

    /// Ask the backend even on a cache hit
    #[arg(long)]
    pub force: bool,

    /// Accept cached results without execution time
    #[arg(long)]
    pub no_time: bool,

    /// Do not write the snapshot back
    #[arg(long)]
    pub no_save: bool,

    /// How signatures are rendered
    #[arg(long, default_value = "canonical")]
    pub signature_mode: SignatureModeArg,
}

/// Arguments for inspecting a cache snapshot
#[derive(Parser, Debug, Clone)]
pub struct CacheInfoArgs {
    /// Cache snapshot
    #[arg(value_name = "CACHE_FILE")]
    pub cache: PathBuf,

    /// List every entry
    #[arg(long)]
    pub entries: bool,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Signature rendering options
#[derive(ValueEnum, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum SignatureModeArg {
    /// Sort and deduplicate terms, synsets and AND-groups
    Canonical,
    /// Keep the representation order
    Preserve,
}

impl From<SignatureModeArg> for SignatureMode {
    fn from(mode: SignatureModeArg) -> Self {
        match mode {
            SignatureModeArg::Canonical => SignatureMode::Canonical,
            SignatureModeArg::Preserve => SignatureMode::Preserve,
        }
    }
}
