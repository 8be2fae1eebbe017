//! Loaders for the plain-text resources the engine is built from.
//!
//! - term lists (accepted vocabulary, stopwords): one term per line; blank
//!   lines and lines starting with `#` are skipped.
//! - frequency tables: one `segment<TAB>count` pair per line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{LexpandError, Result};
use crate::segmenter::FrequencyTable;

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| {
        LexpandError::config(format!("Failed to open '{}': {}", path.display(), e))
    })?;
    Ok(BufReader::new(file))
}

/// Load a newline-delimited term list.
pub fn load_term_list<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let mut terms = Vec::new();
    for line in open(path)?.lines() {
        let line = line?;
        let term = line.trim();
        if term.is_empty() || term.starts_with('#') {
            continue;
        }
        terms.push(term.to_string());
    }
    Ok(terms)
}

/// Parse one `segment<TAB>count` line.
pub fn parse_frequency_line(line: &str) -> Result<(String, u64)> {
    let (segment, count) = line
        .rsplit_once('\t')
        .ok_or_else(|| LexpandError::format(format!("Missing tab in frequency line: {line}")))?;
    let count = count
        .trim()
        .parse::<u64>()
        .map_err(|e| LexpandError::format(format!("Invalid frequency in line '{line}': {e}")))?;
    Ok((segment.trim().to_string(), count))
}

/// Load a tab-separated frequency table.
pub fn load_frequency_table<P: AsRef<Path>>(path: P) -> Result<FrequencyTable> {
    let path = path.as_ref();
    let mut table = FrequencyTable::new();
    for (line_number, line) in open(path)?.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let (segment, count) = parse_frequency_line(&line).map_err(|e| {
            LexpandError::format(format!("{}:{}: {}", path.display(), line_number + 1, e))
        })?;
        table.insert(segment, count);
    }
    Ok(table)
}
