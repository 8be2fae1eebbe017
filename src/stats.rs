//! Collection statistics contract.
//!
//! Feature extraction over expanded queries is delegated to
//! [`CollectionStatistics`] implementations. The caller annotates the base and
//! expanded representations with collection segment ids
//! ([`annotate_segments`]) and hands every provider a region of a shared
//! [`FeatureBuffer`]: one row per expansion term starting at `from_row`, and
//! the provider's own columns starting at `from_column`.

use ahash::AHashMap;

use crate::error::{LexpandError, Result};
use crate::query::repr::{QueryRepr, Tag};

/// A term annotated with its collection segment id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedTerm {
    pub segment_id: u32,
    pub term: String,
    pub tags: Vec<Tag>,
}

/// A [`QueryRepr`] whose terms carry collection segment ids.
pub type SegmentedRepr = Vec<Vec<Vec<SegmentedTerm>>>;

/// Annotate every term of `repr` with its id in `segment_ids`.
///
/// Terms are looked up trimmed. An unknown term is a format error.
pub fn annotate_segments(
    repr: &QueryRepr,
    segment_ids: &AHashMap<String, u32>,
) -> Result<SegmentedRepr> {
    repr.iter()
        .map(|and_group| {
            and_group
                .iter()
                .map(|synset| {
                    synset
                        .iter()
                        .map(|entry| -> Result<SegmentedTerm> {
                            let term = entry.term.trim();
                            let segment_id = segment_ids.get(term).copied().ok_or_else(|| {
                                LexpandError::format(format!(
                                    "Term '{term}' has no collection segment id"
                                ))
                            })?;
                            Ok(SegmentedTerm {
                                segment_id,
                                term: entry.term.clone(),
                                tags: entry.tags.clone(),
                            })
                        })
                        .collect::<Result<Vec<_>>>()
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect()
}

/// A dense row-major matrix of features.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBuffer {
    rows: usize,
    columns: usize,
    data: Vec<f32>,
}

impl FeatureBuffer {
    /// A zero-filled buffer.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            data: vec![0.0; rows * columns],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn get(&self, row: usize, column: usize) -> Option<f32> {
        if row < self.rows && column < self.columns {
            Some(self.data[row * self.columns + column])
        } else {
            None
        }
    }

    pub fn set(&mut self, row: usize, column: usize, value: f32) -> Result<()> {
        if row >= self.rows || column >= self.columns {
            return Err(LexpandError::other(format!(
                "Cell ({row}, {column}) is outside a {}x{} feature buffer",
                self.rows, self.columns
            )));
        }
        self.data[row * self.columns + column] = value;
        Ok(())
    }

    pub fn row(&self, row: usize) -> Option<&[f32]> {
        (row < self.rows).then(|| &self.data[row * self.columns..(row + 1) * self.columns])
    }

    pub fn row_mut(&mut self, row: usize) -> Option<&mut [f32]> {
        if row < self.rows {
            Some(&mut self.data[row * self.columns..(row + 1) * self.columns])
        } else {
            None
        }
    }

    /// Check that a `rows` by `columns` region at (`from_row`, `from_column`)
    /// fits in the buffer.
    pub fn check_region(
        &self,
        from_row: usize,
        rows: usize,
        from_column: usize,
        columns: usize,
    ) -> Result<()> {
        if from_row + rows > self.rows || from_column + columns > self.columns {
            return Err(LexpandError::other(format!(
                "Region {rows}x{columns} at ({from_row}, {from_column}) exceeds a {}x{} buffer",
                self.rows, self.columns
            )));
        }
        Ok(())
    }
}

/// A source of collection statistics features.
pub trait CollectionStatistics: Send + Sync {
    /// Number of columns this provider writes.
    fn num_features(&self) -> usize;

    /// Write the features of `num_expansion_terms` expansion terms into rows
    /// `from_row..from_row + num_expansion_terms` and columns
    /// `from_column..from_column + num_features()` of `buffer`.
    fn write_features(
        &self,
        base: &SegmentedRepr,
        expanded: &SegmentedRepr,
        num_expansion_terms: usize,
        buffer: &mut FeatureBuffer,
        from_row: usize,
        from_column: usize,
    ) -> Result<()>;

    /// Get the name of this provider for logging.
    fn name(&self) -> &'static str;
}

/// Places several providers side by side, each in its own columns.
#[derive(Default)]
pub struct StatisticsComposer {
    providers: Vec<Box<dyn CollectionStatistics>>,
}

impl StatisticsComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, provider: Box<dyn CollectionStatistics>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Compute the features of one expansion into a fresh buffer.
    pub fn transform(
        &self,
        base: &SegmentedRepr,
        expanded: &SegmentedRepr,
        num_expansion_terms: usize,
    ) -> Result<FeatureBuffer> {
        let mut buffer = FeatureBuffer::new(num_expansion_terms, self.num_features());
        self.write_features(base, expanded, num_expansion_terms, &mut buffer, 0, 0)?;
        Ok(buffer)
    }
}

impl CollectionStatistics for StatisticsComposer {
    fn num_features(&self) -> usize {
        self.providers.iter().map(|p| p.num_features()).sum()
    }

    fn write_features(
        &self,
        base: &SegmentedRepr,
        expanded: &SegmentedRepr,
        num_expansion_terms: usize,
        buffer: &mut FeatureBuffer,
        from_row: usize,
        from_column: usize,
    ) -> Result<()> {
        buffer.check_region(from_row, num_expansion_terms, from_column, self.num_features())?;

        let mut column = from_column;
        for provider in &self.providers {
            provider.write_features(
                base,
                expanded,
                num_expansion_terms,
                buffer,
                from_row,
                column,
            )?;
            column += provider.num_features();
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "composer"
    }
}
