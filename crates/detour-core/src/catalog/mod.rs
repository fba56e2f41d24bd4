//! Alternatives catalog loaded from a parquet artifact.
//!
//! Each row carries an item id, an optional display label, a precomputed
//! risk score and a fixed-dimensionality embedding. Rows that fail
//! validation are dropped with a warning; a catalog that ends up empty is
//! a fatal startup error. The loaded catalog is read-only for the
//! lifetime of the process.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::CatalogError;

use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, FixedSizeListArray, Float32Array, Float64Array, ListArray, StringArray};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tracing::{info, warn};

const COL_ITEM_ID: &str = "item_id";
const COL_LABEL: &str = "label";
const COL_RISK: &str = "risk";
const COL_EMBEDDING: &str = "embedding";

/// One catalog row. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub item_id: String,
    pub label: Option<String>,
    /// Precomputed risk in `[0, 1]`.
    pub risk: f32,
    pub embedding: Vec<f32>,
}

/// Summary of the loaded catalog, exposed on the admin surface.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogStats {
    pub entries: usize,
    pub embedding_dim: usize,
    pub risk_min: f32,
    pub risk_mean: f32,
    pub risk_max: f32,
}

/// Full set of candidate alternatives, loaded once at startup.
#[derive(Debug)]
pub struct AlternativesCatalog {
    entries: Vec<CatalogEntry>,
    embedding_dim: usize,
}

impl AlternativesCatalog {
    /// Reads the parquet artifact. Invalid rows are dropped with a
    /// warning; an empty result is fatal.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let file = File::open(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut entries: Vec<CatalogEntry> = Vec::new();
        let mut dropped = 0usize;
        let mut embedding_dim: Option<usize> = None;

        for batch in reader {
            let batch = batch?;

            let item_ids = batch
                .column_by_name(COL_ITEM_ID)
                .ok_or(CatalogError::MissingColumn { name: COL_ITEM_ID })?
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or(CatalogError::ColumnType {
                    name: COL_ITEM_ID,
                    expected: "utf8",
                })?;

            let labels = batch
                .column_by_name(COL_LABEL)
                .map(|col| {
                    col.as_any()
                        .downcast_ref::<StringArray>()
                        .ok_or(CatalogError::ColumnType {
                            name: COL_LABEL,
                            expected: "utf8",
                        })
                })
                .transpose()?;

            let risk_col = batch
                .column_by_name(COL_RISK)
                .ok_or(CatalogError::MissingColumn { name: COL_RISK })?;

            let embedding_col = batch
                .column_by_name(COL_EMBEDDING)
                .ok_or(CatalogError::MissingColumn {
                    name: COL_EMBEDDING,
                })?;

            for row in 0..batch.num_rows() {
                if item_ids.is_null(row) || item_ids.value(row).is_empty() {
                    warn!(row, "Dropping catalog row without item_id");
                    dropped += 1;
                    continue;
                }
                let item_id = item_ids.value(row).to_string();

                let Some(risk) = risk_at(risk_col, row)? else {
                    warn!(item_id = %item_id, "Dropping catalog row without a usable risk score");
                    dropped += 1;
                    continue;
                };
                if !risk.is_finite() || !(0.0..=1.0).contains(&risk) {
                    warn!(item_id = %item_id, risk, "Dropping catalog row with out-of-range risk");
                    dropped += 1;
                    continue;
                }

                let Some(embedding) = embedding_at(embedding_col, row) else {
                    warn!(item_id = %item_id, "Dropping catalog row without a usable embedding");
                    dropped += 1;
                    continue;
                };
                if embedding.is_empty() {
                    warn!(item_id = %item_id, "Dropping catalog row with empty embedding");
                    dropped += 1;
                    continue;
                }

                match embedding_dim {
                    None => embedding_dim = Some(embedding.len()),
                    Some(dim) if dim != embedding.len() => {
                        warn!(
                            item_id = %item_id,
                            expected = dim,
                            actual = embedding.len(),
                            "Dropping catalog row with mismatched embedding dimension"
                        );
                        dropped += 1;
                        continue;
                    }
                    Some(_) => {}
                }

                let label = labels
                    .filter(|l| !l.is_null(row))
                    .map(|l| l.value(row).to_string());

                entries.push(CatalogEntry {
                    item_id,
                    label,
                    risk,
                    embedding,
                });
            }
        }

        let catalog = Self::from_entries(entries)?;

        info!(
            path = %path.display(),
            entries = catalog.len(),
            dropped,
            embedding_dim = catalog.embedding_dim(),
            "Alternatives catalog loaded"
        );

        Ok(catalog)
    }

    /// Builds a catalog from in-memory entries. Fails on an empty set or
    /// inconsistent embedding dimensions.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        let Some(first) = entries.first() else {
            return Err(CatalogError::Empty);
        };

        let embedding_dim = first.embedding.len();
        for entry in &entries {
            if entry.embedding.len() != embedding_dim {
                return Err(CatalogError::DimensionMismatch {
                    first: embedding_dim,
                    other: entry.embedding.len(),
                });
            }
        }

        Ok(Self {
            entries,
            embedding_dim,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    /// Returns the entry at its stable catalog position.
    pub fn get(&self, position: usize) -> Option<&CatalogEntry> {
        self.entries.get(position)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn stats(&self) -> CatalogStats {
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        let mut sum = 0.0f64;
        for entry in &self.entries {
            min = min.min(entry.risk);
            max = max.max(entry.risk);
            sum += entry.risk as f64;
        }

        CatalogStats {
            entries: self.entries.len(),
            embedding_dim: self.embedding_dim,
            risk_min: min,
            risk_mean: (sum / self.entries.len() as f64) as f32,
            risk_max: max,
        }
    }
}

fn risk_at(col: &ArrayRef, row: usize) -> Result<Option<f32>, CatalogError> {
    if let Some(arr) = col.as_any().downcast_ref::<Float32Array>() {
        return Ok((!arr.is_null(row)).then(|| arr.value(row)));
    }
    if let Some(arr) = col.as_any().downcast_ref::<Float64Array>() {
        return Ok((!arr.is_null(row)).then(|| arr.value(row) as f32));
    }
    Err(CatalogError::ColumnType {
        name: COL_RISK,
        expected: "float32 or float64",
    })
}

fn embedding_at(col: &ArrayRef, row: usize) -> Option<Vec<f32>> {
    if col.is_null(row) {
        return None;
    }

    let values: ArrayRef = if let Some(arr) = col.as_any().downcast_ref::<FixedSizeListArray>() {
        arr.value(row)
    } else if let Some(arr) = col.as_any().downcast_ref::<ListArray>() {
        arr.value(row)
    } else {
        return None;
    };

    if let Some(floats) = values.as_any().downcast_ref::<Float32Array>() {
        if floats.null_count() > 0 {
            return None;
        }
        return Some(floats.values().to_vec());
    }
    if let Some(floats) = values.as_any().downcast_ref::<Float64Array>() {
        if floats.null_count() > 0 {
            return None;
        }
        return Some(floats.values().iter().map(|&v| v as f32).collect());
    }

    None
}
