//! Numeric containers produced by the vectorizers.
//!
//! Dense output uses `ndarray`; sparse output uses [`CsrMatrix`], a
//! compressed-sparse-row matrix whose rows always have sorted column indices.

use std::collections::BTreeMap;

use ndarray::{Array1, Array2, Array3, Axis, concatenate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WordbagError};

/// Value written into padding rows of dense sequence output.
pub const SEQUENCE_PADDING: f64 = -1.0;

/// A compressed-sparse-row matrix of counts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CsrMatrix {
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

impl CsrMatrix {
    /// An empty matrix with `n_cols` columns and no rows.
    pub fn empty(n_cols: usize) -> Self {
        CsrMatrix {
            n_cols,
            indptr: vec![0],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Build a matrix from per-row `column -> value` maps.
    ///
    /// Zero entries are not stored.
    pub fn from_rows(n_cols: usize, rows: Vec<BTreeMap<usize, f64>>) -> Result<Self> {
        let mut matrix = Self::empty(n_cols);
        for row in rows {
            matrix.push_row(row)?;
        }
        Ok(matrix)
    }

    fn push_row(&mut self, row: BTreeMap<usize, f64>) -> Result<()> {
        for (col, value) in row {
            if col >= self.n_cols {
                return Err(WordbagError::featurization(format!(
                    "column {col} out of bounds for {} columns",
                    self.n_cols
                )));
            }
            if value != 0.0 {
                self.indices.push(col);
                self.data.push(value);
            }
        }
        self.indptr.push(self.indices.len());
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.indptr.len() - 1
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows(), self.n_cols)
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// The stored `(column, value)` pairs of a row, in column order.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let (start, end) = if row < self.n_rows() {
            (self.indptr[row], self.indptr[row + 1])
        } else {
            (0, 0)
        };
        self.indices[start..end]
            .iter()
            .copied()
            .zip(self.data[start..end].iter().copied())
    }

    /// A single entry; zero when not stored or out of range.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.row(row)
            .find(|&(c, _)| c == col)
            .map(|(_, v)| v)
            .unwrap_or(0.0)
    }

    /// Extract one row as a single-row matrix.
    pub fn row_matrix(&self, row: usize) -> CsrMatrix {
        let mut matrix = Self::empty(self.n_cols);
        for (col, value) in self.row(row) {
            matrix.indices.push(col);
            matrix.data.push(value);
        }
        matrix.indptr.push(matrix.indices.len());
        matrix
    }

    pub fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::zeros((self.n_rows(), self.n_cols));
        for r in 0..self.n_rows() {
            for (c, v) in self.row(r) {
                dense[[r, c]] = v;
            }
        }
        dense
    }
}

/// Features attached to a message field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Features {
    /// Bag-of-words vector, shape `[vocabulary_size]`.
    Dense(Array1<f64>),
    /// Per-token rows, shape `[seq_len, vocabulary_size]`, padded with
    /// [`SEQUENCE_PADDING`] when produced as part of a batch.
    Sequence(Array2<f64>),
    /// Sparse rows: one row for a bag of words, one row per token in sequence mode.
    Sparse(CsrMatrix),
}

impl Features {
    /// Length of the last axis.
    pub fn feature_len(&self) -> usize {
        match self {
            Features::Dense(v) => v.len(),
            Features::Sequence(m) => m.ncols(),
            Features::Sparse(m) => m.n_cols(),
        }
    }

    pub fn as_dense(&self) -> Option<&Array1<f64>> {
        match self {
            Features::Dense(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Array2<f64>> {
        match self {
            Features::Sequence(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sparse(&self) -> Option<&CsrMatrix> {
        match self {
            Features::Sparse(m) => Some(m),
            _ => None,
        }
    }

    /// Combine new dense features with features already on a message.
    ///
    /// Existing dense features are kept in front of the new ones; any other
    /// existing kind cannot be combined and is reported as an error rather
    /// than overwritten.
    pub fn combine_with_existing(existing: Option<&Features>, additional: Array1<f64>) -> Result<Features> {
        match existing {
            None => Ok(Features::Dense(additional)),
            Some(Features::Dense(current)) => {
                let combined = concatenate(Axis(0), &[current.view(), additional.view()])
                    .map_err(|e| WordbagError::featurization(e.to_string()))?;
                Ok(Features::Dense(combined))
            }
            Some(other) => Err(WordbagError::featurization(format!(
                "cannot combine dense features with existing {} features",
                other.kind()
            ))),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Features::Dense(_) => "dense",
            Features::Sequence(_) => "sequence",
            Features::Sparse(_) => "sparse",
        }
    }
}

/// Per-example output of one transform call.
#[derive(Clone, Debug, PartialEq)]
pub enum BatchFeatures {
    /// Bag-of-words rows, one per document.
    Dense(Array2<f64>),
    /// Bag-of-words rows, one per document.
    Sparse(CsrMatrix),
    /// `[n_docs, max_seq_len, vocabulary_size]`, padded.
    DenseSequence(Array3<f64>),
    /// One matrix per document, unpadded.
    SparseSequence(Vec<CsrMatrix>),
}

impl BatchFeatures {
    pub fn len(&self) -> usize {
        match self {
            BatchFeatures::Dense(m) => m.nrows(),
            BatchFeatures::Sparse(m) => m.n_rows(),
            BatchFeatures::DenseSequence(a) => a.len_of(Axis(0)),
            BatchFeatures::SparseSequence(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Split the batch into the features of each document, in order.
    pub fn into_examples(self) -> Vec<Features> {
        match self {
            BatchFeatures::Dense(m) => m
                .axis_iter(Axis(0))
                .map(|row| Features::Dense(row.to_owned()))
                .collect(),
            BatchFeatures::Sparse(m) => (0..m.n_rows())
                .map(|r| Features::Sparse(m.row_matrix(r)))
                .collect(),
            BatchFeatures::DenseSequence(a) => a
                .axis_iter(Axis(0))
                .map(|seq| Features::Sequence(seq.to_owned()))
                .collect(),
            BatchFeatures::SparseSequence(v) => v.into_iter().map(Features::Sparse).collect(),
        }
    }
}
