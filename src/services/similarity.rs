use crate::{
    error::{AppError, AppResult},
    services::catalog::Catalog,
};

/// Precomputed K×K similarity scores, stored row-major
///
/// Row `i` holds the scores of movie `i` against every other movie. The
/// scores are opaque: symmetry is neither assumed nor checked.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    dimension: usize,
    scores: Vec<f64>,
}

impl SimilarityMatrix {
    /// Builds a matrix from rows, failing unless it is square
    pub fn from_rows(rows: Vec<Vec<f64>>) -> AppResult<Self> {
        let dimension = rows.len();
        let mut scores = Vec::with_capacity(dimension * dimension);

        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != dimension {
                return Err(AppError::DataLoad(format!(
                    "similarity matrix is not square: row {} has {} columns, expected {}",
                    index,
                    row.len(),
                    dimension
                )));
            }
            scores.extend(row);
        }

        Ok(Self { dimension, scores })
    }

    /// Parses a JSON array of score rows
    pub fn from_json_slice(bytes: &[u8]) -> AppResult<Self> {
        let rows: Vec<Vec<f64>> = serde_json::from_slice(bytes)
            .map_err(|e| AppError::DataLoad(format!("malformed similarity matrix: {}", e)))?;
        Self::from_rows(rows)
    }

    /// Number of rows (and columns)
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn row(&self, row_index: usize) -> Option<&[f64]> {
        if row_index >= self.dimension {
            return None;
        }
        let start = row_index * self.dimension;
        Some(&self.scores[start..start + self.dimension])
    }

    /// Fails unless the matrix has exactly one row per catalog movie
    pub fn ensure_aligned_with(&self, catalog: &Catalog) -> AppResult<()> {
        if self.dimension != catalog.len() {
            return Err(AppError::DataLoad(format!(
                "similarity matrix has {} rows but catalog has {} movies",
                self.dimension,
                catalog.len()
            )));
        }
        Ok(())
    }
}
