//! Dense row-major feature matrix produced by the column transformer

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    feature_names: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    /// Build a matrix, checking every row against the number of feature names
    pub fn new(feature_names: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_cols = feature_names.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
            return Err(Error::DimensionMismatch(format!(
                "row {} has {} values, expected {}",
                i,
                row.len(),
                n_cols
            )));
        }
        Ok(FeatureMatrix {
            feature_names,
            rows,
        })
    }

    /// Assemble a matrix from column-major blocks
    pub(crate) fn from_columns(
        feature_names: Vec<String>,
        columns: Vec<Vec<f64>>,
        n_rows: usize,
    ) -> Result<Self> {
        if feature_names.len() != columns.len() {
            return Err(Error::DimensionMismatch(format!(
                "{} feature names for {} columns",
                feature_names.len(),
                columns.len()
            )));
        }
        let mut rows = vec![Vec::with_capacity(columns.len()); n_rows];
        for column in &columns {
            if column.len() != n_rows {
                return Err(Error::DimensionMismatch(format!(
                    "column has {} values, expected {}",
                    column.len(),
                    n_rows
                )));
            }
            for (row, &value) in rows.iter_mut().zip(column.iter()) {
                row.push(value);
            }
        }
        Ok(FeatureMatrix {
            feature_names,
            rows,
        })
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.feature_names.len()
    }

    /// Values of one column, top to bottom
    pub fn column(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.n_cols() {
            return None;
        }
        Some(self.rows.iter().map(|r| r[index]).collect())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|n| n == name)
    }
}
