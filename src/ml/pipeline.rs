//! 機械学習パイプラインモジュール
//!
//! Column transformer for the cleaned laptop table. Numeric columns go through
//! median imputation and standardization; categorical columns through
//! most-frequent imputation, one-hot encoding and scaling without centering.
//!
//! Fitting produces a [`TransformerState`]. Applying a state never looks at
//! the statistics of its input: train, test and any later table are all
//! encoded with the numbers fitted on the train partition.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::TransformationConfig;
use crate::dataset::Dataset;
use crate::error::{Error, Result, UnseenCategory};
use crate::ml::matrix::FeatureMatrix;
use crate::ml::preprocessing::{MedianImputer, MostFrequentImputer, OneHotEncoder, StandardScaler};

/// データ変換器のトレイト
pub trait Transformer {
    /// データから学習する
    fn fit(&mut self, data: &Dataset) -> Result<()>;

    /// データを変換する
    fn transform(&self, data: &Dataset) -> Result<FeatureMatrix>;

    /// データを学習し、その後変換する
    fn fit_transform(&mut self, data: &Dataset) -> Result<FeatureMatrix> {
        self.fit(data)?;
        self.transform(data)
    }
}

/// Fitted parameters of the column transformer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformerState {
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    numeric_imputer: MedianImputer,
    numeric_scaler: StandardScaler,
    categorical_imputer: MostFrequentImputer,
    encoder: OneHotEncoder,
    categorical_scaler: StandardScaler,
}

/// Result of applying a state: the matrix plus every unseen category met
#[derive(Debug, Clone)]
pub struct Transformed {
    pub matrix: FeatureMatrix,
    pub unseen: Vec<UnseenCategory>,
}

impl TransformerState {
    /// Fit every statistic on `data`, which must be the train partition
    pub fn fit(
        numeric_columns: &[String],
        categorical_columns: &[String],
        data: &Dataset,
    ) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::EmptyData(
                "cannot fit the transformer on an empty table".to_string(),
            ));
        }

        let numeric = read_numeric(data, numeric_columns)?;
        let numeric_imputer = MedianImputer::fit(&numeric);
        let numeric_scaler = StandardScaler::fit(&numeric_imputer.transform(&numeric)?, true)?;

        let categorical = read_categorical(data, categorical_columns)?;
        let categorical_imputer = MostFrequentImputer::fit(&categorical);
        let imputed = categorical_imputer.transform(&categorical)?;
        let encoder = OneHotEncoder::fit(&imputed);
        let (indicators, _) = encoder.transform(categorical_columns, &imputed)?;
        let categorical_scaler = StandardScaler::fit(&indicators, false)?;

        Ok(TransformerState {
            numeric_columns: numeric_columns.to_vec(),
            categorical_columns: categorical_columns.to_vec(),
            numeric_imputer,
            numeric_scaler,
            categorical_imputer,
            encoder,
            categorical_scaler,
        })
    }

    /// Encode `data` with the fitted statistics
    pub fn apply(&self, data: &Dataset) -> Result<Transformed> {
        let numeric = read_numeric(data, &self.numeric_columns)?;
        let numeric_block = self
            .numeric_scaler
            .transform(&self.numeric_imputer.transform(&numeric)?)?;

        let categorical = read_categorical(data, &self.categorical_columns)?;
        let imputed = self.categorical_imputer.transform(&categorical)?;
        let (indicators, unseen) = self.encoder.transform(&self.categorical_columns, &imputed)?;
        let categorical_block = self.categorical_scaler.transform(&indicators)?;

        let mut columns = numeric_block;
        columns.extend(categorical_block);
        let matrix = FeatureMatrix::from_columns(self.feature_names()?, columns, data.len())?;

        Ok(Transformed { matrix, unseen })
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    pub fn numeric_imputer(&self) -> &MedianImputer {
        &self.numeric_imputer
    }

    pub fn numeric_scaler(&self) -> &StandardScaler {
        &self.numeric_scaler
    }

    pub fn categorical_imputer(&self) -> &MostFrequentImputer {
        &self.categorical_imputer
    }

    pub fn encoder(&self) -> &OneHotEncoder {
        &self.encoder
    }

    pub fn categorical_scaler(&self) -> &StandardScaler {
        &self.categorical_scaler
    }

    /// Output column names: numeric block, then one block per categorical column
    pub fn feature_names(&self) -> Result<Vec<String>> {
        let mut names = self.numeric_columns.clone();
        names.extend(self.encoder.feature_names(&self.categorical_columns)?);
        Ok(names)
    }

    pub fn n_output_features(&self) -> usize {
        self.numeric_columns.len() + self.encoder.n_outputs()
    }

    /// Check the state against a column configuration and its own internals
    pub fn check_compatible(
        &self,
        numeric_columns: &[String],
        categorical_columns: &[String],
    ) -> Result<()> {
        if self.numeric_columns != numeric_columns || self.categorical_columns != categorical_columns
        {
            return Err(Error::TransformerState(format!(
                "state fitted on numeric {:?} / categorical {:?}, transformer configured with numeric {:?} / categorical {:?}",
                self.numeric_columns, self.categorical_columns, numeric_columns, categorical_columns
            )));
        }

        let n_num = self.numeric_columns.len();
        let n_cat = self.categorical_columns.len();
        let consistent = self.numeric_imputer.statistics().len() == n_num
            && self.numeric_scaler.scales().len() == n_num
            && self.categorical_imputer.statistics().len() == n_cat
            && self.encoder.categories().len() == n_cat
            && self.categorical_scaler.scales().len() == self.encoder.n_outputs();
        if !consistent {
            return Err(Error::TransformerState(
                "state components disagree on column counts".to_string(),
            ));
        }
        Ok(())
    }
}

fn read_numeric(data: &Dataset, columns: &[String]) -> Result<Vec<Vec<Option<f64>>>> {
    columns.iter().map(|c| data.numeric_column(c)).collect()
}

fn read_categorical(data: &Dataset, columns: &[String]) -> Result<Vec<Vec<Option<String>>>> {
    columns.iter().map(|c| data.categorical_column(c)).collect()
}

/// 列ごとの変換を束ねる変換器
///
/// Holds the column lists and, once fitted, the [`TransformerState`].
#[derive(Debug, Clone)]
pub struct ColumnTransformer {
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    state: Option<TransformerState>,
}

impl ColumnTransformer {
    pub fn new(numeric_columns: Vec<String>, categorical_columns: Vec<String>) -> Self {
        ColumnTransformer {
            numeric_columns,
            categorical_columns,
            state: None,
        }
    }

    pub fn from_config(config: &TransformationConfig) -> Self {
        Self::new(
            config.numeric_columns.clone(),
            config.categorical_columns.clone(),
        )
    }

    /// Reuse a state fitted earlier, e.g. one loaded from disk
    pub fn with_state(mut self, state: TransformerState) -> Result<Self> {
        state.check_compatible(&self.numeric_columns, &self.categorical_columns)?;
        self.state = Some(state);
        Ok(self)
    }

    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&TransformerState> {
        self.state.as_ref()
    }

    pub fn into_state(self) -> Option<TransformerState> {
        self.state
    }

    fn fitted_state(&self) -> Result<&TransformerState> {
        self.state.as_ref().ok_or_else(|| {
            Error::TransformerState("transform called before fit".to_string())
        })
    }

    /// Transform and return the unseen categories instead of only logging them
    pub fn transform_with_warnings(&self, data: &Dataset) -> Result<Transformed> {
        self.fitted_state()?.apply(data)
    }
}

impl Transformer for ColumnTransformer {
    fn fit(&mut self, data: &Dataset) -> Result<()> {
        info!("Numerical columns: {:?}", self.numeric_columns);
        info!("Categorical columns: {:?}", self.categorical_columns);

        let state = TransformerState::fit(&self.numeric_columns, &self.categorical_columns, data)?;
        info!(
            "Fitted transformer on {} rows, {} output features",
            data.len(),
            state.n_output_features()
        );
        self.state = Some(state);
        Ok(())
    }

    fn transform(&self, data: &Dataset) -> Result<FeatureMatrix> {
        let transformed = self.transform_with_warnings(data)?;
        log_unseen(&transformed.unseen);
        Ok(transformed.matrix)
    }
}

/// One warning line per column with the number of unseen values
pub(crate) fn log_unseen(unseen: &[UnseenCategory]) {
    let mut by_column: Vec<(&str, usize, &str)> = Vec::new();
    for u in unseen {
        match by_column.iter().position(|(c, _, _)| *c == u.column) {
            Some(pos) => by_column[pos].1 += 1,
            None => by_column.push((u.column.as_str(), 1, u.value.as_str())),
        }
    }
    for (column, count, example) in by_column {
        warn!(
            "{} unseen categories in column '{}' encoded as zeros (e.g. {:?})",
            count, column, example
        );
    }
}
