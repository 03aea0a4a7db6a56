//! 前処理モジュール
//!
//! Column-level building blocks of the feature transformer. Every component is
//! fitted by construction (`fit` returns the fitted value) and never changes
//! afterwards; `transform` only reads the fitted statistics.
//!
//! All components work on column-major data: one `Vec` per column, one entry
//! per row.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, UnseenCategory};

fn check_width(component: &str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(Error::TransformerState(format!(
            "{} was fitted on {} columns but received {}",
            component, expected, found
        )));
    }
    Ok(())
}

/// Median of the present values; 0.0 when none are present
pub(crate) fn median(values: &[Option<f64>]) -> f64 {
    let mut present: Vec<f64> = values.iter().filter_map(|v| *v).collect();
    if present.is_empty() {
        return 0.0;
    }
    present.sort_by(|a, b| a.total_cmp(b));
    let mid = present.len() / 2;
    if present.len() % 2 == 0 {
        (present[mid - 1] + present[mid]) / 2.0
    } else {
        present[mid]
    }
}

/// Most frequent present value; ties go to the lexicographically smallest
pub(crate) fn most_frequent(values: &[Option<String>]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values.iter().flatten() {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }
    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        // BTreeMapは昇順なので、同数の場合は先に見た値を残す
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(v, _)| v.to_string())
}

/// 欠損値を中央値で補完する変換器
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedianImputer {
    /// 各列の中央値
    statistics: Vec<f64>,
}

impl MedianImputer {
    pub fn fit(columns: &[Vec<Option<f64>>]) -> Self {
        MedianImputer {
            statistics: columns.iter().map(|c| median(c)).collect(),
        }
    }

    pub fn statistics(&self) -> &[f64] {
        &self.statistics
    }

    pub fn transform(&self, columns: &[Vec<Option<f64>>]) -> Result<Vec<Vec<f64>>> {
        check_width("MedianImputer", self.statistics.len(), columns.len())?;
        Ok(columns
            .iter()
            .zip(self.statistics.iter())
            .map(|(column, &fill)| column.iter().map(|v| v.unwrap_or(fill)).collect())
            .collect())
    }
}

/// 欠損値を最頻値で補完する変換器
///
/// A column with no present value at fit time has no statistic; its missing
/// entries stay missing and encode to an all-zero block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MostFrequentImputer {
    /// 各列の最頻値
    statistics: Vec<Option<String>>,
}

impl MostFrequentImputer {
    pub fn fit(columns: &[Vec<Option<String>>]) -> Self {
        MostFrequentImputer {
            statistics: columns.iter().map(|c| most_frequent(c)).collect(),
        }
    }

    pub fn statistics(&self) -> &[Option<String>] {
        &self.statistics
    }

    pub fn transform(&self, columns: &[Vec<Option<String>>]) -> Result<Vec<Vec<Option<String>>>> {
        check_width("MostFrequentImputer", self.statistics.len(), columns.len())?;
        Ok(columns
            .iter()
            .zip(self.statistics.iter())
            .map(|(column, fill)| {
                column
                    .iter()
                    .map(|v| v.clone().or_else(|| fill.clone()))
                    .collect()
            })
            .collect())
    }
}

/// カテゴリカルデータをダミー変数に変換するための変換器（One-Hot Encoding）
///
/// Categories are stored sorted. Values outside the fitted vocabulary encode
/// to an all-zero block and are reported back as [`UnseenCategory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    /// 各列のカテゴリリスト
    categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    pub fn fit(columns: &[Vec<Option<String>>]) -> Self {
        let categories = columns
            .iter()
            .map(|column| {
                column
                    .iter()
                    .flatten()
                    .cloned()
                    .collect::<BTreeSet<String>>()
                    .into_iter()
                    .collect()
            })
            .collect();
        OneHotEncoder { categories }
    }

    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }

    /// Number of indicator columns produced
    pub fn n_outputs(&self) -> usize {
        self.categories.iter().map(|c| c.len()).sum()
    }

    /// Output names, `<column>_<category>`
    pub fn feature_names(&self, input_names: &[String]) -> Result<Vec<String>> {
        check_width("OneHotEncoder", self.categories.len(), input_names.len())?;
        Ok(input_names
            .iter()
            .zip(self.categories.iter())
            .flat_map(|(name, cats)| cats.iter().map(move |c| format!("{}_{}", name, c)))
            .collect())
    }

    /// Encode columns into indicator columns
    ///
    /// # Arguments
    /// * `input_names` - Names of the encoded columns, used in warnings
    /// * `columns` - Imputed categorical columns
    ///
    /// # Returns
    /// * Indicator columns in fitted order, and every unseen value met
    pub fn transform(
        &self,
        input_names: &[String],
        columns: &[Vec<Option<String>>],
    ) -> Result<(Vec<Vec<f64>>, Vec<UnseenCategory>)> {
        check_width("OneHotEncoder", self.categories.len(), columns.len())?;
        check_width("OneHotEncoder", self.categories.len(), input_names.len())?;

        let mut outputs = Vec::with_capacity(self.n_outputs());
        let mut unseen = Vec::new();

        for ((name, column), categories) in input_names
            .iter()
            .zip(columns.iter())
            .zip(self.categories.iter())
        {
            let mut block = vec![vec![0.0; column.len()]; categories.len()];
            for (row, value) in column.iter().enumerate() {
                let Some(value) = value else { continue };
                match categories.binary_search(value) {
                    Ok(idx) => block[idx][row] = 1.0,
                    Err(_) => unseen.push(UnseenCategory {
                        column: name.clone(),
                        value: value.clone(),
                    }),
                }
            }
            outputs.extend(block);
        }

        Ok((outputs, unseen))
    }
}

/// 数値データを標準化するための変換器
///
/// Population standard deviation, as computed on the fit columns. Columns with
/// (numerically) zero variance get a scale of 1. With `with_mean = false` the
/// values are only divided by the scale, which keeps 0/1 indicators sparse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    with_mean: bool,
    /// 各列の平均値
    means: Vec<f64>,
    /// 各列の標準偏差
    scales: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(columns: &[Vec<f64>], with_mean: bool) -> Result<Self> {
        let mut means = Vec::with_capacity(columns.len());
        let mut scales = Vec::with_capacity(columns.len());

        for column in columns {
            if column.is_empty() {
                return Err(Error::EmptyData(
                    "cannot fit a scaler on an empty column".to_string(),
                ));
            }
            let n = column.len() as f64;
            let mean = column.iter().sum::<f64>() / n;
            let mut var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

            // 丸め誤差による微小な分散はゼロとみなす
            let bound = n * f64::EPSILON * var + (n * mean * f64::EPSILON).powi(2);
            if var <= bound {
                var = 0.0;
            }
            let std = var.sqrt();

            means.push(mean);
            scales.push(if std > 0.0 { std } else { 1.0 });
        }

        Ok(StandardScaler {
            with_mean,
            means,
            scales,
        })
    }

    pub fn with_mean(&self) -> bool {
        self.with_mean
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    pub fn transform(&self, columns: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        check_width("StandardScaler", self.scales.len(), columns.len())?;
        Ok(columns
            .iter()
            .zip(self.means.iter().zip(self.scales.iter()))
            .map(|(column, (&mean, &scale))| {
                let offset = if self.with_mean { mean } else { 0.0 };
                column.iter().map(|v| (v - offset) / scale).collect()
            })
            .collect())
    }
}
