//! 機械学習モデルモジュール
//!
//! Regressors fitted on the transformed feature matrix. Every model is
//! deterministic given its seed.

pub mod ensemble;
pub mod linear;
pub mod tree;

use std::fmt::Debug;

use crate::config::{ModelConfig, ModelKind};
use crate::error::{Error, Result};
use crate::ml::matrix::FeatureMatrix;

pub use ensemble::{RandomForestConfig, RandomForestConfigBuilder, RandomForestRegressor};
pub use linear::RidgeRegression;
pub use tree::{DecisionTreeConfig, DecisionTreeRegressor, TreeNode};

/// 回帰モデルに共通するトレイト
pub trait Regressor: Debug {
    /// モデルを訓練データでフィットさせる
    fn fit(&mut self, x: &FeatureMatrix, y: &[f64]) -> Result<()>;

    /// 新しいデータに対して予測を行う
    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<f64>>;

    /// 学習済みかどうか
    fn is_fitted(&self) -> bool;

    /// Short name used in log lines
    fn name(&self) -> &'static str;
}

impl<R: Regressor + ?Sized> Regressor for Box<R> {
    fn fit(&mut self, x: &FeatureMatrix, y: &[f64]) -> Result<()> {
        (**self).fit(x, y)
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        (**self).predict(x)
    }

    fn is_fitted(&self) -> bool {
        (**self).is_fitted()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Build the regressor selected by `config.kind`
pub fn build_regressor(config: &ModelConfig) -> Box<dyn Regressor> {
    match config.kind {
        ModelKind::RandomForest => Box::new(RandomForestRegressor::new(RandomForestConfig {
            n_estimators: config.n_estimators,
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf,
            max_features: config.max_features,
            bootstrap: true,
            random_seed: config.seed,
        })),
        ModelKind::DecisionTree => Box::new(DecisionTreeRegressor::new(DecisionTreeConfig {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf,
            max_features: config.max_features,
            random_seed: config.seed,
        })),
        ModelKind::Ridge => Box::new(RidgeRegression::new(config.alpha)),
    }
}

/// Shared checks on a training set
pub(crate) fn check_training_data(x: &FeatureMatrix, y: &[f64]) -> Result<()> {
    if x.n_rows() == 0 {
        return Err(Error::EmptyData("no training rows".to_string()));
    }
    if x.n_rows() != y.len() {
        return Err(Error::DimensionMismatch(format!(
            "{} feature rows but {} target values",
            x.n_rows(),
            y.len()
        )));
    }
    if let Some(i) = y.iter().position(|v| !v.is_finite()) {
        return Err(Error::InvalidInput(format!(
            "target value at row {} is not finite",
            i
        )));
    }
    Ok(())
}

/// Shared checks before predicting
pub(crate) fn check_prediction_input(
    fitted: bool,
    n_features: usize,
    x: &FeatureMatrix,
) -> Result<()> {
    if !fitted {
        return Err(Error::InvalidOperation("Model not fitted".to_string()));
    }
    if x.n_cols() != n_features {
        return Err(Error::DimensionMismatch(format!(
            "model fitted on {} features, got {}",
            n_features,
            x.n_cols()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<f64>>) -> FeatureMatrix {
        let n = rows.first().map(|r| r.len()).unwrap_or(0);
        let names = (0..n).map(|i| format!("f{}", i)).collect();
        FeatureMatrix::new(names, rows).unwrap()
    }

    #[test]
    fn test_build_regressor_kinds() {
        let mut config = ModelConfig::default();
        assert_eq!(build_regressor(&config).name(), "random_forest");
        config.kind = ModelKind::DecisionTree;
        assert_eq!(build_regressor(&config).name(), "decision_tree");
        config.kind = ModelKind::Ridge;
        assert_eq!(build_regressor(&config).name(), "ridge");
    }

    #[test]
    fn test_check_training_data() {
        let x = matrix(vec![vec![1.0], vec![2.0]]);
        assert!(check_training_data(&x, &[1.0, 2.0]).is_ok());
        assert!(matches!(
            check_training_data(&x, &[1.0]),
            Err(Error::DimensionMismatch(_))
        ));
        assert!(matches!(
            check_training_data(&x, &[1.0, f64::NAN]),
            Err(Error::InvalidInput(_))
        ));
        let empty = FeatureMatrix::new(vec!["f0".to_string()], vec![]).unwrap();
        assert!(matches!(
            check_training_data(&empty, &[]),
            Err(Error::EmptyData(_))
        ));
    }

    #[test]
    fn test_boxed_regressor_delegates() {
        let mut model: Box<dyn Regressor> = Box::new(RidgeRegression::new(0.0));
        assert!(!model.is_fitted());
        let x = matrix(vec![vec![0.0], vec![1.0], vec![2.0]]);
        model.fit(&x, &[1.0, 3.0, 5.0]).unwrap();
        assert!(model.is_fitted());
        let pred = model.predict(&x).unwrap();
        assert!((pred[2] - 5.0).abs() < 1e-9);
    }
}
