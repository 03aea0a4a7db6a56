//! Model training and held-out evaluation

use log::info;

use crate::error::Result;
use crate::ml::matrix::FeatureMatrix;
use crate::ml::metrics::RegressionMetrics;
use crate::ml::models::{check_training_data, Regressor};

/// Fits a regressor on the transformed train matrix
#[derive(Debug)]
pub struct ModelTrainer<R: Regressor> {
    model: R,
}

/// A regressor that has been fitted; only this type can be evaluated
#[derive(Debug)]
pub struct TrainedModel<R: Regressor> {
    model: R,
    n_features: usize,
}

impl<R: Regressor> ModelTrainer<R> {
    pub fn new(model: R) -> Self {
        ModelTrainer { model }
    }

    /// Fit on the train partition
    ///
    /// # Arguments
    /// * `x` - Transformed train matrix
    /// * `y` - Train target, one value per row of `x`
    pub fn fit(self, x: &FeatureMatrix, y: &[f64]) -> Result<TrainedModel<R>> {
        check_training_data(x, y)?;
        let mut model = self.model;
        info!(
            "Training {} on {} rows x {} features",
            model.name(),
            x.n_rows(),
            x.n_cols()
        );
        model.fit(x, y)?;
        Ok(TrainedModel {
            model,
            n_features: x.n_cols(),
        })
    }
}

impl<R: Regressor> TrainedModel<R> {
    pub fn predict(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        self.model.predict(x)
    }

    pub fn model(&self) -> &R {
        &self.model
    }

    pub fn into_model(self) -> R {
        self.model
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

/// Score a trained model on the held-out partition and log R² and MSE
///
/// # Returns
/// R² and mean squared error of the predictions against `y`
pub fn evaluate<R: Regressor>(
    model: &TrainedModel<R>,
    x: &FeatureMatrix,
    y: &[f64],
) -> Result<RegressionMetrics> {
    let predictions = model.predict(x)?;
    let metrics = RegressionMetrics::compute(y, &predictions)?;
    info!("R2 score: {}", metrics.r2);
    info!("Mean squared error: {}", metrics.mse);
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::ml::models::RidgeRegression;

    fn matrix(values: &[f64]) -> FeatureMatrix {
        FeatureMatrix::new(
            vec!["x".to_string()],
            values.iter().map(|&v| vec![v]).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_fit_and_evaluate_perfect_line() {
        let x = matrix(&[0.0, 1.0, 2.0, 3.0]);
        let y = [1.0, 3.0, 5.0, 7.0];
        let trained = ModelTrainer::new(RidgeRegression::new(0.0))
            .fit(&x, &y)
            .unwrap();
        assert_eq!(trained.n_features(), 1);

        let test_x = matrix(&[4.0, 5.0]);
        let metrics = evaluate(&trained, &test_x, &[9.0, 11.0]).unwrap();
        assert!(metrics.mse < 1e-12);
        assert!((metrics.r2 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_rejects_length_mismatch() {
        let x = matrix(&[0.0, 1.0]);
        let result = ModelTrainer::new(RidgeRegression::new(1.0)).fit(&x, &[1.0]);
        assert!(matches!(result, Err(Error::DimensionMismatch(_))));
    }

    #[test]
    fn test_evaluate_rejects_wrong_width() {
        let x = matrix(&[0.0, 1.0, 2.0]);
        let trained = ModelTrainer::new(RidgeRegression::new(1.0))
            .fit(&x, &[0.0, 1.0, 2.0])
            .unwrap();
        let wide = FeatureMatrix::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![0.0, 0.0]],
        )
        .unwrap();
        assert!(matches!(
            evaluate(&trained, &wide, &[1.0]),
            Err(Error::DimensionMismatch(_))
        ));
    }
}
