//! 線形回帰モデル
//!
//! Ridge regression solved in closed form. Features and target are centered
//! before solving, so the intercept is not penalized.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ml::matrix::FeatureMatrix;
use crate::ml::models::{check_prediction_input, check_training_data, Regressor};

/// リッジ回帰モデル
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RidgeRegression {
    /// L2正則化の強さ
    alpha: f64,
    /// 回帰係数
    coefficients: Vec<f64>,
    /// 切片
    intercept: f64,
    /// 学習済みかどうか
    fitted: bool,
}

impl RidgeRegression {
    /// 新しいリッジ回帰モデルを作成
    pub fn new(alpha: f64) -> Self {
        RidgeRegression {
            alpha,
            coefficients: Vec::new(),
            intercept: 0.0,
            fitted: false,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// 係数を取得
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// 切片を取得
    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Regressor for RidgeRegression {
    fn fit(&mut self, x: &FeatureMatrix, y: &[f64]) -> Result<()> {
        check_training_data(x, y)?;
        if !(self.alpha >= 0.0) {
            return Err(Error::InvalidInput(format!(
                "alpha must be non-negative, got {}",
                self.alpha
            )));
        }

        let n = x.n_rows() as f64;
        let p = x.n_cols();
        let rows = x.rows();

        let mut x_mean = vec![0.0; p];
        for row in rows {
            for (m, v) in x_mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        x_mean.iter_mut().for_each(|m| *m /= n);
        let y_mean = y.iter().sum::<f64>() / n;

        // (XcᵀXc + αI) w = Xcᵀyc
        let mut gram = vec![vec![0.0; p]; p];
        let mut rhs = vec![0.0; p];
        let mut centered = vec![0.0; p];
        for (row, &target) in rows.iter().zip(y) {
            for j in 0..p {
                centered[j] = row[j] - x_mean[j];
            }
            let yc = target - y_mean;
            for j in 0..p {
                let cj = centered[j];
                if cj == 0.0 {
                    continue;
                }
                rhs[j] += cj * yc;
                for k in j..p {
                    gram[j][k] += cj * centered[k];
                }
            }
        }
        for j in 0..p {
            for k in 0..j {
                gram[j][k] = gram[k][j];
            }
            gram[j][j] += self.alpha;
        }

        let coefficients = solve(gram, rhs)?;
        self.intercept = y_mean
            - coefficients
                .iter()
                .zip(&x_mean)
                .map(|(w, m)| w * m)
                .sum::<f64>();
        self.coefficients = coefficients;
        self.fitted = true;
        Ok(())
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        check_prediction_input(self.fitted, self.coefficients.len(), x)?;
        Ok(x.rows()
            .iter()
            .map(|row| {
                self.intercept
                    + row
                        .iter()
                        .zip(&self.coefficients)
                        .map(|(v, w)| v * w)
                        .sum::<f64>()
            })
            .collect())
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }

    fn name(&self) -> &'static str {
        "ridge"
    }
}

/// Gaussian elimination with partial pivoting
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    let scale = a
        .iter()
        .flat_map(|r| r.iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
        .max(1.0);

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() <= 1e-12 * scale {
            return Err(Error::ComputationError(
                "singular system; use a positive alpha".to_string(),
            ));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut w = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * w[k]).sum();
        w[row] = (b[row] - tail) / a[row][row];
    }
    Ok(w)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<f64>>) -> FeatureMatrix {
        let n = rows[0].len();
        let names = (0..n).map(|i| format!("f{}", i)).collect();
        FeatureMatrix::new(names, rows).unwrap()
    }

    #[test]
    fn test_ols_recovers_exact_line() {
        let x = matrix(vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![2.0, 2.0],
            vec![3.0, 1.0],
        ]);
        // y = 1 + 2a - b
        let y = vec![0.0, 3.0, 3.0, 6.0];
        let mut model = RidgeRegression::new(0.0);
        model.fit(&x, &y).unwrap();

        assert!((model.intercept() - 1.0).abs() < 1e-9);
        assert!((model.coefficients()[0] - 2.0).abs() < 1e-9);
        assert!((model.coefficients()[1] + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_penalty_shrinks_coefficients() {
        let x = matrix(vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]]);
        let y = vec![0.0, 2.0, 4.0, 6.0];

        let mut ols = RidgeRegression::new(0.0);
        let mut ridge = RidgeRegression::new(5.0);
        ols.fit(&x, &y).unwrap();
        ridge.fit(&x, &y).unwrap();

        // Σxc² = 5, Σxc·yc = 10 → w = 10 / (5 + 5)
        assert!((ols.coefficients()[0] - 2.0).abs() < 1e-12);
        assert!((ridge.coefficients()[0] - 1.0).abs() < 1e-12);
        // the fitted line still passes through the means
        assert!((ridge.intercept() - (3.0 - 1.5)).abs() < 1e-12);
    }

    #[test]
    fn test_collinear_without_penalty_is_singular() {
        let x = matrix(vec![vec![1.0, 2.0], vec![2.0, 4.0], vec![3.0, 6.0]]);
        let mut model = RidgeRegression::new(0.0);
        assert!(matches!(
            model.fit(&x, &[1.0, 2.0, 3.0]),
            Err(Error::ComputationError(_))
        ));

        let mut ridge = RidgeRegression::new(1.0);
        assert!(ridge.fit(&x, &[1.0, 2.0, 3.0]).is_ok());
    }

    #[test]
    fn test_negative_alpha_rejected() {
        let x = matrix(vec![vec![1.0], vec![2.0]]);
        let mut model = RidgeRegression::new(-1.0);
        assert!(matches!(
            model.fit(&x, &[1.0, 2.0]),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_predict_before_fit() {
        let x = matrix(vec![vec![1.0]]);
        let model = RidgeRegression::new(1.0);
        assert!(matches!(model.predict(&x), Err(Error::InvalidOperation(_))));
    }
}
