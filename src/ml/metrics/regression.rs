//! 回帰モデル評価のためのメトリクス

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Held-out evaluation of a regressor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// 決定係数
    pub r2: f64,
    /// 平均二乗誤差
    pub mse: f64,
}

impl RegressionMetrics {
    /// 真の値と予測値から両方のメトリクスを計算
    pub fn compute(y_true: &[f64], y_pred: &[f64]) -> Result<Self> {
        Ok(RegressionMetrics {
            r2: r2_score(y_true, y_pred)?,
            mse: mean_squared_error(y_true, y_pred)?,
        })
    }
}

fn check_lengths(y_true: &[f64], y_pred: &[f64]) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(Error::DimensionMismatch(format!(
            "真の値と予測値の長さが一致しません: {} vs {}",
            y_true.len(),
            y_pred.len()
        )));
    }

    if y_true.is_empty() {
        return Err(Error::InvalidOperation(
            "空のデータで計算することはできません".to_string(),
        ));
    }
    Ok(())
}

/// 平均二乗誤差（Mean Squared Error）を計算
///
/// # Arguments
/// * `y_true` - 真の値
/// * `y_pred` - 予測値
///
/// # Returns
/// * `Result<f64>` - 平均二乗誤差
pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let sum_squared_error = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&true_val, &pred_val)| {
            let error = true_val - pred_val;
            error * error
        })
        .sum::<f64>();

    Ok(sum_squared_error / y_true.len() as f64)
}

/// 決定係数（R^2 score）を計算
///
/// # Arguments
/// * `y_true` - 真の値
/// * `y_pred` - 予測値
///
/// # Returns
/// * `Result<f64>` - 決定係数（1が最高、悪化すると負の値になり得る）
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    // 真の値の平均を計算
    let y_mean = y_true.iter().sum::<f64>() / y_true.len() as f64;

    // 全変動（total sum of squares）を計算
    let ss_tot = y_true
        .iter()
        .map(|&true_val| {
            let diff = true_val - y_mean;
            diff * diff
        })
        .sum::<f64>();

    // 残差平方和（residual sum of squares）を計算
    let ss_res = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&true_val, &pred_val)| {
            let error = true_val - pred_val;
            error * error
        })
        .sum::<f64>();

    // ss_totが0の場合（全てのy_trueが同じ値）
    if ss_tot == 0.0 {
        if ss_res == 0.0 {
            Ok(1.0)
        } else {
            Ok(0.0)
        }
    } else {
        Ok(1.0 - (ss_res / ss_tot))
    }
}
