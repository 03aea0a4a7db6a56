//! 機械学習機能を提供するモジュール
//!
//! このモジュールは、クリーニング済みのテーブルを特徴量行列に変換し、
//! 回帰モデルを学習・評価するためのパイプラインを提供します。

pub mod matrix;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod trainer;

pub use matrix::FeatureMatrix;
pub use pipeline::{ColumnTransformer, Transformed, Transformer, TransformerState};
pub use trainer::{evaluate, ModelTrainer, TrainedModel};
