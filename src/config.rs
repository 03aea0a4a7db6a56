//! Pipeline configuration
//!
//! Every stage receives its section of [`PipelineConfig`] at construction;
//! nothing reads process-wide defaults. Missing keys fall back to the
//! defaults below when loading from TOML.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dataset::{columns, is_categorical_feature, is_numeric_feature};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub ingestion: IngestionConfig,
    pub split: SplitConfig,
    pub transformation: TransformationConfig,
    pub model: ModelConfig,
}

/// Source file and artifact locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    pub source_path: PathBuf,
    pub raw_data_path: PathBuf,
    pub train_data_path: PathBuf,
    pub test_data_path: PathBuf,
    /// Write the cleaned/train/test tables and the transformer state to disk
    pub persist_artifacts: bool,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        IngestionConfig {
            source_path: Path::new("notebook").join("data").join("laptop_price.csv"),
            raw_data_path: Path::new("artifacts").join("data.csv"),
            train_data_path: Path::new("artifacts").join("train.csv"),
            test_data_path: Path::new("artifacts").join("test.csv"),
            persist_artifacts: true,
        }
    }
}

impl IngestionConfig {
    /// Place all artifacts under `dir`, keeping the default file names
    pub fn with_artifacts_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        let dir = dir.as_ref();
        self.raw_data_path = dir.join("data.csv");
        self.train_data_path = dir.join("train.csv");
        self.test_data_path = dir.join("test.csv");
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub test_ratio: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        SplitConfig {
            test_ratio: 0.2,
            seed: 42,
        }
    }
}

/// Feature columns and where the fitted transformer state goes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformationConfig {
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub preprocessor_path: PathBuf,
}

impl Default for TransformationConfig {
    fn default() -> Self {
        TransformationConfig {
            numeric_columns: columns::NUMERIC_FEATURES.iter().map(|c| c.to_string()).collect(),
            categorical_columns: columns::CATEGORICAL_FEATURES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            preprocessor_path: Path::new("artifacts").join("preprocessor.json"),
        }
    }
}

/// Regressor families the trainer can build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    RandomForest,
    DecisionTree,
    Ridge,
}

impl Default for ModelKind {
    fn default() -> Self {
        ModelKind::RandomForest
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub kind: ModelKind,
    /// Number of trees (random forest only)
    pub n_estimators: usize,
    /// Maximum tree depth (None = no limit)
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split (None = all features)
    pub max_features: Option<usize>,
    /// L2 penalty (ridge only)
    pub alpha: f64,
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            kind: ModelKind::RandomForest,
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            alpha: 1.0,
            seed: 42,
        }
    }
}

impl PipelineConfig {
    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges and column names
    pub fn validate(&self) -> Result<()> {
        let ratio = self.split.test_ratio;
        if !(ratio > 0.0 && ratio < 1.0) {
            return Err(Error::Config(format!(
                "split.test_ratio must be in (0, 1), got {}",
                ratio
            )));
        }

        let t = &self.transformation;
        if t.numeric_columns.is_empty() && t.categorical_columns.is_empty() {
            return Err(Error::Config(
                "transformation needs at least one feature column".to_string(),
            ));
        }
        if let Some(unknown) = t.numeric_columns.iter().find(|c| !is_numeric_feature(c)) {
            return Err(Error::Schema(unknown.clone()));
        }
        if let Some(unknown) = t
            .categorical_columns
            .iter()
            .find(|c| !is_categorical_feature(c))
        {
            return Err(Error::Schema(unknown.clone()));
        }

        let m = &self.model;
        if m.kind == ModelKind::RandomForest && m.n_estimators == 0 {
            return Err(Error::Config("model.n_estimators must be at least 1".to_string()));
        }
        if m.min_samples_split < 2 {
            return Err(Error::Config("model.min_samples_split must be at least 2".to_string()));
        }
        if m.min_samples_leaf == 0 {
            return Err(Error::Config("model.min_samples_leaf must be at least 1".to_string()));
        }
        if m.max_features == Some(0) {
            return Err(Error::Config("model.max_features must be at least 1".to_string()));
        }
        if !(m.alpha >= 0.0) {
            return Err(Error::Config(format!("model.alpha must be >= 0, got {}", m.alpha)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = PipelineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.split.seed, 42);
        assert_eq!(config.transformation.numeric_columns.len(), 6);
        assert_eq!(config.transformation.categorical_columns.len(), 8);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [split]
            seed = 7

            [model]
            kind = "ridge"
            alpha = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.split.seed, 7);
        assert_eq!(config.split.test_ratio, 0.2);
        assert_eq!(config.model.kind, ModelKind::Ridge);
        assert_eq!(config.model.alpha, 0.5);
        assert!(config.ingestion.persist_artifacts);
    }

    #[test]
    fn unknown_column_is_schema_error() {
        let result = PipelineConfig::from_toml_str(
            r#"
            [transformation]
            numeric_columns = ["Inches", "Battery"]
            "#,
        );
        assert!(matches!(result, Err(Error::Schema(c)) if c == "Battery"));
    }

    #[test]
    fn bad_ratio_is_rejected() {
        let result = PipelineConfig::from_toml_str("[split]\ntest_ratio = 1.5\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
