//! End-to-end training workflow
//!
//! Ingestion (read, clean, split), transformation (fit on train, apply to
//! test) and training (fit, evaluate on test). Each stage takes its inputs
//! by reference and returns new values; artifacts are written to the paths
//! in [`PipelineConfig`] when `persist_artifacts` is set.

use std::path::Path;

use log::info;

use crate::config::PipelineConfig;
use crate::dataset::{Cleaner, PartitionPair, Partitioner, RawTable};
use crate::error::{Error, Result, UnseenCategory};
use crate::io::{read_dataset_csv, read_json, read_raw_csv, write_dataset_csv, write_json};
use crate::ml::metrics::RegressionMetrics;
use crate::ml::models::build_regressor;
use crate::ml::pipeline::log_unseen;
use crate::ml::{
    evaluate, ColumnTransformer, FeatureMatrix, ModelTrainer, Transformer, TransformerState,
};

/// Matrices and targets produced by the transformation stage
#[derive(Debug, Clone)]
pub struct TransformationOutput {
    pub train: FeatureMatrix,
    pub test: FeatureMatrix,
    pub train_target: Vec<f64>,
    pub test_target: Vec<f64>,
    pub state: TransformerState,
    /// Test values whose category was never seen in train
    pub unseen: Vec<UnseenCategory>,
}

/// Result of a full run
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    pub metrics: RegressionMetrics,
    pub n_train: usize,
    pub n_test: usize,
    pub n_features: usize,
    pub test_predictions: Vec<f64>,
    pub test_target: Vec<f64>,
}

/// Drives the pipeline with one explicit configuration
#[derive(Debug, Clone)]
pub struct TrainingWorkflow {
    config: PipelineConfig,
    cleaner: Cleaner,
    partitioner: Partitioner,
}

impl TrainingWorkflow {
    /// Validate `config` and build the stages from it
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let partitioner = Partitioner::from_config(&config.split)?;
        Ok(TrainingWorkflow {
            config,
            cleaner: Cleaner::new(),
            partitioner,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Clean and split a raw table, writing data/train/test CSVs if configured
    pub fn ingest(&self, raw: &RawTable) -> Result<PartitionPair> {
        info!("Entered the data ingestion method");
        let cleaned = self.cleaner.clean(raw)?;

        let paths = &self.config.ingestion;
        if paths.persist_artifacts {
            write_dataset_csv(&cleaned, &paths.raw_data_path)?;
            info!("Saved cleaned data to {}", paths.raw_data_path.display());
        }

        info!("Train test split initiated");
        let partitions = self.partitioner.split(&cleaned)?;

        if paths.persist_artifacts {
            write_dataset_csv(&partitions.train, &paths.train_data_path)?;
            write_dataset_csv(&partitions.test, &paths.test_data_path)?;
            info!(
                "Saved train/test data to {} and {}",
                paths.train_data_path.display(),
                paths.test_data_path.display()
            );
        }

        info!("Ingestion of the data is completed");
        Ok(partitions)
    }

    /// Read the configured source file, then [`ingest`](Self::ingest) it
    pub fn ingest_from_source(&self) -> Result<PartitionPair> {
        let source = &self.config.ingestion.source_path;
        info!("Reading raw data from {}", source.display());
        let raw = read_raw_csv(source)?;
        self.ingest(&raw)
    }

    /// Fit the column transformer on train and apply it to both partitions
    pub fn transform(&self, partitions: &PartitionPair) -> Result<TransformationOutput> {
        info!("Data transformation initiated");
        let mut transformer = ColumnTransformer::from_config(&self.config.transformation);
        let train = transformer.fit_transform(&partitions.train)?;

        let applied = transformer.transform_with_warnings(&partitions.test)?;
        log_unseen(&applied.unseen);

        let state = transformer.into_state().ok_or_else(|| {
            Error::TransformerState("transformer has no state after fitting".to_string())
        })?;

        let transformation = &self.config.transformation;
        if self.config.ingestion.persist_artifacts {
            write_json(&state, &transformation.preprocessor_path)?;
            info!(
                "Saved preprocessing object to {}",
                transformation.preprocessor_path.display()
            );
        }

        Ok(TransformationOutput {
            train,
            test: applied.matrix,
            train_target: partitions.train.target(),
            test_target: partitions.test.target(),
            state,
            unseen: applied.unseen,
        })
    }

    /// Transform previously persisted train/test CSVs
    pub fn transform_from_paths<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        train_path: P,
        test_path: Q,
    ) -> Result<TransformationOutput> {
        let partitions = PartitionPair {
            train: read_dataset_csv(train_path)?,
            test: read_dataset_csv(test_path)?,
        };
        info!("Read train and test data completed");
        self.transform(&partitions)
    }

    /// Load the persisted transformer state into a ready-to-use transformer
    pub fn load_transformer(&self) -> Result<ColumnTransformer> {
        let transformation = &self.config.transformation;
        let state: TransformerState = read_json(&transformation.preprocessor_path)?;
        ColumnTransformer::from_config(transformation).with_state(state)
    }

    /// Fit the configured regressor and evaluate it on the test matrix
    pub fn train(&self, data: &TransformationOutput) -> Result<WorkflowOutcome> {
        info!("Model training initiated");
        let trained = ModelTrainer::new(build_regressor(&self.config.model))
            .fit(&data.train, &data.train_target)?;

        let metrics = evaluate(&trained, &data.test, &data.test_target)?;
        let test_predictions = trained.predict(&data.test)?;

        Ok(WorkflowOutcome {
            metrics,
            n_train: data.train.n_rows(),
            n_test: data.test.n_rows(),
            n_features: data.train.n_cols(),
            test_predictions,
            test_target: data.test_target.clone(),
        })
    }

    /// Full run on the configured source file
    pub fn run(&self) -> Result<WorkflowOutcome> {
        let partitions = self.ingest_from_source()?;
        self.finish(&partitions)
    }

    /// Full run on an in-memory raw table
    pub fn run_on(&self, raw: &RawTable) -> Result<WorkflowOutcome> {
        let partitions = self.ingest(raw)?;
        self.finish(&partitions)
    }

    fn finish(&self, partitions: &PartitionPair) -> Result<WorkflowOutcome> {
        let transformed = self.transform(partitions)?;
        self.train(&transformed)
    }
}
