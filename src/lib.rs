// 特定の警告を無効化
#![allow(clippy::needless_return)]
#![allow(clippy::too_many_arguments)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod io;
pub mod ml;
pub mod workflow;

// Re-export commonly used types
pub use config::{ModelKind, PipelineConfig};
pub use dataset::{Cleaner, Dataset, PartitionPair, Partitioner, RawTable};
pub use error::{Error, Result, UnseenCategory};
pub use ml::{ColumnTransformer, FeatureMatrix, ModelTrainer, Transformer, TransformerState};
pub use workflow::{TrainingWorkflow, WorkflowOutcome};

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
