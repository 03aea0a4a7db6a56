use std::fmt;

use thiserror::Error;

/// Errors raised by the cleaning, transformation and training stages
#[derive(Error, Debug)]
pub enum Error {
    /// A text field did not match the pattern it has no fallback for
    #[error("Parse error in column '{column}': cannot parse {value:?} ({reason})")]
    Parse {
        column: String,
        value: String,
        reason: String,
    },

    /// An expected column is missing from the input table
    #[error("Schema error: column '{0}' not found")]
    Schema(String),

    /// Transformer used before fitting, or with a state fitted on other columns
    #[error("Transformer state error: {0}")]
    TransformerState(String),

    #[error("I/O error")]
    Io(#[source] std::io::Error),

    #[error("CSV error")]
    Csv(#[source] csv::Error),

    #[error("JSON error")]
    Json(#[source] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Computation error: {0}")]
    ComputationError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn parse(column: &str, value: &str, reason: impl Into<String>) -> Self {
        Error::Parse {
            column: column.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Non-fatal notice: a categorical value seen at apply time that the fitted
/// vocabulary does not contain. It is encoded as an all-zero indicator block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnseenCategory {
    pub column: String,
    pub value: String,
}

impl fmt::Display for UnseenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unseen category {:?} in column '{}' encoded as zeros",
            self.value, self.column
        )
    }
}
