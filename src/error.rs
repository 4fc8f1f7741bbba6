use thiserror::Error;

/// 服务错误
#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("Dataset is missing required column '{0}'")]
    MissingColumn(String),

    #[error("Dataset {0} contains no usable rows")]
    EmptyDataset(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown waste type: {0}")]
    UnknownWasteType(String),

    #[error("No confident match found for '{0}'")]
    NoMatch(String),

    #[error("Waste type already exists: {0}")]
    DuplicateWasteType(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for AdvisorError {
    fn from(e: config::ConfigError) -> Self {
        AdvisorError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AdvisorError>;
