use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("You need to spend more ETH")]
    InsufficientContribution,
    #[error("FundMe__NotOwner")]
    NotOwner,
    #[error("Transfer to {0} failed")]
    TransferFailed(String),
    #[error("Funder index {index} out of range (funders: {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Invalid price feed answer: {0}")]
    InvalidPrice(String),
    #[error("Arithmetic overflow")]
    Overflow,
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Deployment mismatch: {0}")]
    DeploymentMismatch(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Internal error: {0}")]
    InternalError(#[from] Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for LedgerError {
    fn from(err: rocksdb::Error) -> Self {
        LedgerError::InternalError(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
