use thiserror::Error;

/// Errors that can occur while running the recipes job
#[derive(Error, Debug)]
pub enum EtlError {
    /// Failed to download the source document
    #[error("Failed to fetch source: {0}")]
    FetchError(#[from] reqwest::Error),

    /// Failed to read or write a local file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Source document is not a collection of recipe records
    #[error("Failed to parse recipes: {0}")]
    ParseError(String),

    /// Failed to assemble the columnar batch
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Failed to encode or decode the parquet file
    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),
}
