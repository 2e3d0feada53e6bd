mod parquet_sink;

pub use self::parquet_sink::{read_parquet, to_record_batch, ParquetSink};

use crate::error::EtlError;
use crate::model::EnrichedRecipe;
use async_trait::async_trait;
use std::path::PathBuf;

/// Destination for the enriched records
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Human readable location, used in logs
    fn describe(&self) -> String;

    /// Persist all records, replacing whatever was there before.
    ///
    /// Returns the location that was written.
    async fn write(&self, records: &[EnrichedRecipe]) -> Result<PathBuf, EtlError>;
}
