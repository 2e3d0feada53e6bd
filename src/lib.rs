//! Batch job that keeps the recipes mentioning an ingredient, works out how
//! long each one takes, grades it `Easy`, `Medium` or `Hard`, and stores the
//! result as a parquet file.
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() -> Result<(), recipes_etl::EtlError> {
//! let report = recipes_etl::EtlJob::builder()
//!     .url("https://example.com/recipes.json")
//!     .output("recipes.parquet")
//!     .run()
//!     .await?;
//! println!("wrote {} recipes", report.records_written);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod sinks;
pub mod sources;

pub use builder::{EtlJob, EtlJobBuilder, InputSource, RunReport};
pub use config::EtlConfig;
pub use error::EtlError;
pub use model::{Difficulty, EnrichedRecipe, Recipe};

/// Run the job with configuration from `config.toml` and the environment
pub async fn run_from_config() -> Result<RunReport, EtlError> {
    let config = EtlConfig::load()?;
    log::debug!("{:?}", config);
    EtlJob::from_config(&config).run().await
}
