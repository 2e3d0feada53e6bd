use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use log::info;

use crate::config::EtlConfig;
use crate::model::Difficulty;
use crate::pipeline;
use crate::sinks::{ParquetSink, RecordSink};
use crate::sources::{FileSource, HttpSource, JsonSource, RecipeSource};
use crate::EtlError;

/// Represents where the recipe document comes from
#[derive(Debug, Clone)]
pub enum InputSource {
    /// Download the document from a URL
    Url(String),
    /// Read the document from a local file
    File(PathBuf),
    /// Use a document that is already in memory
    Json(String),
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Records decoded from the source
    pub records_loaded: usize,
    /// Records that passed the ingredient filter and were written
    pub records_written: usize,
    /// Number of written records per difficulty tier
    pub difficulty_counts: BTreeMap<Difficulty, usize>,
    /// Location of the parquet file
    pub output_path: PathBuf,
}

impl RunReport {
    pub fn count(&self, difficulty: Difficulty) -> usize {
        self.difficulty_counts
            .get(&difficulty)
            .copied()
            .unwrap_or_default()
    }
}

/// Builder for configuring and executing a job run
#[derive(Debug, Default)]
pub struct EtlJobBuilder {
    source: Option<InputSource>,
    output: Option<PathBuf>,
    ingredient: Option<String>,
    timeout: Option<Duration>,
    download_path: Option<PathBuf>,
}

impl EtlJobBuilder {
    /// Download the recipe document from a URL
    ///
    /// # Example
    /// ```
    /// use recipes_etl::EtlJob;
    ///
    /// let builder = EtlJob::builder()
    ///     .url("https://example.com/recipes.json");
    /// ```
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.source = Some(InputSource::Url(url.into()));
        self
    }

    /// Read the recipe document from a local file
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(InputSource::File(path.into()));
        self
    }

    /// Use an in-memory JSON document
    ///
    /// # Example
    /// ```
    /// use recipes_etl::EtlJob;
    ///
    /// let builder = EtlJob::builder()
    ///     .json(r#"[{"ingredients": "beef", "prepTime": "PT10M"}]"#);
    /// ```
    pub fn json(mut self, document: impl Into<String>) -> Self {
        self.source = Some(InputSource::Json(document.into()));
        self
    }

    /// Set the parquet file to write
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Set the ingredient recipes must mention, `beef` by default
    pub fn ingredient(mut self, ingredient: impl Into<String>) -> Self {
        self.ingredient = Some(ingredient.into());
        self
    }

    /// Set a timeout for the download
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Keep a copy of the downloaded document. Only used with [`url`](Self::url).
    pub fn download_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.download_path = Some(path.into());
        self
    }

    fn into_source(
        source: InputSource,
        timeout: Option<Duration>,
        download_path: Option<PathBuf>,
    ) -> Result<Box<dyn RecipeSource>, EtlError> {
        let source: Box<dyn RecipeSource> = match source {
            InputSource::Url(url) => {
                let http = HttpSource::new(url, timeout)?;
                Box::new(match download_path {
                    Some(path) => http.download_to(path),
                    None => http,
                })
            }
            InputSource::File(path) => Box::new(FileSource::new(path)),
            InputSource::Json(document) => Box::new(JsonSource::new(document)),
        };
        Ok(source)
    }

    /// Load, transform and write the recipes
    ///
    /// # Errors
    /// Returns `EtlError` if:
    /// - No input source or output path was specified
    /// - The source cannot be fetched or decoded
    /// - The parquet file cannot be written
    ///
    /// Nothing is written to the output path unless every step succeeded.
    pub async fn run(self) -> Result<RunReport, EtlError> {
        let source = self.source.ok_or_else(|| {
            EtlError::BuilderError(
                "No input source specified. Use .url(), .file() or .json()".to_string(),
            )
        })?;
        let output = self.output.ok_or_else(|| {
            EtlError::BuilderError("No output path specified. Use .output()".to_string())
        })?;
        let ingredient = self
            .ingredient
            .unwrap_or_else(|| crate::config::DEFAULT_INGREDIENT.to_string());

        let source = Self::into_source(source, self.timeout, self.download_path)?;
        let sink = ParquetSink::new(output);

        info!("Loading recipes from {}", source.describe());
        let records = source.load().await?;
        let records_loaded = records.len();

        let enriched = pipeline::transform(records, &ingredient);
        info!(
            "{} of {} recipes mention '{}'",
            enriched.len(),
            records_loaded,
            ingredient
        );

        let mut difficulty_counts = BTreeMap::new();
        for record in &enriched {
            *difficulty_counts.entry(record.difficulty).or_insert(0) += 1;
        }

        info!("Writing to {}", sink.describe());
        let output_path = sink.write(&enriched).await?;

        let report = RunReport {
            records_loaded,
            records_written: enriched.len(),
            difficulty_counts,
            output_path,
        };
        info!("{:?}", report);
        Ok(report)
    }
}

/// Main entry point for the builder API
pub struct EtlJob;

impl EtlJob {
    /// Creates a new builder for a job run
    ///
    /// # Example
    /// ```
    /// use recipes_etl::EtlJob;
    ///
    /// let builder = EtlJob::builder();
    /// ```
    pub fn builder() -> EtlJobBuilder {
        EtlJobBuilder::default()
    }

    /// Creates a builder from loaded configuration
    ///
    /// A configured `input_path` takes precedence over `source_url`.
    pub fn from_config(config: &EtlConfig) -> EtlJobBuilder {
        let builder = EtlJob::builder()
            .output(&config.output_path)
            .ingredient(&config.ingredient)
            .timeout(Duration::from_secs(config.timeout));

        match (&config.input_path, &config.download_path) {
            (Some(path), _) => builder.file(path),
            (None, Some(download)) => builder.url(&config.source_url).download_to(download),
            (None, None) => builder.url(&config.source_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::read_parquet;

    #[tokio::test]
    async fn test_run_without_source_fails() {
        let result = EtlJob::builder().output("out.parquet").run().await;
        assert!(matches!(result, Err(EtlError::BuilderError(_))));
    }

    #[tokio::test]
    async fn test_run_without_output_fails() {
        let result = EtlJob::builder().json("[]").run().await;
        assert!(matches!(result, Err(EtlError::BuilderError(_))));
    }

    #[tokio::test]
    async fn test_run_inline_document() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("recipes.parquet");

        let report = EtlJob::builder()
            .json(
                r#"[
                {"ingredients": "2 lbs beef, diced", "prepTime": "PT15M", "cookTime": "PT1H"},
                {"ingredients": "chicken breast", "prepTime": "PT10M", "cookTime": "PT20M"},
                {"ingredients": "beef", "prepTime": "PT5M", "cookTime": null}
            ]"#,
            )
            .output(&output)
            .run()
            .await
            .unwrap();

        assert_eq!(report.records_loaded, 3);
        assert_eq!(report.records_written, 2);
        assert_eq!(report.count(Difficulty::Hard), 1);
        assert_eq!(report.count(Difficulty::Easy), 1);
        assert_eq!(report.count(Difficulty::Medium), 0);
        assert_eq!(report.output_path, output);
        assert_eq!(read_parquet(&output).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_custom_ingredient() {
        let dir = tempfile::tempdir().unwrap();
        let report = EtlJob::builder()
            .json("{\"ingredients\": \"lamb shank\"}\n{\"ingredients\": \"beef\"}\n")
            .ingredient("LAMB")
            .output(dir.path().join("lamb.parquet"))
            .run()
            .await
            .unwrap();

        assert_eq!(report.records_written, 1);
    }

    #[tokio::test]
    async fn test_failed_load_leaves_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("recipes.parquet");
        std::fs::write(&output, b"previous").unwrap();

        let result = EtlJob::builder()
            .file(dir.path().join("missing.json"))
            .output(&output)
            .run()
            .await;

        assert!(matches!(result, Err(EtlError::IoError(_))));
        assert_eq!(std::fs::read(&output).unwrap(), b"previous");
    }

    #[test]
    fn test_from_config_prefers_input_path() {
        let config = EtlConfig {
            input_path: Some(PathBuf::from("local.json")),
            ..EtlConfig::default()
        };

        let builder = EtlJob::from_config(&config);
        assert!(matches!(
            builder.source,
            Some(InputSource::File(ref p)) if p == &PathBuf::from("local.json")
        ));
        assert_eq!(builder.output, Some(PathBuf::from("recipes.parquet")));
        assert_eq!(builder.ingredient.as_deref(), Some("beef"));
    }

    #[test]
    fn test_from_config_downloads_by_default() {
        let builder = EtlJob::from_config(&EtlConfig::default());
        assert!(matches!(
            builder.source,
            Some(InputSource::Url(ref u)) if u == crate::config::DEFAULT_SOURCE_URL
        ));
        assert_eq!(builder.download_path, Some(PathBuf::from("recipes.json")));
        assert_eq!(builder.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_from_config_without_download_copy() {
        let config = EtlConfig {
            download_path: None,
            ..EtlConfig::default()
        };

        let builder = EtlJob::from_config(&config);
        assert!(matches!(builder.source, Some(InputSource::Url(_))));
        assert_eq!(builder.download_path, None);
    }
}
