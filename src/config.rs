use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

/// Public location of the open recipes dataset
pub const DEFAULT_SOURCE_URL: &str =
    "https://s3-eu-west-1.amazonaws.com/dwh-test-resources/recipes.json";
pub const DEFAULT_DOWNLOAD_PATH: &str = "recipes.json";
pub const DEFAULT_OUTPUT_PATH: &str = "recipes.parquet";
pub const DEFAULT_INGREDIENT: &str = "beef";

/// Settings for a single job run
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EtlConfig {
    /// Where the recipe document is downloaded from
    #[serde(default = "default_source_url")]
    pub source_url: String,
    /// Read this local file instead of downloading
    #[serde(default, deserialize_with = "optional_path")]
    pub input_path: Option<PathBuf>,
    /// Keep a copy of the downloaded document here; an empty value disables it
    #[serde(default = "default_download_path", deserialize_with = "optional_path")]
    pub download_path: Option<PathBuf>,
    /// Parquet file to write, replaced on every run
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    /// Ingredient a recipe must mention to be kept
    #[serde(default = "default_ingredient")]
    pub ingredient: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            input_path: None,
            download_path: default_download_path(),
            output_path: default_output_path(),
            ingredient: default_ingredient(),
            timeout: default_timeout(),
        }
    }
}

// Default value functions
fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}

fn default_download_path() -> Option<PathBuf> {
    Some(PathBuf::from(DEFAULT_DOWNLOAD_PATH))
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

fn default_ingredient() -> String {
    DEFAULT_INGREDIENT.to_string()
}

fn default_timeout() -> u64 {
    30
}

// An empty path clears a setting that has a default
fn optional_path<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let path = Option::<String>::deserialize(deserializer)?;
    Ok(path.filter(|p| !p.is_empty()).map(PathBuf::from))
}

impl EtlConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPES_ETL__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPES_ETL__OUTPUT_PATH. Setting
    /// `RECIPES_ETL__DOWNLOAD_PATH=""` turns the download copy off.
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// Both layers are optional extras on top of the built-in defaults: with no
/// `config.toml` and no `RECIPES_ETL__*` variables the job runs with the
/// constants above. See [`EtlConfig::load`] for the precedence rules.
pub fn load_config() -> Result<EtlConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        .add_source(
            Environment::with_prefix("RECIPES_ETL")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
