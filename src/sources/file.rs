use super::RecipeSource;
use crate::error::EtlError;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

/// Reads the recipe document from a local file
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RecipeSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<String, EtlError> {
        Ok(fs::read_to_string(&self.path).await?)
    }
}
