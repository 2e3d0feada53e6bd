use super::RecipeSource;
use crate::error::EtlError;
use async_trait::async_trait;
use log::info;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;

/// Downloads the recipe document over HTTP(S)
pub struct HttpSource {
    client: Client,
    url: String,
    download_path: Option<PathBuf>,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, EtlError> {
        let timeout = timeout.unwrap_or(Duration::from_secs(30));
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("recipes-etl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            download_path: None,
        })
    }

    /// Keep a copy of the downloaded document at `path`
    pub fn download_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.download_path = Some(path.into());
        self
    }
}

#[async_trait]
impl RecipeSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<String, EtlError> {
        info!("Downloading {}", self.url);
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        let body = response.text().await?;

        if let Some(path) = &self.download_path {
            fs::write(path, &body).await?;
            info!("Saved {} bytes to {}", body.len(), path.display());
        }

        Ok(body)
    }
}
