use std::sync::Arc;

use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use portfolio_di::Build;
use portfolio_extern_contracts::resume::{ResumeApiService, ResumeError};
use portfolio_models::resume::{DownloadProgress, ResumeMetadata};
use portfolio_utils::trace_instrument;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::http::HttpClient;

const DIRECT_DOWNLOAD_URL: &str = "https://drive.google.com/uc";

#[derive(Debug, Clone, Build)]
pub struct ResumeApiServiceImpl {
    config: ResumeApiServiceConfig,
    #[state]
    client: HttpClient,
}

#[derive(Debug, Clone)]
pub struct ResumeApiServiceConfig {
    /// Base url of the drive api, e.g. `https://www.googleapis.com/drive/v3/`
    pub endpoint: Arc<Url>,
    pub api_key: Option<Arc<str>>,
    pub file_id: Option<Arc<str>>,
}

impl ResumeApiServiceImpl {
    pub fn new(config: ResumeApiServiceConfig, client: HttpClient) -> Self {
        Self { config, client }
    }

    fn file_id(&self) -> Result<&str, ResumeError> {
        self.config
            .file_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(ResumeError::NotConfigured)
    }

    fn api_key(&self) -> Result<&str, ResumeError> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(ResumeError::NotConfigured)
    }

    fn file_url(&self) -> Result<Url, ResumeError> {
        let file_id = self.file_id()?;
        let mut url = (*self.config.endpoint).clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("Invalid resume api endpoint: {}", self.config.endpoint))?
            .pop_if_empty()
            .extend(["files", file_id]);
        Ok(url)
    }

    async fn get(&self, query: &[(&str, &str)]) -> Result<Response, ResumeError> {
        let url = self.file_url()?;
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .context("Failed to send request to resume api")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ResumeError::NotFound);
        }

        response
            .error_for_status()
            .context("Resume api returned an error")
            .map_err(Into::into)
    }
}

impl ResumeApiService for ResumeApiServiceImpl {
    #[trace_instrument(skip(self))]
    async fn get_metadata(&self) -> Result<ResumeMetadata, ResumeError> {
        let key = self.api_key()?;
        let metadata = self
            .get(&[("key", key), ("fields", "name,size,modifiedTime,mimeType")])
            .await?
            .json::<FileMetadata>()
            .await
            .context("Failed to parse resume metadata")?;

        Ok(ResumeMetadata {
            name: metadata.name,
            size: metadata.size.and_then(|size| size.parse().ok()),
            modified_time: metadata.modified_time,
            mime_type: metadata.mime_type,
        })
    }

    #[trace_instrument(skip(self, on_progress))]
    async fn download<F>(&self, mut on_progress: F) -> Result<Vec<u8>, ResumeError>
    where
        F: FnMut(DownloadProgress) + Send + 'static,
    {
        let key = self.api_key()?;
        let mut response = self.get(&[("alt", "media"), ("key", key)]).await?;

        let total = response.content_length();
        debug!(?total, "downloading resume");

        let mut data = Vec::with_capacity(
            total
                .and_then(|total| usize::try_from(total).ok())
                .unwrap_or_default(),
        );
        while let Some(chunk) = response
            .chunk()
            .await
            .context("Failed to download resume")?
        {
            data.extend_from_slice(&chunk);
            on_progress(DownloadProgress {
                loaded: data.len() as u64,
                total,
            });
        }

        Ok(data)
    }

    fn direct_download_url(&self) -> Result<Url, ResumeError> {
        let file_id = self.file_id()?;
        Url::parse_with_params(
            DIRECT_DOWNLOAD_URL,
            [("export", "download"), ("id", file_id)],
        )
        .context("Failed to build direct download url")
        .map_err(Into::into)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileMetadata {
    name: String,
    /// Sent as a string by the api.
    size: Option<String>,
    modified_time: Option<DateTime<Utc>>,
    mime_type: Option<String>,
}
