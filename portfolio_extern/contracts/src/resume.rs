use std::future::Future;

use portfolio_models::resume::{DownloadProgress, ResumeMetadata};
use thiserror::Error;
use url::Url;

/// Access to the resume stored on the file hosting service.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ResumeApiService: Send + Sync + 'static {
    fn get_metadata(&self) -> impl Future<Output = Result<ResumeMetadata, ResumeError>> + Send;

    /// Download the file, calling `on_progress` after every received chunk.
    fn download<F>(&self, on_progress: F) -> impl Future<Output = Result<Vec<u8>, ResumeError>> + Send
    where
        F: FnMut(DownloadProgress) + Send + 'static;

    /// Public link that downloads the file in a browser without an api key.
    fn direct_download_url(&self) -> Result<Url, ResumeError>;
}

#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("Resume download is not configured.")]
    NotConfigured,
    #[error("Resume file not found.")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockResumeApiService {
    pub fn with_get_metadata(mut self, result: ResumeMetadata) -> Self {
        self.expect_get_metadata()
            .once()
            .return_once(move || Box::pin(std::future::ready(Ok(result))));
        self
    }
}
