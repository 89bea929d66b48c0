use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata of the resume file as reported by the file hosting api.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeMetadata {
    pub name: String,
    pub size: Option<u64>,
    pub modified_time: Option<DateTime<Utc>>,
    pub mime_type: Option<String>,
}

/// Progress of a running resume download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    pub loaded: u64,
    /// Total size announced by the server, if any.
    pub total: Option<u64>,
}

impl DownloadProgress {
    /// Returns the completed percentage, or `None` if the total size is
    /// unknown.
    pub fn percent(&self) -> Option<f64> {
        self.total
            .filter(|&total| total > 0)
            .map(|total| (self.loaded as f64 / total as f64) * 100.0)
    }
}
