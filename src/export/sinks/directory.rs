use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use super::sanitize_filename;
use crate::export::{DownloadSink, ExportError};

/// Saves downloads as files in a directory, creating it on first use.
pub struct DirectorySink {
    directory: PathBuf,
}

impl DirectorySink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn save(&self, filename: &str, bytes: Vec<u8>) -> Result<Option<PathBuf>, ExportError> {
        tokio::fs::create_dir_all(&self.directory).await?;
        let path = self.directory.join(sanitize_filename(filename));
        tokio::fs::write(&path, &bytes).await?;
        info!("Saved {} bytes to {:?}", bytes.len(), path);
        Ok(Some(path))
    }

    fn name(&self) -> &str {
        "directory"
    }
}
