use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::debug;

use crate::export::{DownloadSink, ExportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Keeps downloads in memory instead of saving them anywhere.
#[derive(Default)]
pub struct MemorySink {
    downloads: Mutex<Vec<Download>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn downloads(&self) -> Vec<Download> {
        self.downloads.lock().await.clone()
    }
}

#[async_trait]
impl DownloadSink for MemorySink {
    async fn save(&self, filename: &str, bytes: Vec<u8>) -> Result<Option<PathBuf>, ExportError> {
        debug!("Keeping {} ({} bytes) in memory", filename, bytes.len());
        self.downloads.lock().await.push(Download {
            filename: filename.to_string(),
            bytes,
        });
        Ok(None)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
