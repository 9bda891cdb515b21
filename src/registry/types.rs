use image::DynamicImage;
use std::fmt;
use std::path::Path;
use uuid::Uuid;

use super::RegistryError;
use crate::placement::Dimensions;

/// Session-unique identifier of an uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(Uuid);

impl ImageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ImageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A file handed over by the host, with the MIME type it reported.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension.
    pub async fn from_path(path: &Path) -> Result<Self, RegistryError> {
        let bytes = tokio::fs::read(path).await?;
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        Ok(Self {
            name,
            mime_type,
            bytes,
        })
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.trim().to_lowercase().starts_with("image/")
    }
}

#[derive(Debug, Clone)]
pub enum DecodeState {
    Ready(DynamicImage),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ImageEntry {
    pub id: ImageId,
    pub source: SourceFile,
    pub state: DecodeState,
}

impl ImageEntry {
    pub fn name(&self) -> &str {
        &self.source.name
    }

    pub fn image(&self) -> Option<&DynamicImage> {
        match &self.state {
            DecodeState::Ready(image) => Some(image),
            DecodeState::Failed(_) => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.image().is_some()
    }

    /// Natural pixel size, once decoded.
    pub fn dimensions(&self) -> Option<Dimensions> {
        self.image()
            .map(|image| Dimensions::new(image.width(), image.height()))
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.state {
            DecodeState::Failed(reason) => Some(reason),
            DecodeState::Ready(_) => None,
        }
    }
}
