pub mod error;
pub mod sinks;

pub use error::*;
pub use sinks::{DirectorySink, Download, MemorySink};

use async_trait::async_trait;
use image::{RgbaImage, codecs::png::PngEncoder};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::compositor::Surface;
use crate::registry::ImageEntry;

pub const DEFAULT_FILENAME_PREFIX: &str = "watermarked-";

/// Receives finished exports. Returns where the file ended up, when the sink
/// knows. Sinks that are not backed by a file report failures as
/// [`ExportError::SinkError`].
#[async_trait]
pub trait DownloadSink: Send + Sync {
    async fn save(&self, filename: &str, bytes: Vec<u8>) -> Result<Option<PathBuf>, ExportError>;
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoActiveImage,
    NotDecoded,
    SurfaceNotDrawn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Skipped(SkipReason),
    Saved {
        filename: String,
        location: Option<PathBuf>,
        size: usize,
    },
}

/// Turns the composited surface into a PNG download.
#[derive(Debug, Clone)]
pub struct Exporter {
    filename_prefix: String,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(DEFAULT_FILENAME_PREFIX)
    }
}

impl Exporter {
    pub fn new(filename_prefix: impl Into<String>) -> Self {
        Self {
            filename_prefix: filename_prefix.into(),
        }
    }

    /// The download name: the original file name with the prefix in front.
    /// The extension is kept as uploaded even though the payload is PNG.
    pub fn filename_for(&self, entry: &ImageEntry) -> String {
        format!("{}{}", self.filename_prefix, entry.name())
    }

    /// Export the surface for `entry`. Nothing is encoded unless there is an
    /// active, decoded image and the surface has been drawn.
    pub async fn export(
        &self,
        entry: Option<&ImageEntry>,
        surface: &Surface,
        sink: &dyn DownloadSink,
    ) -> Result<ExportOutcome, ExportError> {
        let Some(entry) = entry else {
            debug!("Export requested with no active image");
            return Ok(ExportOutcome::Skipped(SkipReason::NoActiveImage));
        };
        if !entry.is_ready() {
            debug!("Export requested for undecoded image {}", entry.name());
            return Ok(ExportOutcome::Skipped(SkipReason::NotDecoded));
        }
        let Some(raster) = surface.raster() else {
            debug!("Export requested before the surface was drawn");
            return Ok(ExportOutcome::Skipped(SkipReason::SurfaceNotDrawn));
        };

        let bytes = encode_png(raster)?;
        let size = bytes.len();
        let filename = self.filename_for(entry);
        let location = sink.save(&filename, bytes).await?;

        info!(
            "Exported {} ({}x{}, {} bytes) via {} sink",
            filename,
            raster.width(),
            raster.height(),
            size,
            sink.name()
        );

        Ok(ExportOutcome::Saved {
            filename,
            location,
            size,
        })
    }
}

pub fn encode_png(raster: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    let encoder = PngEncoder::new(&mut bytes);
    raster.write_with_encoder(encoder)?;
    Ok(bytes)
}
