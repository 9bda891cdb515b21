use image::{DynamicImage, ImageResult};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{DecodeState, ImageEntry, ImageId, ImageRegistry, SourceFile};

/// Outcome of one upload batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UploadReport {
    /// Ids of the committed entries, in batch order.
    pub added: Vec<ImageId>,
    pub skipped_non_image: usize,
    pub dropped_over_capacity: usize,
    pub failed: usize,
}

impl ImageRegistry {
    /// Decode and append a batch of files.
    ///
    /// Non-image files are skipped and anything beyond the remaining capacity
    /// is dropped. Each accepted file is decoded on its own blocking task; the
    /// results are collected in batch order and committed together, so the
    /// registry order never depends on which decode finished first.
    pub async fn upload(&mut self, files: Vec<SourceFile>) -> UploadReport {
        self.upload_with(files, image::load_from_memory).await
    }

    pub(crate) async fn upload_with(
        &mut self,
        files: Vec<SourceFile>,
        decoder: fn(&[u8]) -> ImageResult<DynamicImage>,
    ) -> UploadReport {
        let mut report = UploadReport::default();

        let mut accepted = Vec::new();
        for file in files {
            if file.is_image() {
                accepted.push(file);
            } else {
                debug!(
                    "Skipping non-image file {} ({})",
                    file.name, file.mime_type
                );
                report.skipped_non_image += 1;
            }
        }

        let remaining = self.remaining_capacity();
        if accepted.len() > remaining {
            report.dropped_over_capacity = accepted.len() - remaining;
            debug!(
                "Dropping {} file(s) over the {} image limit",
                report.dropped_over_capacity, self.max_files
            );
            accepted.truncate(remaining);
        }

        if accepted.is_empty() {
            return report;
        }

        let tasks: Vec<(SourceFile, JoinHandle<ImageEntry>)> = accepted
            .into_iter()
            .map(|file| {
                // Name and MIME type stay behind so a crashed decode still has an entry
                let placeholder =
                    SourceFile::new(file.name.clone(), file.mime_type.clone(), Vec::new());
                let task = tokio::task::spawn_blocking(move || decode(file, decoder));
                (placeholder, task)
            })
            .collect();

        let mut batch = Vec::with_capacity(tasks.len());
        for (placeholder, task) in tasks {
            match task.await {
                Ok(entry) => batch.push(entry),
                Err(e) => {
                    warn!("Decoder task for {} failed: {}", placeholder.name, e);
                    batch.push(ImageEntry {
                        id: ImageId::new(),
                        source: placeholder,
                        state: DecodeState::Failed(e.to_string()),
                    });
                }
            }
        }

        report.failed = batch.iter().filter(|entry| !entry.is_ready()).count();
        report.added = self.commit(batch);
        report
    }
}

fn decode(file: SourceFile, decoder: fn(&[u8]) -> ImageResult<DynamicImage>) -> ImageEntry {
    let state = match decoder(&file.bytes) {
        Ok(image) => {
            debug!(
                "Decoded {} ({}x{})",
                file.name,
                image.width(),
                image.height()
            );
            DecodeState::Ready(image)
        }
        Err(e) => {
            warn!("Failed to decode {}: {}", file.name, e);
            DecodeState::Failed(e.to_string())
        }
    };

    ImageEntry {
        id: ImageId::new(),
        source: file,
        state,
    }
}
