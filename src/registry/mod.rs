// Registry module - owns the uploaded images and tracks the active one
mod error;
mod types;
mod upload;

pub use error::RegistryError;
pub use types::*;
pub use upload::UploadReport;

use tracing::{debug, info};

pub const DEFAULT_MAX_FILES: usize = 5;

/// Ordered, capacity-bounded collection of uploaded images.
#[derive(Debug)]
pub struct ImageRegistry {
    entries: Vec<ImageEntry>,
    active: Option<ImageId>,
    max_files: usize,
}

impl Default for ImageRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILES)
    }
}

impl ImageRegistry {
    pub fn new(max_files: usize) -> Self {
        Self {
            entries: Vec::new(),
            active: None,
            max_files,
        }
    }

    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    pub fn remaining_capacity(&self) -> usize {
        self.max_files.saturating_sub(self.entries.len())
    }

    pub fn get(&self, id: ImageId) -> Option<&ImageEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn active_id(&self) -> Option<ImageId> {
        self.active
    }

    pub fn active(&self) -> Option<&ImageEntry> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn select(&mut self, id: ImageId) -> Result<(), RegistryError> {
        if self.get(id).is_none() {
            return Err(RegistryError::NotFound(id));
        }
        debug!("Selected image {}", id);
        self.active = Some(id);
        Ok(())
    }

    pub fn clear_all(&mut self) {
        info!("Clearing {} image(s)", self.entries.len());
        self.entries.clear();
        self.active = None;
    }

    /// Append decoded entries in order, up to the remaining capacity.
    ///
    /// When nothing is active, the first committed entry that decoded
    /// successfully becomes active. Returns the ids that were kept.
    pub(crate) fn commit(&mut self, batch: Vec<ImageEntry>) -> Vec<ImageId> {
        let remaining = self.remaining_capacity();
        let batch: Vec<ImageEntry> = batch.into_iter().take(remaining).collect();
        let added: Vec<ImageId> = batch.iter().map(|entry| entry.id).collect();

        if self.active.is_none()
            && let Some(first_ready) = batch.iter().find(|entry| entry.is_ready())
        {
            debug!("Activating {} ({})", first_ready.name(), first_ready.id);
            self.active = Some(first_ready.id);
        }

        self.entries.extend(batch);
        info!(
            "Committed {} image(s), {} of {} slots used",
            added.len(),
            self.entries.len(),
            self.max_files
        );
        added
    }
}

#[cfg(test)]
mod tests;
