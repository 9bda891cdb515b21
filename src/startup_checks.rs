use crate::Config;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Failed to create output directory: {0}")]
    OutputDirectoryCreationFailed(#[from] std::io::Error),

    #[error("Required file missing: {0}")]
    RequiredFileMissing(String),

    #[error("Image limit must be at least 1")]
    NoImageCapacity,
}

impl StartupCheckError {
    /// Critical failures stop the run; the rest only degrade the output.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            StartupCheckError::OutputDirectoryCreationFailed(_) | StartupCheckError::NoImageCapacity
        )
    }
}

pub async fn perform_startup_checks(config: &Config) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    let output_dir = &config.export.output_directory;
    if !output_dir.exists() {
        info!("Output directory does not exist, creating: {:?}", output_dir);
        if let Err(e) = tokio::fs::create_dir_all(output_dir).await {
            error!("Failed to create output directory: {}", e);
            errors.push(StartupCheckError::OutputDirectoryCreationFailed(e));
        } else {
            info!("Output directory created successfully");
        }
    } else {
        info!("Output directory exists: {:?}", output_dir);
    }

    let font_path = &config.render.font_path;
    if font_path.exists() {
        info!("Watermark font found: {:?}", font_path);
    } else {
        warn!("Watermark font missing: {:?}", font_path);
        errors.push(StartupCheckError::RequiredFileMissing(
            font_path.display().to_string(),
        ));
    }

    if config.registry.max_files == 0 {
        error!("registry.max_files is 0, no image can be loaded");
        errors.push(StartupCheckError::NoImageCapacity);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
