use thiserror::Error;

use super::ImageId;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image not found: {0}")]
    NotFound(ImageId),
}
