use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Image encoding error: {0}")]
    EncodeError(#[from] image::ImageError),

    #[error("Download sink error: {0}")]
    SinkError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
