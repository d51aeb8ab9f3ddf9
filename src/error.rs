use thiserror::Error;

/// Errors raised by the model publishing pipeline.
///
/// Every stage fails fast: the first error aborts the whole publish and any
/// artifacts already written (staging directory, partial archive) are left
/// on disk for inspection.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("model {0} supports no known persistence capability")]
    UnsupportedModel(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Upload error: {0}")]
    Upload(#[from] crate::transport::TransportError),
}

impl From<zip::result::ZipError> for PublishError {
    fn from(err: zip::result::ZipError) -> Self {
        PublishError::Archive(err.to_string())
    }
}

/// Result type alias for publishing operations.
pub type Result<T> = std::result::Result<T, PublishError>;
