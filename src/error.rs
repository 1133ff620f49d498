use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("invalid image: {0}")]
    InvalidImage(String),
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("model not found: {0}")]
    ModelNotFound(String),
    #[error("failed to fetch {url}: {reason}")]
    NetworkFetch { url: String, reason: String },
    #[error("{} not found", .0.display())]
    ImageNotFound(PathBuf),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ndarray::ShapeError> for DetectError {
    fn from(err: ndarray::ShapeError) -> Self {
        DetectError::ShapeMismatch(err.to_string())
    }
}

impl DetectError {
    /// Wraps any ONNX Runtime failure. `ort` builder errors carry the builder
    /// as a type parameter, so this goes through `Display` rather than `From`.
    pub fn inference<E: std::fmt::Display>(err: E) -> Self {
        DetectError::Inference(err.to_string())
    }
}
