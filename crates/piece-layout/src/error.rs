use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("manifest root is not a JSON object")]
    NotAnObject,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
