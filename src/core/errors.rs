use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid surface size: {0}")]
    SurfaceSize(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
