use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid definition JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid mapping entry '{entry}': expected SYSTEM=COLUMN")]
    InvalidMapping { entry: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
