use sheetbind_common::A1ParseError;
use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("{backend} backend error: {message}")]
    Backend { backend: String, message: String },

    #[error("sheet `{0}` not found")]
    SheetNotFound(String),

    #[error("{0} is not supported by this backend")]
    Unsupported(String),

    #[error("invalid reference: {0}")]
    Reference(#[from] A1ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IoError {
    pub fn from_backend<E: Display>(backend: &str, err: E) -> Self {
        IoError::Backend {
            backend: backend.to_string(),
            message: err.to_string(),
        }
    }
}
