use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[cfg(feature = "api")]
    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),

    #[error("Preference store error: {0}")]
    Preferences(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
