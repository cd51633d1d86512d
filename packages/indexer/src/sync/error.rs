use thiserror::Error;

use crate::utils::format::join_values;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Here are the following available years: {}", join_values(.available, ","))]
    YearNotAvailable { year: i32, available: Vec<i32> },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Unexpected error: {0}")]
    Other(String),
}

impl SyncError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<anyhow::Error> for SyncError {
    fn from(e: anyhow::Error) -> Self {
        Self::Other(e.to_string())
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}
