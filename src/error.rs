use crate::normalize::PackageKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrewError {
    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned {status} for {url}")]
    Upstream {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("No {kind} found for '{token}'")]
    NotFound { kind: PackageKind, token: String },

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Error: {0}")]
    Other(#[from] anyhow::Error),
}

impl BrewError {
    /// True when the upstream answered but has no such package.
    ///
    /// Detail views render a "no data" state for this instead of an error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BrewError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, BrewError>;
