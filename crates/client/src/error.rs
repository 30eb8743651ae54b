use codelore_protocol::Endpoint;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FetchError>;

/// Why an analysis run produced no collection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Please enter a repository URL")]
    EmptyRepository,

    /// Connection failures and non-success statuses. The detail is logged,
    /// not displayed.
    #[error("Failed to analyze repository")]
    Transport { endpoint: Endpoint, detail: String },

    /// The service answered with `{ "error": ... }`.
    #[error("{0}")]
    Source(String),

    #[error("Unexpected {} response: {detail}", .endpoint.as_str())]
    Decode { endpoint: Endpoint, detail: String },

    #[error("HTTP client setup failed: {0}")]
    Setup(String),
}

impl FetchError {
    pub(crate) fn transport(endpoint: Endpoint, detail: impl std::fmt::Display) -> Self {
        let detail = detail.to_string();
        log::warn!("{} request failed: {detail}", endpoint.as_str());
        Self::Transport { endpoint, detail }
    }

    /// Full diagnostic text, including transport details hidden by `Display`.
    pub fn detail(&self) -> String {
        match self {
            Self::Transport { endpoint, detail } => {
                format!("{} ({}: {detail})", self, endpoint.as_str())
            }
            other => other.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}
