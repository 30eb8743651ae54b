use thiserror::Error;

pub type Result<T> = std::result::Result<T, InsightError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InsightError {
    #[error("File not found in analysis: {0}")]
    UnknownPath(String),

    #[error("Details view requires a selected file")]
    NoSelection,

    #[error("Unknown view: {0} (expected timeline, architecture or details)")]
    InvalidView(String),
}
