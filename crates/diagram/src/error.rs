use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DiagramError>;

#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("Renderer failed: {0}")]
    Backend(String),

    #[error("Renderer produced no SVG: {0}")]
    InvalidOutput(String),

    #[error("Renderer timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
