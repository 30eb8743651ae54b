//! # CodeLore Client
//!
//! Talks to the analysis service and holds the analyzed repository.
//!
//! - [`AnalysisSource`] / [`HttpAnalysisSource`]: one method per service endpoint
//! - [`FetchOrchestrator`]: runs the queries of a [`RefreshScope`] concurrently
//!   and yields an [`AnalysisBundle`] or the first error
//! - [`AnalysisSession`]: `Idle | Loading | Loaded | Failed`, guarded by run
//!   generations so late results of abandoned runs are ignored

mod config;
mod error;
mod orchestrator;
mod session;
mod source;

pub use config::{ClientConfig, ConfigFile, ENV_API_URL, ENV_MMDC, ENV_TIMEOUT_SECS};
pub use error::{ConfigError, FetchError, Result};
pub use orchestrator::{AnalysisBundle, FetchOrchestrator, RefreshScope};
pub use session::{AnalysisSession, SessionState, SessionTicket, Snapshot};
pub use source::{AnalysisSource, HttpAnalysisSource};
