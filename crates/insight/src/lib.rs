//! # CodeLore Insight
//!
//! Client-side view model for repository analysis results.
//!
//! ## Features
//!
//! - **Assembly** - merge per-file roles, history and connections into one view model per path
//! - **Filtering** - deterministic search + category filtering
//! - **Selection** - which file and view are active
//! - **Timeline** - changes across files, most recent first
//! - **Export** - flat Markdown summary of an analysis
//!
//! ## Architecture
//!
//! ```text
//! file_roles ─┐
//! evolution  ─┼──> ViewModelAssembler ──> Vec<FileInsight>
//! deps       ─┘                               │
//!                                              ├──> FileFilter (search AND category)
//!                                              ├──> SelectionController
//!                                              ├──> recent_changes (timeline)
//!                                              └──> export_summary
//! ```

mod assembler;
mod error;
pub mod export;
mod filter;
mod lifecycle;
pub mod presentation;
mod selection;
mod timeline;
mod types;

pub use assembler::{AssemblyStats, ViewModelAssembler};
pub use error::{InsightError, Result};
pub use export::{export_summary, file_details_text, EXPORT_FILE_NAME};
pub use filter::{
    by_category, by_search, categories, filter_files, CategoryFilter, FileFilter, FilterSummary,
};
pub use lifecycle::LifecycleStats;
pub use selection::{ActiveView, Selection, SelectionChange, SelectionController};
pub use timeline::{parse_timestamp, recent_changes, TimelineEntry};
pub use types::{
    ArchitectureSummary, Category, ChangeRecord, Complexity, Connections, FileInsight, FileRole,
    KeyFile,
};

pub use codelore_protocol::ChangeType;
