//! # CodeLore Diagram
//!
//! Turns graph-description text (Mermaid) into SVG for the architecture and
//! dependency views.
//!
//! [`DiagramRenderer`] owns one visible surface. Each call to
//! [`DiagramRenderer::render`] supersedes every earlier call, and a failed
//! render keeps its source so callers can show it as text instead.
//!
//! ```text
//! source ──> DiagramRenderer ──> DiagramBackend (MermaidCli) ──> normalize_svg
//!                  │                                                  │
//!                  └──────────── commit if still latest <─────────────┘
//! ```

mod backend;
mod error;
mod normalize;
mod renderer;

pub use backend::{DiagramBackend, MermaidCli};
pub use error::{DiagramError, Result};
pub use normalize::normalize_svg;
pub use renderer::{DiagramRenderer, DiagramState, RenderOutcome};
