use codelore_insight::{
    ArchitectureSummary, FileInsight, InsightError, SelectionChange, SelectionController,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{FetchError, Result};
use crate::orchestrator::{AnalysisBundle, FetchOrchestrator, RefreshScope};

/// Assembled data of one successful run. Never patched, only replaced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub repository: String,
    pub scope: RefreshScope,
    pub insights: Arc<[FileInsight]>,
    pub architecture: Option<ArchitectureSummary>,
    pub diagram_source: Option<String>,
}

impl Snapshot {
    pub fn from_bundle(bundle: &AnalysisBundle) -> Self {
        Self {
            repository: bundle.repository.clone(),
            scope: bundle.scope,
            insights: bundle.assemble().into(),
            architecture: bundle.architecture_summary(),
            diagram_source: bundle.diagram_source().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Idle,
    Loading {
        repository: String,
    },
    Loaded(Snapshot),
    Failed(FetchError),
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Proof that a run was started. Completing with a ticket from an older
/// generation is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct SessionTicket {
    generation: u64,
    repository: String,
}

impl SessionTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }
}

/// Lifetime of one analyzed repository's data plus the selection over it.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    generation: u64,
    state: SessionState,
    selection: SelectionController,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        match &self.state {
            SessionState::Loaded(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// The current collection; empty unless loaded.
    pub fn insights(&self) -> &[FileInsight] {
        self.snapshot().map_or(&[][..], |snapshot| &snapshot.insights[..])
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionController {
        &mut self.selection
    }

    /// Toggle selection of a path in the loaded collection.
    pub fn select(&mut self, path: &str) -> std::result::Result<SelectionChange, InsightError> {
        let insights: &[FileInsight] = match &self.state {
            SessionState::Loaded(snapshot) => &snapshot.insights[..],
            _ => &[],
        };
        self.selection.select_in(insights, path)
    }

    pub fn selected(&self) -> Option<&FileInsight> {
        self.selection.selected_in(self.insights())
    }

    /// Start a run. Any earlier ticket becomes stale and the selection is
    /// cleared.
    pub fn begin(&mut self, repository: &str) -> SessionTicket {
        self.generation += 1;
        let repository = repository.trim().to_string();
        log::info!("Analyzing {repository} (run {})", self.generation);
        self.selection.reset();
        self.state = SessionState::Loading {
            repository: repository.clone(),
        };
        SessionTicket {
            generation: self.generation,
            repository,
        }
    }

    /// Apply the outcome of a run. Returns `false` when the ticket is stale
    /// and nothing changed.
    pub fn complete(&mut self, ticket: SessionTicket, result: Result<AnalysisBundle>) -> bool {
        if ticket.generation != self.generation {
            log::warn!(
                "Ignoring stale result for {} (run {}, current {})",
                ticket.repository,
                ticket.generation,
                self.generation
            );
            return false;
        }

        self.state = match result {
            Ok(bundle) => {
                let snapshot = Snapshot::from_bundle(&bundle);
                log::info!(
                    "Loaded {} files for {}",
                    snapshot.insights.len(),
                    snapshot.repository
                );
                SessionState::Loaded(snapshot)
            }
            Err(err) => {
                log::info!("Analysis of {} failed: {}", ticket.repository, err.detail());
                SessionState::Failed(err)
            }
        };
        true
    }

    /// Drop the collection and selection, and invalidate any run in flight.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = SessionState::Idle;
        self.selection.reset();
        log::info!("Session reset");
    }

    /// Begin, fetch and complete in one step.
    pub async fn analyze(
        &mut self,
        orchestrator: &FetchOrchestrator,
        repository: &str,
        scope: RefreshScope,
    ) -> &SessionState {
        let ticket = self.begin(repository);
        let result = orchestrator.fetch(ticket.repository(), scope).await;
        self.complete(ticket, result);
        &self.state
    }
}
