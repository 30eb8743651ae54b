use codelore_insight::{ArchitectureSummary, FileInsight, ViewModelAssembler};
use codelore_protocol::{
    ArchitectureResponse, DependenciesResponse, Endpoint, EvolutionResponse, FileRolesResponse,
    HealthResponse, PathMap,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::{FetchError, Result};
use crate::source::{AnalysisSource, HttpAnalysisSource};

/// Which view is being refreshed, and therefore which queries run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshScope {
    #[default]
    Explorer,
    Timeline,
    Architecture,
    Dashboard,
}

impl RefreshScope {
    /// Queries in their fixed order. The first failure in this order is the
    /// one reported.
    pub fn endpoints(self) -> &'static [Endpoint] {
        match self {
            Self::Explorer => &[Endpoint::FileRoles, Endpoint::Evolution, Endpoint::Dependencies],
            Self::Timeline => &[Endpoint::Evolution],
            Self::Architecture => &[Endpoint::Architecture],
            Self::Dashboard => &[
                Endpoint::Architecture,
                Endpoint::FileRoles,
                Endpoint::Evolution,
                Endpoint::Dependencies,
            ],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Explorer => "explorer",
            Self::Timeline => "timeline",
            Self::Architecture => "architecture",
            Self::Dashboard => "dashboard",
        }
    }
}

impl fmt::Display for RefreshScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RefreshScope {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "explorer" => Ok(Self::Explorer),
            "timeline" => Ok(Self::Timeline),
            "architecture" => Ok(Self::Architecture),
            "dashboard" => Ok(Self::Dashboard),
            other => Err(format!("unknown scope '{other}'")),
        }
    }
}

/// Raw payloads of one successful run, untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisBundle {
    pub repository: String,
    pub scope: RefreshScope,
    pub architecture: Option<ArchitectureResponse>,
    pub roles: Option<FileRolesResponse>,
    pub evolution: Option<EvolutionResponse>,
    pub dependencies: Option<DependenciesResponse>,
}

impl AnalysisBundle {
    pub fn new(repository: impl Into<String>, scope: RefreshScope) -> Self {
        Self {
            repository: repository.into(),
            scope,
            ..Self::default()
        }
    }

    /// Merge the per-file data sets into view models.
    ///
    /// When only the architecture summary was fetched, its key files and
    /// dependency graph stand in for the role and dependency queries.
    pub fn assemble(&self) -> Vec<FileInsight> {
        let no_roles = PathMap::new();
        let no_history = PathMap::new();
        let no_connections = PathMap::new();

        let roles = match (&self.roles, &self.architecture) {
            (Some(roles), _) => &roles.file_roles,
            (None, Some(architecture)) => &architecture.key_files,
            (None, None) => &no_roles,
        };
        let history = self
            .evolution
            .as_ref()
            .map_or(&no_history, |evolution| &evolution.file_evolution);
        let connections = match (&self.dependencies, &self.architecture) {
            (Some(deps), _) => &deps.dependencies,
            (None, Some(architecture)) => &architecture.dependency_graph,
            (None, None) => &no_connections,
        };

        let mut assembler = ViewModelAssembler::new(roles, history, connections);
        if let Some(evolution) = &self.evolution {
            assembler = assembler.with_lifecycle(&evolution.lifecycle_stats);
        }
        assembler.assemble()
    }

    pub fn architecture_summary(&self) -> Option<ArchitectureSummary> {
        self.architecture.as_ref().map(ArchitectureSummary::from_response)
    }

    /// Graph-description text for the diagram view, preferring the
    /// architecture diagram over the dependency diagram.
    pub fn diagram_source(&self) -> Option<&str> {
        let architecture = self
            .architecture
            .as_ref()
            .map(|a| a.mermaid_diagram.as_str());
        let dependencies = self
            .dependencies
            .as_ref()
            .map(|d| d.mermaid_diagram.as_str());
        architecture
            .into_iter()
            .chain(dependencies)
            .find(|source| !source.trim().is_empty())
    }
}

enum Payload {
    Architecture(ArchitectureResponse),
    FileRoles(FileRolesResponse),
    Evolution(EvolutionResponse),
    Dependencies(DependenciesResponse),
    Health,
}

/// Issues the queries of a [`RefreshScope`] concurrently and combines them.
#[derive(Clone)]
pub struct FetchOrchestrator {
    source: Arc<dyn AnalysisSource>,
}

impl FetchOrchestrator {
    pub fn new(source: Arc<dyn AnalysisSource>) -> Self {
        Self { source }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let source = HttpAnalysisSource::new(config.clone())?;
        Ok(Self::new(Arc::new(source)))
    }

    /// Run every query of `scope` and wait for all of them.
    ///
    /// Any failure discards the whole run; the error reported is the first
    /// one in the scope's query order, not the first to arrive.
    pub async fn fetch(&self, repository: &str, scope: RefreshScope) -> Result<AnalysisBundle> {
        let repository = repository.trim();
        if repository.is_empty() {
            return Err(FetchError::EmptyRepository);
        }

        log::debug!("Fetching {scope} data for {repository}");
        let replies = join_all(
            scope
                .endpoints()
                .iter()
                .map(|&endpoint| self.query(endpoint, repository)),
        )
        .await;

        let mut bundle = AnalysisBundle::new(repository, scope);
        for reply in replies {
            match reply? {
                Payload::Architecture(payload) => bundle.architecture = Some(payload),
                Payload::FileRoles(payload) => bundle.roles = Some(payload),
                Payload::Evolution(payload) => bundle.evolution = Some(payload),
                Payload::Dependencies(payload) => bundle.dependencies = Some(payload),
                Payload::Health => {}
            }
        }
        Ok(bundle)
    }

    pub async fn ping(&self) -> Result<HealthResponse> {
        self.source.ping().await
    }

    async fn query(&self, endpoint: Endpoint, repository: &str) -> Result<Payload> {
        let payload = match endpoint {
            Endpoint::Architecture => {
                Payload::Architecture(self.source.architecture(repository).await?)
            }
            Endpoint::FileRoles => Payload::FileRoles(self.source.file_roles(repository).await?),
            Endpoint::Evolution => Payload::Evolution(self.source.evolution(repository).await?),
            Endpoint::Dependencies => {
                Payload::Dependencies(self.source.dependencies(repository).await?)
            }
            Endpoint::Health => {
                self.source.ping().await?;
                Payload::Health
            }
        };
        Ok(payload)
    }
}

impl fmt::Debug for FetchOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchOrchestrator").finish_non_exhaustive()
    }
}
