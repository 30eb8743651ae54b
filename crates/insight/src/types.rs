use codelore_protocol::{
    ArchitectureResponse, ArchitectureStats, ChangeLogEntry, ChangeType, DependencyRecord,
    FileRoleRecord, ImportKind, ProjectDetails,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

use crate::lifecycle::LifecycleStats;

/// Closed set of file categories assigned by the analysis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    UiComponent,
    FrontendUtility,
    StateManagement,
    FrontendLogic,
    ApiEndpoint,
    DataModel,
    BusinessLogic,
    BackendUtility,
    BackendLogic,
    Configuration,
    Documentation,
    Test,
    Styling,
    Other,
}

impl Category {
    pub const ALL: [Category; 14] = [
        Category::UiComponent,
        Category::FrontendUtility,
        Category::StateManagement,
        Category::FrontendLogic,
        Category::ApiEndpoint,
        Category::DataModel,
        Category::BusinessLogic,
        Category::BackendUtility,
        Category::BackendLogic,
        Category::Configuration,
        Category::Documentation,
        Category::Test,
        Category::Styling,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::UiComponent => "UI Component",
            Self::FrontendUtility => "Frontend Utility",
            Self::StateManagement => "State Management",
            Self::FrontendLogic => "Frontend Logic",
            Self::ApiEndpoint => "API Endpoint",
            Self::DataModel => "Data Model",
            Self::BusinessLogic => "Business Logic",
            Self::BackendUtility => "Backend Utility",
            Self::BackendLogic => "Backend Logic",
            Self::Configuration => "Configuration",
            Self::Documentation => "Documentation",
            Self::Test => "Test",
            Self::Styling => "Styling",
            Self::Other => "Other",
        }
    }

    /// Exact label lookup.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.label() == label)
    }

    /// Lenient lookup for wire data: unknown labels become [`Category::Other`].
    pub fn from_wire(label: &str) -> Self {
        Self::from_label(label.trim()).unwrap_or(Self::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&label))
    }
}

/// Ordinal complexity label.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    #[default]
    Low,
    Medium,
    High,
}

impl Complexity {
    pub fn from_wire(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "medium" => Self::Medium,
            "high" => Self::High,
            _ => Self::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// What a file is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRole {
    /// Free-text role description (e.g., "Exposes REST API endpoints")
    pub description: String,
    pub category: Category,
    pub complexity: Complexity,
    /// Function names in source order
    pub key_functions: Vec<String>,
    /// Raw dependency names reported by the role analyzer
    pub dependencies: Vec<String>,
    /// One-line summary used by listings and the export document
    pub summary: String,
}

impl FileRole {
    pub fn from_record(path: &str, record: &FileRoleRecord) -> Self {
        let category = Category::from_wire(&record.category);
        let summary = match record.summary.as_deref().map(str::trim) {
            Some(summary) if !summary.is_empty() => summary.to_string(),
            _ if !record.role.trim().is_empty() => {
                format!("{} – {}", file_name(path), record.role.trim())
            }
            _ => format!("{} – {}", file_name(path), category),
        };

        Self {
            description: record.role.clone(),
            category,
            complexity: Complexity::from_wire(&record.complexity),
            key_functions: record.key_functions.clone(),
            dependencies: record.dependencies.clone(),
            summary,
        }
    }

    /// Role for a path the role analyzer did not report.
    pub fn placeholder(path: &str) -> Self {
        Self {
            description: String::new(),
            category: Category::Other,
            complexity: Complexity::Low,
            key_functions: Vec::new(),
            dependencies: Vec::new(),
            summary: format!("{} – Source code file", file_name(path)),
        }
    }
}

/// One entry of a file's commit history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub commit_id: String,
    pub timestamp: String,
    pub author: String,
    pub summary: String,
    pub change_type: ChangeType,
    pub additions: u64,
    pub deletions: u64,
}

impl ChangeRecord {
    pub fn short_id(&self) -> &str {
        match self.commit_id.char_indices().nth(8) {
            Some((idx, _)) => &self.commit_id[..idx],
            None => &self.commit_id,
        }
    }
}

impl From<&ChangeLogEntry> for ChangeRecord {
    fn from(entry: &ChangeLogEntry) -> Self {
        Self {
            commit_id: entry.commit_sha.clone(),
            timestamp: entry.timestamp.clone(),
            author: entry.author.clone(),
            summary: entry.summary.clone(),
            change_type: entry.change_type,
            additions: entry.additions,
            deletions: entry.deletions,
        }
    }
}

/// Import relationships of one file within the repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connections {
    pub imports_internal: BTreeSet<String>,
    pub imported_by: BTreeSet<String>,
}

impl Connections {
    pub fn from_record(record: &DependencyRecord) -> Self {
        Self {
            imports_internal: record
                .imports
                .iter()
                .filter(|import| import.kind == ImportKind::Internal)
                .map(|import| import.module.clone())
                .collect(),
            imported_by: record.imported_by.iter().cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.imports_internal.is_empty() && self.imported_by.is_empty()
    }
}

/// Assembled per-file view model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInsight {
    pub path: String,
    pub role: FileRole,
    /// Newest first, as delivered
    pub history: Vec<ChangeRecord>,
    pub connections: Connections,
    pub lifecycle: Option<LifecycleStats>,
}

impl FileInsight {
    pub fn name(&self) -> &str {
        file_name(&self.path)
    }

    pub fn extension(&self) -> Option<&str> {
        let name = self.name();
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
            _ => None,
        }
    }

    pub fn category(&self) -> Category {
        self.role.category
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFile {
    pub path: String,
    pub role: FileRole,
}

/// Project-level aggregate, independent of per-file connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureSummary {
    pub repo: String,
    pub project_summary: String,
    pub details: ProjectDetails,
    pub stats: ArchitectureStats,
    pub key_files: Vec<KeyFile>,
    /// Opaque graph-description text for the diagram renderer
    pub diagram_source: String,
}

impl ArchitectureSummary {
    pub fn from_response(response: &ArchitectureResponse) -> Self {
        Self {
            repo: response.repo.clone(),
            project_summary: response.project_summary.clone(),
            details: response.project_details.clone(),
            stats: response.architecture_stats,
            key_files: response
                .key_files
                .iter()
                .map(|(path, record)| KeyFile {
                    path: path.to_string(),
                    role: FileRole::from_record(path, record),
                })
                .collect(),
            diagram_source: response.mermaid_diagram.clone(),
        }
    }
}

pub(crate) fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty())
        .unwrap_or(path)
}
