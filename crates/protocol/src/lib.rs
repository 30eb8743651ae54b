use serde::{Deserialize, Deserializer, Serialize};

pub mod path_map;

pub use path_map::PathMap;

/// Query endpoints exposed by the analysis service.
///
/// Every endpoint is a read-only `GET` parameterized by `url=<repository URL>`
/// except [`Endpoint::Health`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Architecture,
    FileRoles,
    Evolution,
    Dependencies,
    Health,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Architecture => "/architecture",
            Self::FileRoles => "/file-roles",
            Self::Evolution => "/evolution",
            Self::Dependencies => "/dependencies",
            Self::Health => "/",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Architecture => "architecture",
            Self::FileRoles => "file_roles",
            Self::Evolution => "evolution",
            Self::Dependencies => "dependencies",
            Self::Health => "health",
        }
    }
}

/// Kind of change a commit applied to a file.
///
/// The service forwards the hosting provider's per-file status as is, so any
/// status other than an addition or removal reads as a modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Added,
    Modified,
    Removed,
}

impl<'de> Deserialize<'de> for ChangeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let status = String::deserialize(deserializer)?;
        Ok(match status.as_str() {
            "added" => Self::Added,
            "removed" | "deleted" => Self::Removed,
            _ => Self::Modified,
        })
    }
}

impl ChangeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// Role analysis for one file, as produced by the service's file analyzer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRoleRecord {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub complexity: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub key_functions: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// One commit touching one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    #[serde(deserialize_with = "null_as_empty")]
    pub commit_sha: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub summary: String,
    pub change_type: ChangeType,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleStatsRecord {
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub last_modified: String,
    #[serde(default)]
    pub total_commits: u64,
    #[serde(default)]
    pub total_additions: u64,
    #[serde(default)]
    pub total_deletions: u64,
    #[serde(default)]
    pub net_changes: i64,
    #[serde(default)]
    pub change_types: Vec<ChangeType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Internal,
    External,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRef {
    pub module: String,
    #[serde(rename = "type")]
    pub kind: ImportKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
    #[serde(default)]
    pub imports: Vec<ImportRef>,
    #[serde(default)]
    pub exports: Vec<String>,
    #[serde(default)]
    pub imported_by: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetails {
    #[serde(rename = "type", default)]
    pub project_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub key_features: Vec<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub structure: serde_json::Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchitectureStats {
    #[serde(default)]
    pub total_files: u64,
    #[serde(default)]
    pub frontend_files: u64,
    #[serde(default)]
    pub backend_files: u64,
    #[serde(default)]
    pub total_imports: u64,
    #[serde(default)]
    pub total_exports: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureResponse {
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub project_summary: String,
    #[serde(default)]
    pub project_details: ProjectDetails,
    #[serde(default)]
    pub key_files: PathMap<FileRoleRecord>,
    #[serde(default)]
    pub dependency_graph: PathMap<DependencyRecord>,
    #[serde(default)]
    pub mermaid_diagram: String,
    #[serde(default)]
    pub architecture_stats: ArchitectureStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRolesResponse {
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub total_files_analyzed: u64,
    #[serde(default)]
    pub file_roles: PathMap<FileRoleRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionResponse {
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo_name: String,
    #[serde(default)]
    pub total_files_tracked: u64,
    #[serde(default)]
    pub file_evolution: PathMap<Vec<ChangeLogEntry>>,
    #[serde(default)]
    pub lifecycle_stats: PathMap<LifecycleStatsRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependenciesResponse {
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub total_files: u64,
    #[serde(default)]
    pub total_imports: u64,
    #[serde(default)]
    pub total_exports: u64,
    #[serde(default)]
    pub dependencies: PathMap<DependencyRecord>,
    #[serde(default)]
    pub mermaid_diagram: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub message: String,
}

/// A response body: either the expected payload or `{ "error": "..." }`.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiReply<T> {
    Success(T),
    Failure(String),
}

impl<T: for<'de> Deserialize<'de>> ApiReply<T> {
    /// Decode a response body. The `error` field wins over any payload
    /// fields sent alongside it.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    pub fn from_value(value: serde_json::Value) -> serde_json::Result<Self> {
        if let Some(message) = reported_error(&value) {
            return Ok(Self::Failure(message));
        }
        serde_json::from_value(value).map(Self::Success)
    }
}

impl<T> ApiReply<T> {
    pub fn into_result(self) -> std::result::Result<T, String> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::Failure(message) => Err(message),
        }
    }
}

fn reported_error(value: &serde_json::Value) -> Option<String> {
    match value.get("error")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}

// Commit metadata from the provider can be `null` (e.g. a deleted author).
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn error_field_is_a_failure() {
        let reply = ApiReply::<FileRolesResponse>::from_slice(br#"{"error":"not found"}"#).unwrap();
        assert_eq!(reply, ApiReply::Failure("not found".to_string()));
    }

    #[test]
    fn null_error_field_is_ignored() {
        let reply =
            ApiReply::<HealthResponse>::from_slice(br#"{"error":null,"message":"live"}"#).unwrap();
        assert_eq!(
            reply.into_result().unwrap(),
            HealthResponse {
                message: "live".to_string()
            }
        );
    }

    #[test]
    fn change_type_aliases() {
        let parsed: Vec<ChangeType> =
            serde_json::from_str(r#"["added","renamed","deleted","removed","modified"]"#)
                .unwrap();
        assert_eq!(
            parsed,
            vec![
                ChangeType::Added,
                ChangeType::Modified,
                ChangeType::Removed,
                ChangeType::Removed,
                ChangeType::Modified,
            ]
        );
    }

    #[test]
    fn unknown_change_status_reads_as_modified() {
        let body = br#"{
            "file_evolution": {
                "src/app.ts": [
                    {"commit_sha": "c1", "change_type": "unchanged"},
                    {"commit_sha": "c0", "change_type": "added"}
                ]
            }
        }"#;
        let evolution = ApiReply::<EvolutionResponse>::from_slice(body)
            .unwrap()
            .into_result()
            .unwrap();
        let history = evolution.file_evolution.get("src/app.ts").unwrap();
        assert_eq!(history[0].change_type, ChangeType::Modified);
        assert_eq!(history[1].change_type, ChangeType::Added);
    }

    #[test]
    fn null_commit_metadata_is_empty() {
        let entry: ChangeLogEntry = serde_json::from_str(
            r#"{"commit_sha": "c1", "timestamp": null, "author": null, "summary": null,
                "change_type": "modified", "additions": 2}"#,
        )
        .unwrap();
        assert_eq!(entry.author, "");
        assert_eq!(entry.timestamp, "");
        assert_eq!(entry.summary, "");
        assert_eq!(entry.additions, 2);

        let missing = serde_json::from_str::<ChangeLogEntry>(r#"{"change_type": "added"}"#);
        assert!(missing.is_err());
    }

    #[test]
    fn decodes_dependencies_payload() {
        let body = br#"{
            "repo": "https://github.com/o/r",
            "dependencies": {
                "src/app.ts": {
                    "imports": [
                        {"module": "./util", "type": "internal"},
                        {"module": "react", "type": "external"},
                        {"module": "?", "type": "dynamic"}
                    ],
                    "exports": ["App"],
                    "imported_by": ["src/index.ts"]
                }
            }
        }"#;
        let deps = ApiReply::<DependenciesResponse>::from_slice(body)
            .unwrap()
            .into_result()
            .unwrap();
        let record = deps.dependencies.get("src/app.ts").unwrap();
        assert_eq!(record.imports[0].kind, ImportKind::Internal);
        assert_eq!(record.imports[1].kind, ImportKind::External);
        assert_eq!(record.imports[2].kind, ImportKind::Unknown);
        assert_eq!(record.imported_by, vec!["src/index.ts".to_string()]);
    }

    #[test]
    fn endpoint_paths() {
        assert_eq!(Endpoint::FileRoles.path(), "/file-roles");
        assert_eq!(Endpoint::Health.path(), "/");
    }
}
