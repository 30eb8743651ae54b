use codelore_protocol::{
    ChangeLogEntry, DependencyRecord, FileRoleRecord, LifecycleStatsRecord, PathMap,
};
use std::collections::HashSet;

use crate::lifecycle::LifecycleStats;
use crate::types::{ChangeRecord, Connections, FileInsight, FileRole};

/// Merges the per-file data sets of one analysis run into view models.
///
/// Each source is keyed by path and looked up independently; a path missing
/// from a source gets that source's empty default. The assembler never
/// mutates its inputs, so assembling twice yields equal results.
pub struct ViewModelAssembler<'a> {
    roles: &'a PathMap<FileRoleRecord>,
    history: &'a PathMap<Vec<ChangeLogEntry>>,
    connections: &'a PathMap<DependencyRecord>,
    lifecycle: Option<&'a PathMap<LifecycleStatsRecord>>,
}

impl<'a> ViewModelAssembler<'a> {
    pub fn new(
        roles: &'a PathMap<FileRoleRecord>,
        history: &'a PathMap<Vec<ChangeLogEntry>>,
        connections: &'a PathMap<DependencyRecord>,
    ) -> Self {
        Self {
            roles,
            history,
            connections,
            lifecycle: None,
        }
    }

    /// Prefer service-computed lifecycle stats over locally derived ones.
    pub fn with_lifecycle(mut self, lifecycle: &'a PathMap<LifecycleStatsRecord>) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    /// Union of all source keys: role keys first, then history keys, then
    /// connection keys, each in document order and without repeats.
    pub fn key_union(&self) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        self.roles
            .keys()
            .chain(self.history.keys())
            .chain(self.connections.keys())
            .filter(|path| seen.insert(*path))
            .collect()
    }

    pub fn assemble(&self) -> Vec<FileInsight> {
        let insights: Vec<FileInsight> = self
            .key_union()
            .into_iter()
            .map(|path| self.assemble_path(path))
            .collect();

        log::debug!(
            "Assembled {} file insights ({} roles, {} histories, {} dependency records)",
            insights.len(),
            self.roles.len(),
            self.history.len(),
            self.connections.len()
        );
        insights
    }

    fn assemble_path(&self, path: &str) -> FileInsight {
        let role = self
            .roles
            .get(path)
            .map(|record| FileRole::from_record(path, record))
            .unwrap_or_else(|| FileRole::placeholder(path));

        let history: Vec<ChangeRecord> = self
            .history
            .get(path)
            .map(|entries| entries.iter().map(ChangeRecord::from).collect())
            .unwrap_or_default();

        let connections = self
            .connections
            .get(path)
            .map(Connections::from_record)
            .unwrap_or_default();

        let lifecycle = self
            .lifecycle
            .and_then(|stats| stats.get(path))
            .map(LifecycleStats::from_record)
            .or_else(|| LifecycleStats::from_history(&history));

        FileInsight {
            path: path.to_string(),
            role,
            history,
            connections,
            lifecycle,
        }
    }

    /// Coverage of the sources over the key union.
    pub fn get_stats(&self) -> AssemblyStats {
        let keys = self.key_union();
        AssemblyStats {
            total_files: keys.len(),
            with_role: keys.iter().filter(|k| self.roles.contains_key(k)).count(),
            with_history: keys.iter().filter(|k| self.history.contains_key(k)).count(),
            with_connections: keys
                .iter()
                .filter(|k| self.connections.contains_key(k))
                .count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyStats {
    pub total_files: usize,
    pub with_role: usize,
    pub with_history: usize,
    pub with_connections: usize,
}
