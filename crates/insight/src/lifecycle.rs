use codelore_protocol::{ChangeType, LifecycleStatsRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::timeline::parse_timestamp;
use crate::types::ChangeRecord;

/// Aggregate change statistics of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleStats {
    pub created_at: String,
    pub last_modified_at: String,
    pub total_commits: u64,
    pub total_additions: u64,
    pub total_deletions: u64,
    /// additions - deletions, may be negative
    pub net_changes: i64,
    /// Distinct change types observed, in enum order
    pub change_types: Vec<ChangeType>,
}

impl LifecycleStats {
    pub fn from_record(record: &LifecycleStatsRecord) -> Self {
        let change_types: BTreeSet<ChangeType> = record.change_types.iter().copied().collect();
        Self {
            created_at: record.created_at.clone(),
            last_modified_at: record.last_modified.clone(),
            total_commits: record.total_commits,
            total_additions: record.total_additions,
            total_deletions: record.total_deletions,
            net_changes: record.net_changes,
            change_types: change_types.into_iter().collect(),
        }
    }

    /// Derive stats from a history. `None` for an empty history.
    ///
    /// When every timestamp parses, the oldest and newest entries bound the
    /// lifetime. Otherwise the delivery order (newest first) is trusted.
    pub fn from_history(history: &[ChangeRecord]) -> Option<Self> {
        let newest = history.first()?;
        let oldest = history.last()?;

        let parsed: Option<Vec<_>> = history
            .iter()
            .map(|change| parse_timestamp(&change.timestamp).map(|ts| (ts, change)))
            .collect();
        let (created_at, last_modified_at) = match parsed {
            Some(parsed) => {
                let first = parsed.iter().min_by_key(|(ts, _)| *ts).map(|(_, c)| c);
                let last = parsed.iter().max_by_key(|(ts, _)| *ts).map(|(_, c)| c);
                (
                    first.map_or_else(String::new, |c| c.timestamp.clone()),
                    last.map_or_else(String::new, |c| c.timestamp.clone()),
                )
            }
            None => (oldest.timestamp.clone(), newest.timestamp.clone()),
        };

        let total_additions = history
            .iter()
            .fold(0u64, |total, c| total.saturating_add(c.additions));
        let total_deletions = history
            .iter()
            .fold(0u64, |total, c| total.saturating_add(c.deletions));
        let change_types: BTreeSet<ChangeType> = history.iter().map(|c| c.change_type).collect();

        Some(Self {
            created_at,
            last_modified_at,
            total_commits: history.len() as u64,
            total_additions,
            total_deletions,
            net_changes: signed_delta(total_additions, total_deletions),
            change_types: change_types.into_iter().collect(),
        })
    }
}

fn signed_delta(additions: u64, deletions: u64) -> i64 {
    let additions = i64::try_from(additions).unwrap_or(i64::MAX);
    let deletions = i64::try_from(deletions).unwrap_or(i64::MAX);
    additions.saturating_sub(deletions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn change(ts: &str, kind: ChangeType, add: u64, del: u64) -> ChangeRecord {
        ChangeRecord {
            commit_id: format!("sha-{ts}"),
            timestamp: ts.to_string(),
            author: "dev".to_string(),
            summary: "msg".to_string(),
            change_type: kind,
            additions: add,
            deletions: del,
        }
    }

    #[test]
    fn empty_history_has_no_stats() {
        assert_eq!(LifecycleStats::from_history(&[]), None);
    }

    #[test]
    fn huge_line_counts_saturate() {
        let history = vec![
            change("2024-01-02T00:00:00Z", ChangeType::Modified, u64::MAX, 1),
            change("2024-01-01T00:00:00Z", ChangeType::Added, u64::MAX, 0),
        ];
        let stats = LifecycleStats::from_history(&history).unwrap();
        assert_eq!(stats.total_additions, u64::MAX);
        assert_eq!(stats.total_deletions, 1);
        assert_eq!(stats.net_changes, i64::MAX - 1);
    }

    #[test]
    fn derives_totals_and_bounds() {
        let history = vec![
            change("2024-03-01T10:00:00+00:00", ChangeType::Modified, 5, 20),
            change("2024-01-01T10:00:00+00:00", ChangeType::Added, 10, 0),
            change("2024-02-01T10:00:00+00:00", ChangeType::Modified, 1, 1),
        ];
        let stats = LifecycleStats::from_history(&history).unwrap();
        assert_eq!(stats.created_at, "2024-01-01T10:00:00+00:00");
        assert_eq!(stats.last_modified_at, "2024-03-01T10:00:00+00:00");
        assert_eq!(stats.total_commits, 3);
        assert_eq!(stats.total_additions, 16);
        assert_eq!(stats.total_deletions, 21);
        assert_eq!(stats.net_changes, -5);
        assert_eq!(
            stats.change_types,
            vec![ChangeType::Added, ChangeType::Modified]
        );
    }

    #[test]
    fn unparseable_timestamps_use_delivery_order() {
        let history = vec![
            change("yesterday", ChangeType::Modified, 1, 0),
            change("long ago", ChangeType::Added, 1, 0),
        ];
        let stats = LifecycleStats::from_history(&history).unwrap();
        assert_eq!(stats.created_at, "long ago");
        assert_eq!(stats.last_modified_at, "yesterday");
    }

    #[test]
    fn record_change_types_are_deduplicated() {
        let record = LifecycleStatsRecord {
            change_types: vec![ChangeType::Modified, ChangeType::Added, ChangeType::Modified],
            net_changes: 3,
            ..Default::default()
        };
        let stats = LifecycleStats::from_record(&record);
        assert_eq!(
            stats.change_types,
            vec![ChangeType::Added, ChangeType::Modified]
        );
        assert_eq!(stats.net_changes, 3);
    }
}
