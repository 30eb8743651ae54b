use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

use crate::types::{ChangeRecord, FileInsight};

/// Parse a commit timestamp as the service emits it.
///
/// Accepts RFC 3339 and the space-separated `YYYY-MM-DD HH:MM:SS±hh:mm`
/// form; naive timestamps are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
        if let Ok(ts) = DateTime::parse_from_str(raw, format) {
            return Some(ts.with_timezone(&Utc));
        }
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts.and_utc());
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineEntry<'a> {
    pub path: &'a str,
    pub change: &'a ChangeRecord,
}

/// Every change of every file, most recent first.
///
/// Entries with equal or unparseable timestamps keep delivery order;
/// unparseable ones sort after all dated entries.
pub fn recent_changes(collection: &[FileInsight], limit: Option<usize>) -> Vec<TimelineEntry<'_>> {
    let mut entries: Vec<(Option<DateTime<Utc>>, TimelineEntry<'_>)> = collection
        .iter()
        .flat_map(|file| {
            file.history.iter().map(move |change| {
                (
                    parse_timestamp(&change.timestamp),
                    TimelineEntry {
                        path: file.path.as_str(),
                        change,
                    },
                )
            })
        })
        .collect();

    entries.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let iter = entries.into_iter().map(|(_, entry)| entry);
    match limit {
        Some(limit) => iter.take(limit).collect(),
        None => iter.collect(),
    }
}
