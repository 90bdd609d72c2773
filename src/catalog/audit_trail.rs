//! Catalog audit trail.
//!
//! - Append-only log of committed events (no deletion)
//! - Chronological ordering via timestamp
//! - Stored in `CatalogState`, so a log entry commits together with its change
//! - Query interface for the `audit` operator command

use super::address::Address;
use super::events::{CatalogEvent, EventKind};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current unix time in seconds. A clock before the epoch reads as 0.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Single audit log entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unix timestamp (seconds since epoch).
    pub timestamp: u64,
    pub event: CatalogEvent,
}

impl AuditEntry {
    pub fn new(event: CatalogEvent, timestamp: u64) -> Self {
        Self { timestamp, event }
    }
}

/// Query options for the audit log.
#[derive(Debug, Clone)]
pub struct AuditQuery {
    /// Filter by event kind.
    pub kind: Option<EventKind>,
    /// Filter by actor.
    pub actor: Option<Address>,
    /// Limit number of results (most recent first).
    pub limit: Option<usize>,
    /// Only show entries after this timestamp.
    pub after_timestamp: Option<u64>,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            kind: None,
            actor: None,
            limit: Some(50),
            after_timestamp: None,
        }
    }
}

/// Query audit log with filters.
///
/// Returns entries most recent first. Entries sharing a timestamp keep
/// reverse log order.
pub fn query_audit_log(entries: &[AuditEntry], query: &AuditQuery) -> Vec<AuditEntry> {
    let mut filtered: Vec<AuditEntry> = entries
        .iter()
        .rev()
        .filter(|entry| {
            if let Some(kind) = query.kind {
                if entry.event.kind != kind {
                    return false;
                }
            }

            if let Some(ref actor) = query.actor {
                if &entry.event.actor != actor {
                    return false;
                }
            }

            if let Some(after_ts) = query.after_timestamp {
                if entry.timestamp <= after_ts {
                    return false;
                }
            }

            true
        })
        .cloned()
        .collect();

    // Stable sort keeps reverse log order within a second.
    filtered.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    if let Some(limit) = query.limit {
        filtered.truncate(limit);
    }

    filtered
}

/// Format audit log for terminal display.
pub fn format_audit_log(entries: &[AuditEntry]) -> String {
    if entries.is_empty() {
        return "No audit entries found.".to_string();
    }

    let mut output = String::from("Catalog Audit Trail\n\n");
    for entry in entries {
        output.push_str(&format!("[{}] {}\n", entry.timestamp, entry.event));
    }

    output.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::events::EventKey;

    fn entry(kind: EventKind, actor: u64, timestamp: u64) -> AuditEntry {
        AuditEntry::new(
            CatalogEvent::new(kind, EventKey::Entry("ExampleNFT".into()), Address::from(actor)),
            timestamp,
        )
    }

    #[test]
    fn test_query_filter_by_kind() {
        let entries = vec![
            entry(EventKind::EntryAdded, 1, 10),
            entry(EventKind::EntryRemoved, 1, 20),
            entry(EventKind::EntryAdded, 1, 30),
        ];

        let query = AuditQuery {
            kind: Some(EventKind::EntryAdded),
            ..Default::default()
        };

        let result = query_audit_log(&entries, &query);
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|e| e.event.kind == EventKind::EntryAdded));
    }

    #[test]
    fn test_query_filter_by_actor() {
        let entries = vec![
            entry(EventKind::EntryAdded, 1, 10),
            entry(EventKind::EntryAdded, 2, 20),
        ];

        let query = AuditQuery {
            actor: Some(Address::from(2)),
            ..Default::default()
        };

        let result = query_audit_log(&entries, &query);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].event.actor, Address::from(2));
    }

    #[test]
    fn test_query_most_recent_first_with_limit() {
        let entries = vec![
            entry(EventKind::EntryAdded, 1, 10),
            entry(EventKind::ProposalCreated, 1, 30),
            entry(EventKind::EntryRemoved, 1, 20),
        ];

        let query = AuditQuery {
            limit: Some(2),
            ..Default::default()
        };

        let result = query_audit_log(&entries, &query);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].timestamp, 30);
        assert_eq!(result[1].timestamp, 20);
    }

    #[test]
    fn test_query_same_timestamp_keeps_reverse_log_order() {
        let entries = vec![
            entry(EventKind::ProposalCreated, 1, 5),
            entry(EventKind::ProposalApproved, 1, 5),
        ];

        let result = query_audit_log(&entries, &AuditQuery::default());
        assert_eq!(result[0].event.kind, EventKind::ProposalApproved);
        assert_eq!(result[1].event.kind, EventKind::ProposalCreated);
    }

    #[test]
    fn test_query_after_timestamp() {
        let entries = vec![
            entry(EventKind::EntryAdded, 1, 100),
            entry(EventKind::EntryAdded, 1, 150),
            entry(EventKind::EntryAdded, 1, 190),
        ];

        let query = AuditQuery {
            after_timestamp: Some(140),
            ..Default::default()
        };

        let result = query_audit_log(&entries, &query);
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|e| e.timestamp > 140));
    }

    #[test]
    fn test_query_no_limit() {
        let entries: Vec<AuditEntry> = (0..100)
            .map(|i| entry(EventKind::EntryAdded, 1, i))
            .collect();

        let query = AuditQuery {
            limit: None,
            ..Default::default()
        };

        assert_eq!(query_audit_log(&entries, &query).len(), 100);
    }

    #[test]
    fn test_format_audit_log() {
        let entries = vec![entry(EventKind::EntryAdded, 1, 10)];
        let formatted = format_audit_log(&entries);
        assert!(formatted.contains("Catalog Audit Trail"));
        assert!(formatted.contains("entry_added entry 'ExampleNFT'"));
    }

    #[test]
    fn test_format_audit_log_empty() {
        assert_eq!(format_audit_log(&[]), "No audit entries found.");
    }
}
