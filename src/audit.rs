//! Denial audit log
//!
//! Every access denial raised by the sandboxed gateway is recorded here so
//! embedders can review what scripts tried to reach.

use crate::policy::{CallerContext, TrustLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::RwLock;

/// A single recorded denial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// When the denial happened
    pub timestamp: DateTime<Utc>,
    /// Fully-qualified name the caller asked for
    pub name: String,
    /// Trust level of the caller
    pub trust: TrustLevel,
    /// Caller origin label, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl AuditEntry {
    /// Create an entry stamped with the current time
    pub fn denied(name: impl Into<String>, caller: &CallerContext) -> Self {
        Self {
            timestamp: Utc::now(),
            name: name.into(),
            trust: caller.trust,
            origin: caller.origin.clone(),
        }
    }
}

/// Thread-safe audit log with bounded capacity
///
/// A capacity of 0 disables recording.
pub struct AuditLog {
    entries: RwLock<VecDeque<AuditEntry>>,
    max_entries: usize,
}

impl AuditLog {
    /// Create a new audit log with the given capacity
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            max_entries,
        }
    }

    /// Record an entry, evicting the oldest when full
    pub fn log(&self, entry: AuditEntry) {
        if self.max_entries == 0 {
            return;
        }
        let Ok(mut entries) = self.entries.write() else {
            tracing::error!("Audit log lock poisoned, dropping audit entry");
            return;
        };
        if entries.len() >= self.max_entries {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// All entries, oldest first
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .read()
            .map(|e| e.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Entries recorded for a specific caller origin
    pub fn entries_for_origin(&self, origin: &str) -> Vec<AuditEntry> {
        self.entries
            .read()
            .map(|e| {
                e.iter()
                    .filter(|entry| entry.origin.as_deref() == Some(origin))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of recorded entries
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of retained entries
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// Drop all entries
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new(1000)
    }
}
