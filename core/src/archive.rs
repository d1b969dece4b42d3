//! Append-only store of completed iterations

use crate::metrics::IterationResult;
use crate::solution::RoutePlan;
use serde::{Deserialize, Serialize};

/// One archived iteration: its result, the full solution and the optional
/// road-network visualization payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// Iteration result
    pub result: IterationResult,
    /// Full solver output, kept for re-display
    pub solution: RoutePlan,
    /// Visualization payload, when it could be fetched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<serde_json::Value>,
}

/// Ordered archive of a run's iterations
///
/// Entries are only ever appended; an archived entry is never modified or
/// reordered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultArchive {
    entries: Vec<ArchiveEntry>,
}

impl ResultArchive {
    /// Create an empty archive
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return a reference to it
    pub fn append(&mut self, entry: ArchiveEntry) -> &ArchiveEntry {
        debug_assert_eq!(
            entry.result.index,
            self.entries.len() + 1,
            "iterations are archived in order"
        );
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Number of archived iterations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been archived
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry by 0-based position
    pub fn get(&self, position: usize) -> Option<&ArchiveEntry> {
        self.entries.get(position)
    }

    /// Entry by 1-based iteration index
    pub fn iteration(&self, index: usize) -> Option<&ArchiveEntry> {
        index.checked_sub(1).and_then(|p| self.entries.get(p))
    }

    /// Most recently archived entry
    pub fn last(&self) -> Option<&ArchiveEntry> {
        self.entries.last()
    }

    /// Iterate over entries in iteration order
    pub fn iter(&self) -> impl Iterator<Item = &ArchiveEntry> {
        self.entries.iter()
    }

    /// Iterate over the results only
    pub fn results(&self) -> impl Iterator<Item = &IterationResult> {
        self.entries.iter().map(|e| &e.result)
    }

    /// Primary metric series in iteration order
    pub fn metrics(&self) -> Vec<f64> {
        self.results().map(|r| r.primary_metric).collect()
    }
}
