//! Bounded, append-only audit history.
//!
//! The store is owned by the caller and handed to the orchestrator, which
//! appends one entry per run. Scoring never reads it. Once `capacity` entries
//! are held, each append evicts the oldest one.

use crate::ReportStatus;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub input_chars: usize,
    pub status: ReportStatus,
    pub total_enhancement_factor: f64,
    /// Engines that contributed a result.
    pub engines: Vec<String>,
    pub domain: Option<String>,
}

/// Thread-safe: appends are serialized by a `parking_lot::Mutex`.
#[derive(Debug)]
pub struct HistoryStore {
    capacity: usize,
    entries: Mutex<VecDeque<HistoryEntry>>,
}

impl HistoryStore {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        HistoryStore { capacity, entries: Mutex::new(VecDeque::with_capacity(capacity)) }
    }

    pub fn append(&self, entry: HistoryEntry) {
        let mut entries = self.entries.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Copy of the retained entries, oldest first.
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
