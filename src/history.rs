//! Bounded, newest-first history of completed assessments.
//!
//! Entries are created once, on a successful prediction, and never edited.
//! The only way an entry leaves the store is by being pushed past capacity.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::config::HISTORY_CAPACITY;
use crate::export::format_probability;
use crate::models::{PatientRecord, PredictionResult, RiskLabel};

// ═══════════════════════════════════════════════════════════
// AssessmentId
// ═══════════════════════════════════════════════════════════

/// Creation-ordered identifier: the creation time in epoch milliseconds,
/// bumped when needed so ids stay strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct AssessmentId(u64);

impl AssessmentId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<AssessmentId> for String {
    fn from(id: AssessmentId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for AssessmentId {
    type Error = std::num::ParseIntError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse().map(AssessmentId)
    }
}

// ═══════════════════════════════════════════════════════════
// HistoryEntry
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    id: AssessmentId,
    result: PredictionResult,
    created_at: DateTime<Utc>,
}

/// Compact one-line view of an entry for a history list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub id: String,
    /// Local wall-clock time, `HH:MM`.
    pub time: String,
    /// Local calendar date.
    pub date: String,
    pub age: u8,
    pub bmi: f64,
    pub badge: &'static str,
    pub probability: String,
}

impl HistoryEntry {
    pub fn id(&self) -> AssessmentId {
        self.id
    }

    /// Record snapshot taken when the prediction was requested.
    pub fn record(&self) -> &PatientRecord {
        self.result.record()
    }

    pub fn result(&self) -> &PredictionResult {
        &self.result
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn summary(&self) -> HistorySummary {
        let local = self.created_at.with_timezone(&Local);
        HistorySummary {
            id: self.id.to_string(),
            time: local.format("%H:%M").to_string(),
            date: local.format("%-m/%-d/%Y").to_string(),
            age: self.record().age(),
            bmi: self.record().bmi(),
            badge: self.result.label().badge(),
            probability: format_probability(self.result.probability()),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// AssessmentHistory
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
    pub total: usize,
    pub high_risk: usize,
    pub low_risk: usize,
}

#[derive(Debug, Clone)]
pub struct AssessmentHistory {
    /// Newest first.
    entries: Vec<HistoryEntry>,
    capacity: usize,
    last_id: u64,
}

impl Default for AssessmentHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl AssessmentHistory {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// Store holding at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity + 1),
            capacity,
            last_id: 0,
        }
    }

    /// Prepend a new entry for `result` and drop whatever falls past capacity.
    pub fn record(&mut self, result: PredictionResult, created_at: DateTime<Utc>) -> &HistoryEntry {
        let id = self.next_id(created_at);
        self.entries.insert(
            0,
            HistoryEntry {
                id,
                result,
                created_at,
            },
        );

        if self.entries.len() > self.capacity {
            let evicted = self.entries.split_off(self.capacity);
            tracing::debug!(
                evicted = evicted.len(),
                capacity = self.capacity,
                "History capacity reached, dropped oldest entries"
            );
        }

        &self.entries[0]
    }

    fn next_id(&mut self, created_at: DateTime<Utc>) -> AssessmentId {
        let millis = u64::try_from(created_at.timestamp_millis()).unwrap_or(0);
        let id = millis.max(self.last_id + 1);
        self.last_id = id;
        AssessmentId(id)
    }

    /// Read-only, newest-first view.
    pub fn snapshot(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    pub fn get(&self, id: AssessmentId) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> HistoryStats {
        let high_risk = self
            .entries
            .iter()
            .filter(|e| e.result.label() == RiskLabel::High)
            .count();
        HistoryStats {
            total: self.entries.len(),
            high_risk,
            low_risk: self.entries.len() - high_risk,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
