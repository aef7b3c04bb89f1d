//! Append-only evidence log
//!
//! Evidence is the single source of truth for "what has happened" in a
//! session. Records are never mutated or removed, so rule evaluators
//! query cumulative history instead of relying on hidden mutable
//! flags, and halted sessions remain forensically replayable.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::core::types::Tick;

/// Category tag for an evidence record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EvidenceCategory {
    TimeAdvanced,
    Decision,
    Event,
    Work,
    Resource,
    Session,
    /// Free-form category from a `log` consequence or scenario content
    Custom(String),
}

impl From<String> for EvidenceCategory {
    fn from(s: String) -> Self {
        match s.as_str() {
            "time_advanced" => EvidenceCategory::TimeAdvanced,
            "decision" => EvidenceCategory::Decision,
            "event" => EvidenceCategory::Event,
            "work" => EvidenceCategory::Work,
            "resource" => EvidenceCategory::Resource,
            "session" => EvidenceCategory::Session,
            _ => EvidenceCategory::Custom(s),
        }
    }
}

impl From<EvidenceCategory> for String {
    fn from(category: EvidenceCategory) -> Self {
        category.to_string()
    }
}

impl fmt::Display for EvidenceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvidenceCategory::TimeAdvanced => write!(f, "time_advanced"),
            EvidenceCategory::Decision => write!(f, "decision"),
            EvidenceCategory::Event => write!(f, "event"),
            EvidenceCategory::Work => write!(f, "work"),
            EvidenceCategory::Resource => write!(f, "resource"),
            EvidenceCategory::Session => write!(f, "session"),
            EvidenceCategory::Custom(s) => write!(f, "{}", s),
        }
    }
}

/// One immutable audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceRecord {
    /// Sequence number within the log
    pub id: u64,
    /// Simulation time when the record was appended
    pub tick: Tick,
    pub category: EvidenceCategory,
    pub payload: serde_json::Value,
    /// Wall-clock annotation (unix millis); not simulation truth
    pub recorded_at_ms: u64,
}

/// Ordered, append-only sequence of evidence records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvidenceLog {
    records: Vec<EvidenceRecord>,
    next_id: u64,
}

impl EvidenceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record; returns its sequence id.
    pub fn append(
        &mut self,
        tick: Tick,
        category: EvidenceCategory,
        payload: serde_json::Value,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.records.push(EvidenceRecord {
            id,
            tick,
            category,
            payload,
            recorded_at_ms: wall_clock_ms(),
        });
        id
    }

    pub fn records(&self) -> &[EvidenceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether any record carries the given category
    pub fn has_category(&self, category: &EvidenceCategory) -> bool {
        self.records.iter().any(|r| &r.category == category)
    }

    pub fn by_category<'a>(
        &'a self,
        category: &'a EvidenceCategory,
    ) -> impl Iterator<Item = &'a EvidenceRecord> {
        self.records.iter().filter(move |r| &r.category == category)
    }

    pub fn for_tick(&self, tick: Tick) -> impl Iterator<Item = &EvidenceRecord> {
        self.records.iter().filter(move |r| r.tick == tick)
    }

    /// Rebuild a log from persisted records (snapshot restore path)
    pub fn from_records(records: Vec<EvidenceRecord>) -> Self {
        let next_id = records.iter().map(|r| r.id + 1).max().unwrap_or(0);
        Self { records, next_id }
    }
}

fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_append_assigns_sequential_ids() {
        let mut log = EvidenceLog::new();
        let a = log.append(0, EvidenceCategory::Session, json!({"state": "active"}));
        let b = log.append(1, EvidenceCategory::TimeAdvanced, json!({"to": 1}));
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_has_category() {
        let mut log = EvidenceLog::new();
        log.append(0, EvidenceCategory::Decision, json!({}));
        log.append(
            1,
            EvidenceCategory::Custom("architecture".to_string()),
            json!({"artifact": "system diagram"}),
        );

        assert!(log.has_category(&EvidenceCategory::Decision));
        assert!(log.has_category(&EvidenceCategory::Custom("architecture".to_string())));
        assert!(!log.has_category(&EvidenceCategory::Event));
    }

    #[test]
    fn test_by_category_and_for_tick() {
        let mut log = EvidenceLog::new();
        log.append(3, EvidenceCategory::Work, json!({"title": "a"}));
        log.append(3, EvidenceCategory::Event, json!({"name": "b"}));
        log.append(4, EvidenceCategory::Work, json!({"title": "c"}));

        assert_eq!(log.by_category(&EvidenceCategory::Work).count(), 2);
        assert_eq!(log.for_tick(3).count(), 2);
    }

    #[test]
    fn test_category_string_round_trip() {
        assert_eq!(
            EvidenceCategory::from("time_advanced".to_string()),
            EvidenceCategory::TimeAdvanced
        );
        assert_eq!(
            EvidenceCategory::from("architecture".to_string()),
            EvidenceCategory::Custom("architecture".to_string())
        );
        assert_eq!(EvidenceCategory::Decision.to_string(), "decision");
    }

    #[test]
    fn test_from_records_continues_sequence() {
        let mut log = EvidenceLog::new();
        log.append(0, EvidenceCategory::Session, json!({}));
        log.append(1, EvidenceCategory::Session, json!({}));

        let mut restored = EvidenceLog::from_records(log.records().to_vec());
        let next = restored.append(2, EvidenceCategory::Session, json!({}));
        assert_eq!(next, 2);
    }
}
