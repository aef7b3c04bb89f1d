//! Scheduled, one-shot events
//!
//! An event carries an externally supplied effect and a scheduled
//! trigger time. Only the engine triggers events, never an actor, and
//! each fires exactly once at or after its scheduled time. Effects may
//! only mutate the session through the session's own mutation methods.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::error::{Result, SimError};
use crate::core::types::{EventId, Tick};
use crate::evidence::EvidenceCategory;
use crate::session::Session;

/// Externally supplied effect applied when an event fires
pub type EventEffect = Arc<dyn Fn(&mut Session) -> Result<()> + Send + Sync>;

/// A scheduled, one-shot effect on the session
#[derive(Clone)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub description: String,
    pub trigger_time: Tick,
    /// Impact text for content-defined events; persisted so restored
    /// sessions log the same evidence the live session would have
    impact: Option<String>,
    effect: EventEffect,
}

impl Event {
    pub fn new(
        name: &str,
        description: &str,
        trigger_time: Tick,
        effect: EventEffect,
    ) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(SimError::Event("event name is required".to_string()));
        }
        Ok(Self {
            id: EventId::new(),
            name: name.to_string(),
            description: description.to_string(),
            trigger_time,
            impact: None,
            effect,
        })
    }

    pub fn impact(&self) -> Option<&str> {
        self.impact.as_deref()
    }

    /// Content-defined event whose effect records its impact as
    /// evidence. This is the effect shape scenario content uses, and
    /// the only one that survives snapshot/restore.
    pub fn with_impact(
        name: &str,
        description: &str,
        trigger_time: Tick,
        impact: &str,
    ) -> Result<Self> {
        let evidence_name = name.to_string();
        let evidence_impact = impact.to_string();
        let mut event = Self::new(
            name,
            description,
            trigger_time,
            Arc::new(move |session: &mut Session| {
                session.log_evidence(
                    EvidenceCategory::Event,
                    json!({
                        "name": evidence_name,
                        "impact": evidence_impact,
                    }),
                );
                Ok(())
            }),
        )?;
        event.impact = Some(impact.to_string());
        Ok(event)
    }

    /// Fire the event against the session.
    ///
    /// Fails if the clock has not yet reached the scheduled time or if
    /// this event already fired. On success the firing is appended to
    /// evidence.
    pub fn trigger(&self, session: &mut Session) -> Result<()> {
        let now = session.current_time();
        if now < self.trigger_time {
            return Err(SimError::Event(format!(
                "event '{}' cannot fire at {} before its scheduled time {}",
                self.name, now, self.trigger_time
            )));
        }
        let already_fired = session
            .events()
            .iter()
            .any(|r| r.id == self.id && r.triggered_at.is_some());
        if already_fired {
            return Err(SimError::Event(format!(
                "event '{}' has already been triggered",
                self.name
            )));
        }

        (self.effect)(session)?;
        session.mark_event_triggered(self.id)?;
        session.log_evidence(
            EvidenceCategory::Event,
            json!({
                "event_id": self.id,
                "name": self.name,
                "phase": "triggered",
            }),
        );
        Ok(())
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("description", &self.description)
            .field("trigger_time", &self.trigger_time)
            .finish_non_exhaustive()
    }
}

/// Persistable view of an event: everything except the effect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub name: String,
    pub description: String,
    pub trigger_time: Tick,
    pub impact: Option<String>,
    pub triggered_at: Option<Tick>,
}

impl EventRecord {
    pub fn from_event(event: &Event) -> Self {
        Self {
            id: event.id,
            name: event.name.clone(),
            description: event.description.clone(),
            trigger_time: event.trigger_time,
            impact: event.impact.clone(),
            triggered_at: None,
        }
    }
}
