//! Session snapshots - plain, nested, immutable values
//!
//! External layers (persistence, presentation) never receive a live
//! session; they get this value instead. `restore` rebuilds a session
//! by replaying stored state verbatim, without re-executing past
//! ticks. Any wire encoding (JSON, binary) is external; adapters must
//! preserve the field set verbatim for faithful restore.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::clock::{SimulationClock, TimeTick};
use crate::core::error::Result;
use crate::core::types::{DecisionId, SessionId, Tick, WorkId};
use crate::decision::{Decision, DecisionOption};
use crate::event::{Event, EventRecord};
use crate::evidence::{EvidenceLog, EvidenceRecord};
use crate::resource::{ResourceCapacity, ResourcePool};
use crate::session::{ScenarioContext, Session, SessionState};
use crate::work::WorkItem;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionSnapshot {
    pub id: DecisionId,
    pub title: String,
    pub context: String,
    pub required_role: Option<String>,
    pub expires_at: Option<Tick>,
    pub priority: u8,
    pub options: Vec<DecisionOption>,
    pub made: bool,
    pub selected_option: Option<String>,
    pub made_at: Option<Tick>,
}

impl DecisionSnapshot {
    fn from_decision(decision: &Decision) -> Self {
        Self {
            id: decision.id,
            title: decision.title.clone(),
            context: decision.context.clone(),
            required_role: decision.required_role.clone(),
            expires_at: decision.expires_at,
            priority: decision.priority,
            options: decision.options().to_vec(),
            made: decision.is_made(),
            selected_option: decision.selected_option().map(str::to_string),
            made_at: decision.made_at(),
        }
    }

    fn into_decision(self) -> Decision {
        Decision::from_parts(
            self.id,
            self.title,
            self.context,
            self.required_role,
            self.expires_at,
            self.priority,
            self.options,
            self.made,
            self.selected_option,
            self.made_at,
        )
    }
}

/// Deep, immutable copy of all session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub industry: String,
    pub role: String,
    pub state: SessionState,
    pub current_time: Tick,
    pub clock_history: Vec<TimeTick>,
    pub resources: AHashMap<String, ResourceCapacity>,
    pub active_work: AHashMap<WorkId, WorkItem>,
    pub completed_work: AHashMap<WorkId, WorkItem>,
    pub decisions: Vec<DecisionSnapshot>,
    pub events: Vec<EventRecord>,
    /// Consequence-scheduled events not yet due; effects are
    /// re-synthesized on restore as evidence-logging effects
    pub scheduled_events: Vec<EventRecord>,
    pub evidence: Vec<EvidenceRecord>,
    pub context: ScenarioContext,
}

impl Session {
    /// Deep, immutable copy of all state for external consumption.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id(),
            industry: self.industry().to_string(),
            role: self.role().to_string(),
            state: self.state(),
            current_time: self.current_time(),
            clock_history: self.clock().history().to_vec(),
            resources: self.resources().snapshot().clone(),
            active_work: self.active_work().clone(),
            completed_work: self.completed_work().clone(),
            decisions: self
                .decisions()
                .iter()
                .map(DecisionSnapshot::from_decision)
                .collect(),
            events: self.events().to_vec(),
            scheduled_events: self
                .scheduled_events()
                .iter()
                .map(EventRecord::from_event)
                .collect(),
            evidence: self.evidence().records().to_vec(),
            context: self.context().clone(),
        }
    }

    /// Reconstruct a session from a prior snapshot.
    ///
    /// Stored state is replayed verbatim; pending scheduled events get
    /// the standard content effect (evidence logging), which is the
    /// only effect shape that persists.
    pub fn restore(snapshot: SessionSnapshot) -> Result<Self> {
        let mut scheduled = Vec::with_capacity(snapshot.scheduled_events.len());
        for record in snapshot.scheduled_events {
            let impact = record
                .impact
                .unwrap_or_else(|| record.description.clone());
            let mut event = Event::with_impact(
                &record.name,
                &record.description,
                record.trigger_time,
                &impact,
            )?;
            event.id = record.id;
            scheduled.push(event);
        }

        Ok(Session::from_parts(
            snapshot.id,
            snapshot.industry,
            snapshot.role,
            snapshot.state,
            SimulationClock::from_parts(snapshot.current_time, snapshot.clock_history),
            ResourcePool::from_parts(snapshot.resources),
            snapshot.active_work,
            snapshot.completed_work,
            snapshot
                .decisions
                .into_iter()
                .map(DecisionSnapshot::into_decision)
                .collect(),
            snapshot.events,
            scheduled,
            EvidenceLog::from_records(snapshot.evidence),
            snapshot.context,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::DecisionOption;
    use crate::evidence::EvidenceCategory;

    fn populated_session() -> Session {
        let mut session = Session::new("tech", "developer");
        session.start().unwrap();
        session.add_resource("engineer_hours", 40).unwrap();
        session
            .register_work(
                WorkItem::new(
                    "Implement core features",
                    "Primary functionality.",
                    8,
                    AHashMap::new(),
                    3,
                    0,
                )
                .unwrap(),
            )
            .unwrap();
        let decision = Decision::new(
            "Prioritize urgent work",
            "Backlog pressure",
            1,
            vec![DecisionOption::new("focus", "Focus").with_cost("engineer_hours", 6)],
        )
        .unwrap();
        let decision_id = decision.id;
        session.record_decision(decision).unwrap();
        session.make_decision(decision_id, "focus").unwrap();
        session.advance_time(2, "work progressed").unwrap();
        session
    }

    #[test]
    fn test_snapshot_matches_live_state() {
        let session = populated_session();
        let snapshot = session.snapshot();

        assert_eq!(snapshot.industry, "tech");
        assert_eq!(snapshot.role, "developer");
        assert_eq!(snapshot.current_time, 2);
        assert_eq!(snapshot.resources.get("engineer_hours").unwrap().available, 34);
        assert_eq!(snapshot.active_work.len(), 1);
        assert_eq!(snapshot.decisions.len(), 1);
        assert!(snapshot.decisions[0].made);
        assert_eq!(snapshot.evidence.len(), session.evidence().len());
    }

    #[test]
    fn test_snapshot_is_detached_from_live_session() {
        let mut session = populated_session();
        let snapshot = session.snapshot();
        session.advance_time(3, "more work").unwrap();
        // Snapshot unchanged by later mutation
        assert_eq!(snapshot.current_time, 2);
        assert_eq!(session.current_time(), 5);
    }

    #[test]
    fn test_json_round_trip_restores_verbatim() {
        let session = populated_session();
        let snapshot = session.snapshot();

        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: SessionSnapshot = serde_json::from_str(&json).unwrap();
        let restored = Session::restore(parsed).unwrap();

        assert_eq!(restored.id(), session.id());
        assert_eq!(restored.current_time(), session.current_time());
        assert_eq!(restored.state(), session.state());
        assert_eq!(
            restored.resources().available("engineer_hours"),
            session.resources().available("engineer_hours")
        );
        assert_eq!(restored.decisions().len(), 1);
        assert!(restored.decisions()[0].is_made());
        assert_eq!(restored.evidence().len(), session.evidence().len());
        assert_eq!(restored.clock().history().len(), session.clock().history().len());
    }

    #[test]
    fn test_restored_session_keeps_stepping() {
        let session = populated_session();
        let mut restored = Session::restore(session.snapshot()).unwrap();
        restored.advance_time(1, "resumed").unwrap();
        assert_eq!(restored.current_time(), 3);
        assert!(restored
            .evidence()
            .has_category(&EvidenceCategory::TimeAdvanced));
    }

    #[test]
    fn test_scheduled_events_survive_restore() {
        let mut session = populated_session();
        session.schedule_event(
            Event::with_impact("Retro", "team retrospective", 9, "learning").unwrap(),
        );
        let restored = Session::restore(session.snapshot()).unwrap();
        assert_eq!(restored.scheduled_events().len(), 1);
        assert_eq!(restored.scheduled_events()[0].trigger_time, 9);
    }

    #[test]
    fn test_restored_event_logs_original_impact() {
        let mut session = populated_session();
        session.schedule_event(
            Event::with_impact("Retro", "team retrospective", 3, "process improvement")
                .unwrap(),
        );

        let mut restored = Session::restore(session.snapshot()).unwrap();
        restored.advance_time(1, "resumed").unwrap();
        let due = restored.take_due_events();
        assert_eq!(due.len(), 1);
        restored.record_event(&due[0]).unwrap();
        due[0].trigger(&mut restored).unwrap();

        let impact_logged = restored
            .evidence()
            .records()
            .iter()
            .any(|r| r.payload["impact"] == "process improvement");
        assert!(impact_logged);
    }
}
