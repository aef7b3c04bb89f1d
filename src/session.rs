//! Session - the single-owner state container for one simulation run
//!
//! A session is a finite-state machine and evidence ledger. It owns
//! the clock, the resource pool, the work maps, the decision and event
//! sequences, and the evidence log. External layers receive immutable
//! snapshots only; mutation happens exclusively through the methods
//! here, driven by the engine and by explicit actor actions.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::clock::SimulationClock;
use crate::core::error::{Result, SimError};
use crate::core::types::{Amount, DecisionId, EventId, SessionId, Tick, WorkId};
use crate::decision::{Consequence, Decision};
use crate::event::{Event, EventRecord};
use crate::evidence::{EvidenceCategory, EvidenceLog};
use crate::resource::ResourcePool;
use crate::work::{WorkItem, WorkStateMachine, WorkStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Created,
    Active,
    Halted,
    Completed,
}

/// Typed scenario memory owned by the session.
///
/// Replaces the open-ended string-keyed flags bag: progression state
/// has named fields, and each scenario controller gets its own
/// namespace for controller-private keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioContext {
    pub current_phase: u32,
    pub completed_phases: Vec<u32>,
    pub portfolio_artifacts: Vec<String>,
    pub repository_connected: bool,
    namespaces: AHashMap<String, AHashMap<String, String>>,
}

impl ScenarioContext {
    pub fn namespace(&self, controller: &str) -> Option<&AHashMap<String, String>> {
        self.namespaces.get(controller)
    }

    /// Handle for a controller to mutate only its own namespace
    pub fn namespace_mut(&mut self, controller: &str) -> &mut AHashMap<String, String> {
        self.namespaces.entry(controller.to_string()).or_default()
    }
}

/// One simulation run: identity, lifecycle, and all mutable state
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    industry: String,
    role: String,
    state: SessionState,
    clock: SimulationClock,
    resources: ResourcePool,
    active_work: AHashMap<WorkId, WorkItem>,
    completed_work: AHashMap<WorkId, WorkItem>,
    decisions: Vec<Decision>,
    events: Vec<EventRecord>,
    /// Effect-bearing events scheduled by consequences, not yet due
    scheduled: Vec<Event>,
    evidence: EvidenceLog,
    context: ScenarioContext,
}

impl Session {
    pub fn new(industry: &str, role: &str) -> Self {
        Self {
            id: SessionId::new(),
            industry: industry.to_string(),
            role: role.to_string(),
            state: SessionState::Created,
            clock: SimulationClock::new(),
            resources: ResourcePool::new(),
            active_work: AHashMap::new(),
            completed_work: AHashMap::new(),
            decisions: Vec::new(),
            events: Vec::new(),
            scheduled: Vec::new(),
            evidence: EvidenceLog::new(),
            context: ScenarioContext::default(),
        }
    }

    // === Lifecycle ===

    pub fn start(&mut self) -> Result<()> {
        if self.state != SessionState::Created {
            return Err(SimError::InvalidState(
                "session cannot be started twice".to_string(),
            ));
        }
        self.state = SessionState::Active;
        self.log_evidence(
            EvidenceCategory::Session,
            json!({"transition": "started"}),
        );
        Ok(())
    }

    pub fn end(&mut self) -> Result<()> {
        if self.state != SessionState::Active {
            return Err(SimError::InvalidState(
                "only active sessions can end".to_string(),
            ));
        }
        self.state = SessionState::Completed;
        self.log_evidence(
            EvidenceCategory::Session,
            json!({"transition": "completed"}),
        );
        Ok(())
    }

    pub fn halt(&mut self) -> Result<()> {
        if self.state != SessionState::Active {
            return Err(SimError::InvalidState(
                "only active sessions can be halted".to_string(),
            ));
        }
        self.state = SessionState::Halted;
        self.log_evidence(
            EvidenceCategory::Session,
            json!({"transition": "halted"}),
        );
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn can_step(&self) -> bool {
        self.is_active()
    }

    fn require_active(&self, operation: &str) -> Result<()> {
        if !self.is_active() {
            return Err(SimError::InvalidState(format!(
                "cannot {} on a session in state {:?}",
                operation, self.state
            )));
        }
        Ok(())
    }

    // === Time ===

    pub fn advance_time(&mut self, delta: Tick, reason: &str) -> Result<()> {
        self.require_active("advance time")?;
        self.clock.advance(delta, reason)?;
        let now = self.clock.now();
        self.evidence.append(
            now,
            EvidenceCategory::TimeAdvanced,
            json!({"to": now, "delta": delta, "reason": reason.trim()}),
        );
        Ok(())
    }

    pub fn current_time(&self) -> Tick {
        self.clock.now()
    }

    // === Resources ===

    pub fn add_resource(&mut self, name: &str, total: Amount) -> Result<()> {
        self.resources.add_resource(name, total)?;
        self.log_evidence(
            EvidenceCategory::Resource,
            json!({"registered": name, "total": total}),
        );
        Ok(())
    }

    // === Work ===

    /// Register a new work item, rejecting duplicate ids.
    pub fn register_work(&mut self, item: WorkItem) -> Result<()> {
        if self.active_work.contains_key(&item.id) || self.completed_work.contains_key(&item.id)
        {
            return Err(SimError::Work(format!(
                "work item {:?} is already registered",
                item.id
            )));
        }
        self.log_evidence(
            EvidenceCategory::Work,
            json!({
                "registered": item.title,
                "work_id": item.id,
                "priority": item.priority,
            }),
        );
        self.active_work.insert(item.id, item);
        Ok(())
    }

    /// Move a work item along its lifecycle via the state machine.
    ///
    /// Completed items migrate from the active to the completed
    /// partition.
    pub fn transition_work(&mut self, work_id: WorkId, new_state: WorkStatus) -> Result<()> {
        self.require_active("transition work")?;
        let now = self.clock.now();
        let item = self.active_work.get_mut(&work_id).ok_or_else(|| {
            SimError::Work(format!("no active work item {:?}", work_id))
        })?;
        WorkStateMachine::transition(item, new_state, now)?;
        // Payload is built while the item is still borrowed; the borrow
        // must end before the log append below.
        let payload = json!({
            "work_id": work_id,
            "title": item.title,
            "status": item.status,
        });
        self.log_evidence(EvidenceCategory::Work, payload);
        if new_state == WorkStatus::Completed {
            if let Some(done) = self.active_work.remove(&work_id) {
                self.completed_work.insert(work_id, done);
            }
        }
        Ok(())
    }

    pub fn complete_work(&mut self, work_id: WorkId) -> Result<()> {
        self.transition_work(work_id, WorkStatus::Completed)
    }

    // === Decisions ===

    /// Append a rule-proposed decision to the ordered sequence.
    pub fn record_decision(&mut self, decision: Decision) -> Result<()> {
        self.require_active("record decision")?;
        self.log_evidence(
            EvidenceCategory::Decision,
            json!({
                "decision_id": decision.id,
                "title": decision.title,
                "phase": "recorded",
                "options": decision.options().len(),
            }),
        );
        self.decisions.push(decision);
        Ok(())
    }

    /// Explicit actor action: choose an option on a recorded decision.
    ///
    /// Allocates the option's resource cost atomically, applies its
    /// consequences in list order, then marks the decision made. A
    /// failed allocation leaves the decision open so the actor can
    /// retry another option.
    pub fn make_decision(&mut self, decision_id: DecisionId, option_id: &str) -> Result<()> {
        self.require_active("make decision")?;
        let now = self.clock.now();

        let index = self
            .decisions
            .iter()
            .position(|d| d.id == decision_id)
            .ok_or_else(|| {
                SimError::Decision(format!("unknown decision {:?}", decision_id))
            })?;

        if self.decisions[index].is_made() {
            return Err(SimError::DecisionAlreadyMade(decision_id));
        }
        if !self.decisions[index].is_available(now) {
            return Err(SimError::Decision(format!(
                "decision '{}' expired at {:?}",
                self.decisions[index].title, self.decisions[index].expires_at
            )));
        }

        let option = self.decisions[index].find_option(option_id)?.clone();

        self.resources.allocate(&option.resource_cost)?;
        for consequence in &option.consequences {
            self.apply_consequence(consequence, now)?;
        }

        let title = self.decisions[index].title.clone();
        self.decisions[index].mark_made(option_id, now);
        self.log_evidence(
            EvidenceCategory::Decision,
            json!({
                "decision_id": decision_id,
                "title": title,
                "phase": "made",
                "option": option_id,
            }),
        );
        tracing::debug!(decision = %title, option = option_id, "decision made");
        Ok(())
    }

    fn apply_consequence(&mut self, consequence: &Consequence, now: Tick) -> Result<()> {
        match consequence {
            Consequence::AddEvent {
                name,
                description,
                impact,
                delay,
            } => {
                let event = Event::with_impact(name, description, now + delay, impact)?;
                self.schedule_event(event);
                Ok(())
            }
            Consequence::AddWork(template) => {
                let item = template.instantiate(now)?;
                self.register_work(item)
            }
            Consequence::ModifyResource { name, delta } => {
                self.resources.adjust(name, *delta)?;
                self.log_evidence(
                    EvidenceCategory::Resource,
                    json!({"adjusted": name, "delta": delta}),
                );
                Ok(())
            }
            Consequence::Log { category, message } => {
                self.log_evidence(
                    EvidenceCategory::Custom(category.clone()),
                    json!({"message": message}),
                );
                Ok(())
            }
        }
    }

    // === Events ===

    /// Record an event into the ordered sequence, mirrored to evidence.
    pub fn record_event(&mut self, event: &Event) -> Result<()> {
        self.require_active("record event")?;
        self.log_evidence(
            EvidenceCategory::Event,
            json!({
                "event_id": event.id,
                "name": event.name,
                "phase": "recorded",
            }),
        );
        self.events.push(EventRecord::from_event(event));
        Ok(())
    }

    /// Queue a consequence-spawned event until its trigger time.
    pub fn schedule_event(&mut self, event: Event) {
        self.scheduled.push(event);
    }

    /// Drain scheduled events whose trigger time has arrived.
    pub fn take_due_events(&mut self) -> Vec<Event> {
        let now = self.clock.now();
        let mut due = Vec::new();
        let mut index = 0;
        while index < self.scheduled.len() {
            if self.scheduled[index].trigger_time <= now {
                due.push(self.scheduled.remove(index));
            } else {
                index += 1;
            }
        }
        due
    }

    /// Stamp a recorded event as fired; enforces exactly-once firing.
    pub fn mark_event_triggered(&mut self, event_id: EventId) -> Result<()> {
        let record = self
            .events
            .iter_mut()
            .find(|r| r.id == event_id)
            .ok_or_else(|| {
                SimError::Event(format!("event {:?} was never recorded", event_id))
            })?;
        if record.triggered_at.is_some() {
            return Err(SimError::Event(format!(
                "event '{}' has already been triggered",
                record.name
            )));
        }
        record.triggered_at = Some(self.clock.now());
        Ok(())
    }

    // === Evidence ===

    /// Append an evidence record at the current tick.
    pub fn log_evidence(&mut self, category: EvidenceCategory, payload: serde_json::Value) {
        self.evidence.append(self.clock.now(), category, payload);
    }

    // === Read-only accessors ===

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn industry(&self) -> &str {
        &self.industry
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn resources(&self) -> &ResourcePool {
        &self.resources
    }

    pub fn active_work(&self) -> &AHashMap<WorkId, WorkItem> {
        &self.active_work
    }

    pub fn completed_work(&self) -> &AHashMap<WorkId, WorkItem> {
        &self.completed_work
    }

    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn scheduled_events(&self) -> &[Event] {
        &self.scheduled
    }

    pub fn evidence(&self) -> &EvidenceLog {
        &self.evidence
    }

    pub fn context(&self) -> &ScenarioContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ScenarioContext {
        &mut self.context
    }

    // === Restore ===

    /// Rebuild a session verbatim from persisted parts. Used by the
    /// snapshot restore path; no past ticks are re-executed.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: SessionId,
        industry: String,
        role: String,
        state: SessionState,
        clock: SimulationClock,
        resources: ResourcePool,
        active_work: AHashMap<WorkId, WorkItem>,
        completed_work: AHashMap<WorkId, WorkItem>,
        decisions: Vec<Decision>,
        events: Vec<EventRecord>,
        scheduled: Vec<Event>,
        evidence: EvidenceLog,
        context: ScenarioContext,
    ) -> Self {
        Self {
            id,
            industry,
            role,
            state,
            clock,
            resources,
            active_work,
            completed_work,
            decisions,
            events,
            scheduled,
            evidence,
            context,
        }
    }
}
