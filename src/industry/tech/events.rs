//! Tech events
//!
//! Deterministic incidents that hit every tech project sooner or
//! later. Trigger ticks come from the engine seed; the builders here
//! only describe the event.

use crate::core::error::Result;
use crate::core::types::Tick;
use crate::event::Event;

pub fn security_incident(trigger_time: Tick) -> Result<Event> {
    Event::with_impact(
        "Security Incident",
        "A security vulnerability is discovered",
        trigger_time,
        "Security review required",
    )
}

pub fn production_outage(trigger_time: Tick) -> Result<Event> {
    Event::with_impact(
        "Production Outage",
        "Production system outage",
        trigger_time,
        "Deployment and monitoring workload increases",
    )
}

pub fn stakeholder_scope_change(trigger_time: Tick) -> Result<Event> {
    Event::with_impact(
        "Scope Change",
        "Stakeholder requests additional features",
        trigger_time,
        "Project scope expanded",
    )
}
