//! Tech industry module
//!
//! Bundles the work catalog, realism rules, incident events, and
//! stakeholder set for software-delivery simulations. Incident timing
//! is derived from the engine event seed, so a given seed always
//! produces the same schedule.

pub mod events;
pub mod rules;
pub mod stakeholders;
pub mod work;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::error::Result;
use crate::core::types::Tick;
use crate::decision::Decision;
use crate::event::Event;
use crate::industry::IndustryHooks;
use crate::resource::ResourceSpec;
use crate::session::Session;
use crate::work::WorkItem;

/// Roles the tech rules understand
pub const ROLES: [&str; 4] = [
    "junior_engineer",
    "product_manager",
    "tech_lead",
    "junior_project_manager",
];

pub struct TechIndustry {
    incident_tick: Tick,
    outage_tick: Tick,
    scope_change_tick: Tick,
}

impl TechIndustry {
    pub fn new(event_seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(event_seed);
        Self {
            incident_tick: rng.gen_range(2..6),
            outage_tick: rng.gen_range(4..9),
            scope_change_tick: rng.gen_range(3..8),
        }
    }

    /// Planned incident schedule, for harnesses and diagnostics.
    pub fn schedule(&self) -> [(&'static str, Tick); 3] {
        [
            ("Security Incident", self.incident_tick),
            ("Production Outage", self.outage_tick),
            ("Scope Change", self.scope_change_tick),
        ]
    }
}

impl IndustryHooks for TechIndustry {
    fn industry(&self) -> &str {
        "tech"
    }

    fn roles(&self) -> &[&'static str] {
        &ROLES
    }

    fn initial_resources(&self) -> Vec<ResourceSpec> {
        vec![
            ResourceSpec {
                name: "engineer_hours".to_string(),
                total: 40,
            },
            ResourceSpec {
                name: "budget".to_string(),
                total: 5000,
            },
            ResourceSpec {
                name: "infra_capacity".to_string(),
                total: 10,
            },
        ]
    }

    fn generate_initial_work(&self, session: &Session) -> Result<Vec<WorkItem>> {
        let now = session.current_time();
        work::catalog()
            .iter()
            .map(|template| template.instantiate(now))
            .collect()
    }

    fn evaluate_rules(&self, session: &Session) -> Result<Vec<Decision>> {
        rules::evaluate(session)
    }

    fn generate_events(&self, session: &Session) -> Result<Vec<Event>> {
        let now = session.current_time();
        let mut due = Vec::new();
        if now == self.incident_tick {
            due.push(events::security_incident(now)?);
        }
        if now == self.outage_tick {
            due.push(events::production_outage(now)?);
        }
        if now == self.scope_change_tick {
            due.push(events::stakeholder_scope_change(now)?);
        }
        Ok(due)
    }
}
