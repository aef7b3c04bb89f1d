//! Industry content modules
//!
//! An industry module supplies everything scenario-specific: initial
//! resources and work, rule evaluation, and event generation. The core
//! treats all of it as opaque data and behavior; a missing industry is
//! a construction-time error, never a silent no-op.

pub mod tech;

use crate::core::error::{Result, SimError};
use crate::decision::Decision;
use crate::event::Event;
use crate::resource::ResourceSpec;
use crate::session::Session;
use crate::work::WorkItem;

/// Contract every industry module must implement.
///
/// All three generators are required; the trait replaces runtime
/// capability probing with a compile-time obligation. Implementations
/// must be pure with respect to the session: read state, return
/// proposals, never block.
pub trait IndustryHooks {
    /// Industry key, e.g. "tech"
    fn industry(&self) -> &str;

    /// Resources seeded into the pool when the engine starts a session
    fn initial_resources(&self) -> Vec<ResourceSpec> {
        Vec::new()
    }

    /// Roles this industry's rules understand; empty means any role
    fn roles(&self) -> &[&'static str] {
        &[]
    }

    /// Invoked exactly once after session start
    fn generate_initial_work(&self, session: &Session) -> Result<Vec<WorkItem>>;

    /// Invoked every tick; proposes decisions, never mutates
    fn evaluate_rules(&self, session: &Session) -> Result<Vec<Decision>>;

    /// Invoked every tick; proposes candidate events, never mutates
    fn generate_events(&self, session: &Session) -> Result<Vec<Event>>;
}

/// Look up an industry module by key.
///
/// Unknown industries fail at engine construction, before any session
/// mutation.
pub fn load(industry: &str, event_seed: u64) -> Result<Box<dyn IndustryHooks>> {
    match industry {
        "tech" => Ok(Box::new(tech::TechIndustry::new(event_seed))),
        other => Err(SimError::Config(format!(
            "unknown industry '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_known_industry() {
        let hooks = load("tech", 7).unwrap();
        assert_eq!(hooks.industry(), "tech");
    }

    #[test]
    fn test_load_unknown_industry_is_config_error() {
        assert!(matches!(
            load("hospitality", 7),
            Err(SimError::Config(_))
        ));
    }
}
