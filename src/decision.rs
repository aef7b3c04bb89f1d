//! Decisions, options, and consequences
//!
//! A decision is a proposed, optionally-executed action. Rules propose
//! decisions; the engine records them; an actor explicitly makes one by
//! choosing an option, which allocates the option's resource cost and
//! applies its consequences in order. A decision, once made, can never
//! be made again.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{Amount, DecisionId, Tick};
use crate::work::WorkTemplate;

/// Effect applied when an option is chosen.
///
/// This enum is closed: an unsupported kind cannot exist in a live
/// session. Content parsed from scenario files goes through the loader,
/// which rejects unknown kind tags instead of skipping them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Consequence {
    /// Schedule a new event `delay` ticks from the making time
    AddEvent {
        name: String,
        description: String,
        impact: String,
        delay: Tick,
    },
    /// Register a new work item
    AddWork(WorkTemplate),
    /// Apply a signed delta to a named resource, through the pool's caps
    ModifyResource { name: String, delta: Amount },
    /// Append a free-form evidence entry
    Log { category: String, message: String },
}

/// One mutually exclusive choice within a decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionOption {
    pub id: String,
    pub description: String,
    pub resource_cost: AHashMap<String, Amount>,
    pub consequences: Vec<Consequence>,
}

impl DecisionOption {
    pub fn new(id: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            resource_cost: AHashMap::new(),
            consequences: Vec::new(),
        }
    }

    pub fn with_cost(mut self, resource: &str, amount: Amount) -> Self {
        self.resource_cost.insert(resource.to_string(), amount);
        self
    }

    pub fn with_consequence(mut self, consequence: Consequence) -> Self {
        self.consequences.push(consequence);
        self
    }
}

/// A proposed action with one or more mutually exclusive options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub id: DecisionId,
    pub title: String,
    pub context: String,
    pub required_role: Option<String>,
    pub expires_at: Option<Tick>,
    /// Lower = more urgent; engines sort proposals by this
    pub priority: u8,
    options: Vec<DecisionOption>,
    made: bool,
    selected_option: Option<String>,
    made_at: Option<Tick>,
}

impl Decision {
    /// Create a structurally valid decision: non-empty title, at least
    /// one option.
    pub fn new(
        title: &str,
        context: &str,
        priority: u8,
        options: Vec<DecisionOption>,
    ) -> Result<Self> {
        if title.trim().is_empty() {
            return Err(SimError::Decision(
                "decision title is required".to_string(),
            ));
        }
        if options.is_empty() {
            return Err(SimError::Decision(format!(
                "decision '{}' must offer at least one option",
                title
            )));
        }
        Ok(Self {
            id: DecisionId::new(),
            title: title.to_string(),
            context: context.to_string(),
            required_role: None,
            expires_at: None,
            priority,
            options,
            made: false,
            selected_option: None,
            made_at: None,
        })
    }

    pub fn with_required_role(mut self, role: &str) -> Self {
        self.required_role = Some(role.to_string());
        self
    }

    pub fn with_expiry(mut self, expires_at: Tick) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn options(&self) -> &[DecisionOption] {
        &self.options
    }

    pub fn is_made(&self) -> bool {
        self.made
    }

    pub fn selected_option(&self) -> Option<&str> {
        self.selected_option.as_deref()
    }

    pub fn made_at(&self) -> Option<Tick> {
        self.made_at
    }

    /// Whether this decision can still be made at `session_time`
    pub fn is_available(&self, session_time: Tick) -> bool {
        if self.made {
            return false;
        }
        match self.expires_at {
            Some(expiry) => session_time <= expiry,
            None => true,
        }
    }

    pub fn find_option(&self, option_id: &str) -> Result<&DecisionOption> {
        self.options
            .iter()
            .find(|o| o.id == option_id)
            .ok_or_else(|| {
                SimError::Decision(format!(
                    "decision '{}' has no option '{}'",
                    self.title, option_id
                ))
            })
    }

    /// Stamp the decision as made. The session orchestrates cost
    /// allocation and consequences before calling this.
    pub(crate) fn mark_made(&mut self, option_id: &str, now: Tick) {
        self.made = true;
        self.selected_option = Some(option_id.to_string());
        self.made_at = Some(now);
    }

    /// Rebuild from persisted fields (snapshot restore path)
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: DecisionId,
        title: String,
        context: String,
        required_role: Option<String>,
        expires_at: Option<Tick>,
        priority: u8,
        options: Vec<DecisionOption>,
        made: bool,
        selected_option: Option<String>,
        made_at: Option<Tick>,
    ) -> Self {
        Self {
            id,
            title,
            context,
            required_role,
            expires_at,
            priority,
            options,
            made,
            selected_option,
            made_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision() -> Decision {
        Decision::new(
            "Prioritize urgent work",
            "Three pending items compete for the same engineers.",
            1,
            vec![
                DecisionOption::new("focus", "Focus the team on the urgent item")
                    .with_cost("engineer_hours", 6),
                DecisionOption::new("defer", "Defer lower-priority work"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_new_requires_title_and_options() {
        assert!(Decision::new("", "ctx", 1, vec![DecisionOption::new("a", "b")]).is_err());
        assert!(Decision::new("title", "ctx", 1, Vec::new()).is_err());
    }

    #[test]
    fn test_availability_window() {
        let d = decision().with_expiry(5);
        assert!(d.is_available(0));
        assert!(d.is_available(5));
        assert!(!d.is_available(6));
    }

    #[test]
    fn test_made_decision_is_unavailable() {
        let mut d = decision();
        d.mark_made("focus", 2);
        assert!(!d.is_available(3));
        assert_eq!(d.selected_option(), Some("focus"));
        assert_eq!(d.made_at(), Some(2));
    }

    #[test]
    fn test_find_option() {
        let d = decision();
        assert!(d.find_option("focus").is_ok());
        assert!(matches!(
            d.find_option("missing"),
            Err(SimError::Decision(_))
        ));
    }

    #[test]
    fn test_consequence_kind_tags() {
        let json = serde_json::to_value(Consequence::ModifyResource {
            name: "budget".to_string(),
            delta: -500,
        })
        .unwrap();
        assert_eq!(json["kind"], "modify_resource");

        // Unknown kinds must not deserialize silently
        let raw = serde_json::json!({"kind": "reticulate_splines"});
        assert!(serde_json::from_value::<Consequence>(raw).is_err());
    }
}
