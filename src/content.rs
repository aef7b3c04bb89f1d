//! Scenario content loading
//!
//! Scenario files supply work templates, decision catalogs, and event
//! definitions as TOML. The core validates structural shape only
//! (non-empty options, positive effort, known consequence kinds) and
//! never interprets scenario semantics. Unknown consequence kinds are
//! rejected, not skipped: malformed content must never pass silently.

use std::fs;
use std::path::Path;

use ahash::AHashMap;

use crate::core::error::{Result, SimError};
use crate::core::types::{Amount, Tick};
use crate::decision::{Consequence, Decision, DecisionOption};
use crate::event::Event;
use crate::industry::IndustryHooks;
use crate::resource::ResourceSpec;
use crate::session::Session;
use crate::work::{WorkItem, WorkTemplate};

/// Event definition from content: name, description, impact, schedule
#[derive(Debug, Clone)]
pub struct EventTemplate {
    pub name: String,
    pub description: String,
    pub impact: String,
    pub trigger_time: Tick,
}

impl EventTemplate {
    pub fn instantiate(&self) -> Result<Event> {
        Event::with_impact(
            &self.name,
            &self.description,
            self.trigger_time,
            &self.impact,
        )
    }
}

/// Everything a scenario file supplies
#[derive(Debug, Clone, Default)]
pub struct ScenarioContent {
    pub resources: Vec<ResourceSpec>,
    pub work: Vec<WorkTemplate>,
    pub decisions: Vec<Decision>,
    pub events: Vec<EventTemplate>,
}

/// Load a scenario from a TOML file
pub fn load_scenario(path: &Path) -> Result<ScenarioContent> {
    let content = fs::read_to_string(path)?;
    parse_scenario(&content)
}

/// Parse a scenario from TOML text
pub fn parse_scenario(content: &str) -> Result<ScenarioContent> {
    let root: toml::Value = content
        .parse()
        .map_err(|e| SimError::Config(format!("invalid scenario TOML: {}", e)))?;

    let mut scenario = ScenarioContent::default();

    if let Some(resources) = root.get("resources").and_then(|v| v.as_array()) {
        for resource in resources {
            scenario.resources.push(parse_resource(resource)?);
        }
    }

    if let Some(work) = root.get("work").and_then(|v| v.as_array()) {
        for item in work {
            scenario.work.push(parse_work_template(item)?);
        }
    }

    if let Some(decisions) = root.get("decisions").and_then(|v| v.as_array()) {
        for decision in decisions {
            scenario.decisions.push(parse_decision(decision)?);
        }
    }

    if let Some(events) = root.get("events").and_then(|v| v.as_array()) {
        for event in events {
            scenario.events.push(parse_event(event)?);
        }
    }

    Ok(scenario)
}

fn require_str(value: &toml::Value, field: &str, what: &str) -> Result<String> {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| SimError::Config(format!("{} missing '{}'", what, field)))
}

fn optional_str(value: &toml::Value, field: &str) -> String {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

fn parse_amount_table(
    value: &toml::Value,
    field: &str,
    what: &str,
) -> Result<AHashMap<String, Amount>> {
    let mut amounts = AHashMap::new();
    let raw = match value.get(field) {
        Some(raw) => raw,
        None => return Ok(amounts),
    };
    let table = raw.as_table().ok_or_else(|| {
        SimError::Config(format!("{} '{}' must be a table", what, field))
    })?;
    for (name, amount) in table {
        let amount = amount.as_integer().ok_or_else(|| {
            SimError::Config(format!(
                "{} '{}' has a non-integer amount for '{}'",
                what, field, name
            ))
        })?;
        amounts.insert(name.clone(), amount);
    }
    Ok(amounts)
}

/// Optional non-negative tick field; negative or non-integer values
/// are rejected rather than wrapped.
fn optional_tick(value: &toml::Value, field: &str, what: &str) -> Result<Option<Tick>> {
    match value.get(field) {
        None => Ok(None),
        Some(raw) => {
            let raw = raw.as_integer().ok_or_else(|| {
                SimError::Config(format!("{} '{}' must be an integer", what, field))
            })?;
            if raw < 0 {
                return Err(SimError::Config(format!(
                    "{} '{}' cannot be negative",
                    what, field
                )));
            }
            Ok(Some(raw as Tick))
        }
    }
}

fn priority_field(value: &toml::Value, what: &str) -> Result<u8> {
    match value.get("priority") {
        None => Ok(3),
        Some(raw) => {
            let raw = raw.as_integer().ok_or_else(|| {
                SimError::Config(format!("{} priority must be an integer", what))
            })?;
            if !(0..=u8::MAX as i64).contains(&raw) {
                return Err(SimError::Config(format!(
                    "{} priority {} is out of range",
                    what, raw
                )));
            }
            Ok(raw as u8)
        }
    }
}

fn parse_resource(value: &toml::Value) -> Result<ResourceSpec> {
    let name = require_str(value, "name", "resource")?;
    let total = value
        .get("total")
        .and_then(|v| v.as_integer())
        .ok_or_else(|| SimError::Config(format!("resource '{}' missing 'total'", name)))?;
    Ok(ResourceSpec { name, total })
}

fn parse_work_template(value: &toml::Value) -> Result<WorkTemplate> {
    let title = require_str(value, "title", "work template")?;
    let effort = value
        .get("effort")
        .and_then(|v| v.as_integer())
        .ok_or_else(|| SimError::Config(format!("work '{}' missing 'effort'", title)))?;
    if effort <= 0 || effort > u32::MAX as i64 {
        return Err(SimError::Config(format!(
            "work '{}' effort {} is out of range",
            title, effort
        )));
    }
    Ok(WorkTemplate {
        description: optional_str(value, "description"),
        estimated_effort: effort as u32,
        required_resources: parse_amount_table(value, "resources", &format!("work '{}'", title))?,
        priority: priority_field(value, &format!("work '{}'", title))?,
        title,
    })
}

fn parse_decision(value: &toml::Value) -> Result<Decision> {
    let title = require_str(value, "title", "decision")?;
    let context = optional_str(value, "context");
    let priority = priority_field(value, &format!("decision '{}'", title))?;

    let mut options = Vec::new();
    if let Some(raw_options) = value.get("options").and_then(|v| v.as_array()) {
        for option in raw_options {
            options.push(parse_option(option, &title)?);
        }
    }

    let mut decision = Decision::new(&title, &context, priority, options)?;
    if let Some(role) = value.get("required_role").and_then(|v| v.as_str()) {
        decision = decision.with_required_role(role);
    }
    if let Some(expires_at) = optional_tick(value, "expires_at", &format!("decision '{}'", title))? {
        decision = decision.with_expiry(expires_at);
    }
    Ok(decision)
}

fn parse_option(value: &toml::Value, decision_title: &str) -> Result<DecisionOption> {
    let id = require_str(value, "id", "decision option")?;
    let mut option = DecisionOption::new(&id, &optional_str(value, "description"));
    option.resource_cost =
        parse_amount_table(value, "cost", &format!("option '{}' of '{}'", id, decision_title))?;

    if let Some(consequences) = value.get("consequences").and_then(|v| v.as_array()) {
        for consequence in consequences {
            option
                .consequences
                .push(parse_consequence(consequence, decision_title)?);
        }
    }
    Ok(option)
}

fn parse_consequence(value: &toml::Value, decision_title: &str) -> Result<Consequence> {
    let kind = require_str(value, "kind", "consequence")?;
    match kind.as_str() {
        "add_event" => Ok(Consequence::AddEvent {
            name: require_str(value, "name", "add_event consequence")?,
            description: optional_str(value, "description"),
            impact: optional_str(value, "impact"),
            delay: optional_tick(value, "delay", "add_event consequence")?.unwrap_or(0),
        }),
        "add_work" => {
            let work = value.get("work").ok_or_else(|| {
                SimError::Config("add_work consequence missing 'work' table".to_string())
            })?;
            Ok(Consequence::AddWork(parse_work_template(work)?))
        }
        "modify_resource" => Ok(Consequence::ModifyResource {
            name: require_str(value, "name", "modify_resource consequence")?,
            delta: value
                .get("delta")
                .and_then(|v| v.as_integer())
                .ok_or_else(|| {
                    SimError::Config("modify_resource consequence missing 'delta'".to_string())
                })?,
        }),
        "log" => Ok(Consequence::Log {
            category: require_str(value, "category", "log consequence")?,
            message: optional_str(value, "message"),
        }),
        unknown => Err(SimError::Decision(format!(
            "decision '{}' uses unsupported consequence kind '{}'",
            decision_title, unknown
        ))),
    }
}

fn parse_event(value: &toml::Value) -> Result<EventTemplate> {
    let name = require_str(value, "name", "event")?;
    Ok(EventTemplate {
        description: optional_str(value, "description"),
        impact: optional_str(value, "impact"),
        trigger_time: optional_tick(value, "trigger_time", &format!("event '{}'", name))?
            .unwrap_or(0),
        name,
    })
}

/// Industry hooks backed by loaded scenario content.
///
/// Work templates become initial work; decisions are proposed until
/// recorded; events are proposed at their trigger time.
pub struct ScenarioHooks {
    industry: String,
    content: ScenarioContent,
}

impl ScenarioHooks {
    pub fn new(industry: &str, content: ScenarioContent) -> Self {
        Self {
            industry: industry.to_string(),
            content,
        }
    }
}

impl IndustryHooks for ScenarioHooks {
    fn industry(&self) -> &str {
        &self.industry
    }

    fn initial_resources(&self) -> Vec<ResourceSpec> {
        self.content.resources.clone()
    }

    fn generate_initial_work(&self, session: &Session) -> Result<Vec<WorkItem>> {
        let now = session.current_time();
        self.content
            .work
            .iter()
            .map(|template| template.instantiate(now))
            .collect()
    }

    fn evaluate_rules(&self, session: &Session) -> Result<Vec<Decision>> {
        // Propose each catalog decision until the session has recorded it
        Ok(self
            .content
            .decisions
            .iter()
            .filter(|decision| {
                !session
                    .decisions()
                    .iter()
                    .any(|recorded| recorded.title == decision.title)
            })
            .cloned()
            .collect())
    }

    fn generate_events(&self, session: &Session) -> Result<Vec<Event>> {
        let now = session.current_time();
        let mut events = Vec::new();
        for template in &self.content.events {
            if template.trigger_time != now {
                continue;
            }
            let already_fired = session
                .events()
                .iter()
                .any(|record| record.name == template.name);
            if !already_fired {
                events.push(template.instantiate()?);
            }
        }
        Ok(events)
    }
}
