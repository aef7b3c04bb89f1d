//! Tech realism rules
//!
//! Rules read session state and propose decisions. They never execute
//! work and never mutate the session. Each rule proposes its decision
//! at most once per session; recorded titles suppress re-proposal.

use crate::core::error::Result;
use crate::decision::{Consequence, Decision, DecisionOption};
use crate::session::Session;
use crate::work::WorkStatus;

use super::stakeholders;

/// Pending-work pressure at which backlog triage is forced
const BACKLOG_PRESSURE_THRESHOLD: usize = 3;

fn already_recorded(session: &Session, title: &str) -> bool {
    session.decisions().iter().any(|d| d.title == title)
}

/// Backlog triage when pending work piles up or anything urgent waits.
fn backlog_triage(session: &Session) -> Result<Option<Decision>> {
    let title = "Prioritize urgent work";
    if already_recorded(session, title) {
        return Ok(None);
    }

    let pending: Vec<_> = session
        .active_work()
        .values()
        .filter(|w| w.status == WorkStatus::Pending)
        .collect();
    let has_urgent = pending.iter().any(|w| w.priority == 0);
    if pending.len() < BACKLOG_PRESSURE_THRESHOLD && !has_urgent {
        return Ok(None);
    }

    let decision = Decision::new(
        title,
        "Pending work is piling up; the team needs a clear focus.",
        if has_urgent { 0 } else { 1 },
        vec![
            DecisionOption::new("focus", "Pull the most urgent item forward")
                .with_cost("engineer_hours", 4)
                .with_consequence(Consequence::Log {
                    category: "prioritization".to_string(),
                    message: "urgent item pulled forward".to_string(),
                }),
            DecisionOption::new("spread", "Keep working the backlog in order")
                .with_consequence(Consequence::Log {
                    category: "prioritization".to_string(),
                    message: "backlog kept in order".to_string(),
                }),
        ],
    )?;
    Ok(Some(decision))
}

/// Coding work cannot begin without a connected repository.
fn repository_required(session: &Session) -> Result<Option<Decision>> {
    let title = "Connect a source repository";
    if already_recorded(session, title) || session.context().repository_connected {
        return Ok(None);
    }

    let coding_pending = session
        .active_work()
        .values()
        .any(|w| w.title.contains("Implement") || w.title.contains("repository"));
    if !coding_pending {
        return Ok(None);
    }

    let decision = Decision::new(
        title,
        "Implementation work is queued but no repository is connected.",
        1,
        vec![
            DecisionOption::new("connect", "Provision and connect the repository")
                .with_cost("engineer_hours", 2)
                .with_consequence(Consequence::Log {
                    category: "repository".to_string(),
                    message: "repository connected".to_string(),
                }),
            DecisionOption::new("defer", "Defer implementation until later")
                .with_consequence(Consequence::Log {
                    category: "repository".to_string(),
                    message: "implementation deferred".to_string(),
                }),
        ],
    )?;
    Ok(Some(decision))
}

/// Development must not outrun planning.
fn planning_before_execution(session: &Session) -> Result<Option<Decision>> {
    let title = "Pause development pending planning";
    if already_recorded(session, title) {
        return Ok(None);
    }

    let planning_done = session
        .completed_work()
        .values()
        .any(|w| w.title.contains("requirements") || w.title.contains("canvas"));
    let development_running = session
        .active_work()
        .values()
        .any(|w| w.status == WorkStatus::InProgress && w.title.contains("Implement"));
    if planning_done || !development_running {
        return Ok(None);
    }

    let decision = Decision::new(
        title,
        "Implementation started before planning work was completed.",
        1,
        vec![
            DecisionOption::new("pause", "Block implementation until planning is done")
                .with_consequence(Consequence::Log {
                    category: "sequencing".to_string(),
                    message: "implementation blocked pending planning".to_string(),
                }),
            DecisionOption::new("accept_risk", "Continue and accept rework risk")
                .with_consequence(Consequence::Log {
                    category: "sequencing".to_string(),
                    message: "rework risk accepted".to_string(),
                }),
        ],
    )?;
    Ok(Some(decision))
}

/// Deployment must not proceed before testing is completed.
fn testing_before_deployment(session: &Session) -> Result<Option<Decision>> {
    let title = "Hold deployment until testing passes";
    if already_recorded(session, title) {
        return Ok(None);
    }

    let testing_done = session
        .completed_work()
        .values()
        .any(|w| w.title.contains("Test"));
    let deploy_moving = session
        .active_work()
        .values()
        .any(|w| w.status == WorkStatus::InProgress && w.title.contains("Deploy"));
    if testing_done || !deploy_moving {
        return Ok(None);
    }

    // Users rate reliability as critical; holding the release is the
    // highest-pressure call the rules make.
    let priority = 5 - stakeholders::influence_on("Reliability").min(5);
    let decision = Decision::new(
        title,
        "A deployment is in motion without a completed test pass.",
        priority,
        vec![
            DecisionOption::new("hold", "Block the deployment until tests complete")
                .with_consequence(Consequence::Log {
                    category: "release_gate".to_string(),
                    message: "deployment held for testing".to_string(),
                }),
            DecisionOption::new("ship", "Ship now and hotfix if needed")
                .with_cost("budget", 1000)
                .with_consequence(Consequence::Log {
                    category: "release_gate".to_string(),
                    message: "shipped without a test pass".to_string(),
                }),
        ],
    )?;
    Ok(Some(decision))
}

/// Junior project managers coordinate; they do not execute
/// engineering work.
fn role_boundaries(session: &Session) -> Result<Option<Decision>> {
    let title = "Reassign engineering work";
    if already_recorded(session, title) || session.role() != "junior_project_manager" {
        return Ok(None);
    }

    const ENGINEERING_KEYWORDS: [&str; 4] = ["Implement", "Deploy", "repository", "architecture"];
    let engineering_running = session.active_work().values().any(|w| {
        w.status == WorkStatus::InProgress
            && ENGINEERING_KEYWORDS.iter().any(|k| w.title.contains(k))
    });
    if !engineering_running {
        return Ok(None);
    }

    let decision = Decision::new(
        title,
        "The session actor is a junior PM; engineering work needs an engineer.",
        1,
        vec![
            DecisionOption::new("reassign", "Hand the work to the engineering team")
                .with_cost("engineer_hours", 2)
                .with_consequence(Consequence::Log {
                    category: "role_boundary".to_string(),
                    message: "engineering work reassigned".to_string(),
                }),
            DecisionOption::new("escalate", "Escalate staffing to the founder")
                .with_consequence(Consequence::Log {
                    category: "role_boundary".to_string(),
                    message: "staffing escalated".to_string(),
                }),
        ],
    )?;
    Ok(Some(decision))
}

/// Run every rule and collect proposals.
pub fn evaluate(session: &Session) -> Result<Vec<Decision>> {
    let mut proposals = Vec::new();
    for rule in [
        backlog_triage,
        repository_required,
        planning_before_execution,
        testing_before_deployment,
        role_boundaries,
    ] {
        if let Some(decision) = rule(session)? {
            proposals.push(decision);
        }
    }
    Ok(proposals)
}
