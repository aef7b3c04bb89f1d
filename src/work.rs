//! Work items and their enforced lifecycle
//!
//! Work is executed, not answered: it requires effort, consumes
//! resources, and progresses through strict, realistic state
//! transitions. The state machine prevents completing work that never
//! started and restarting work that already did.

use std::fmt;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{Amount, Tick, WorkId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    Pending,
    InProgress,
    Blocked,
    Completed,
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkStatus::Pending => "pending",
            WorkStatus::InProgress => "in_progress",
            WorkStatus::Blocked => "blocked",
            WorkStatus::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

/// A unit of simulated operational work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: WorkId,
    pub title: String,
    pub description: String,
    /// Abstract time units of effort
    pub estimated_effort: u32,
    pub required_resources: AHashMap<String, Amount>,
    /// Lower = more urgent
    pub priority: u8,
    pub created_at: Tick,
    pub started_at: Option<Tick>,
    pub completed_at: Option<Tick>,
    pub status: WorkStatus,
}

impl WorkItem {
    /// Create a validated work item.
    ///
    /// Industry content defines WHAT work exists; the core defines HOW
    /// it behaves, starting with structural validation here.
    pub fn new(
        title: &str,
        description: &str,
        estimated_effort: u32,
        required_resources: AHashMap<String, Amount>,
        priority: u8,
        created_at: Tick,
    ) -> Result<Self> {
        if title.trim().is_empty() {
            return Err(SimError::Work("work title is required".to_string()));
        }
        if estimated_effort == 0 {
            return Err(SimError::Work(
                "work must require positive effort".to_string(),
            ));
        }
        Ok(Self {
            id: WorkId::new(),
            title: title.to_string(),
            description: description.to_string(),
            estimated_effort,
            required_resources,
            priority,
            created_at,
            started_at: None,
            completed_at: None,
            status: WorkStatus::Pending,
        })
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, WorkStatus::InProgress | WorkStatus::Blocked)
    }

    pub fn is_completed(&self) -> bool {
        self.status == WorkStatus::Completed
    }
}

/// Reusable work definition supplied by scenario content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkTemplate {
    pub title: String,
    pub description: String,
    pub estimated_effort: u32,
    pub required_resources: AHashMap<String, Amount>,
    pub priority: u8,
}

impl WorkTemplate {
    pub fn instantiate(&self, created_at: Tick) -> Result<WorkItem> {
        WorkItem::new(
            &self.title,
            &self.description,
            self.estimated_effort,
            self.required_resources.clone(),
            self.priority,
            created_at,
        )
    }
}

/// Controls legal transitions of work state
pub struct WorkStateMachine;

impl WorkStateMachine {
    fn allowed(from: WorkStatus, to: WorkStatus) -> bool {
        use WorkStatus::*;
        matches!(
            (from, to),
            (Pending, InProgress)
                | (InProgress, Blocked)
                | (InProgress, Completed)
                | (Blocked, InProgress)
        )
    }

    /// Move a work item to `new_state` at `current_time`.
    ///
    /// Rejects edges absent from the transition table, transitions
    /// before creation time, restarting already-started work, and
    /// completing work that never started.
    pub fn transition(
        item: &mut WorkItem,
        new_state: WorkStatus,
        current_time: Tick,
    ) -> Result<()> {
        if !Self::allowed(item.status, new_state) {
            return Err(SimError::InvalidWorkTransition {
                from: item.status,
                to: new_state,
            });
        }
        if current_time < item.created_at {
            return Err(SimError::Work(
                "work cannot transition before it is created".to_string(),
            ));
        }

        if new_state == WorkStatus::InProgress && item.status == WorkStatus::Pending {
            if item.started_at.is_some() {
                return Err(SimError::Work(
                    "work has already been started".to_string(),
                ));
            }
            item.started_at = Some(current_time);
        }

        if new_state == WorkStatus::Completed {
            if item.started_at.is_none() {
                return Err(SimError::Work(
                    "cannot complete work that never started".to_string(),
                ));
            }
            item.completed_at = Some(current_time);
        }

        item.status = new_state;
        Ok(())
    }
}
