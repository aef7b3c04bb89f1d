//! Simulation clock - authoritative, monotonic time ledger
//!
//! Time only moves forward, and every advance is recorded with a
//! reason. The advance history is itself evidence: why time moved and
//! by how much.

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::Tick;

/// Immutable record of a single time advancement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeTick {
    pub from_time: Tick,
    pub to_time: Tick,
    pub reason: String,
}

/// Monotonic time controller for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationClock {
    current_time: Tick,
    history: Vec<TimeTick>,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self {
            current_time: 0,
            history: Vec::new(),
        }
    }

    /// Rebuild a clock from persisted state (snapshot restore path)
    pub fn from_parts(current_time: Tick, history: Vec<TimeTick>) -> Self {
        Self {
            current_time,
            history,
        }
    }

    /// Current simulation time (abstract units)
    pub fn now(&self) -> Tick {
        self.current_time
    }

    /// Full advance history, oldest first
    pub fn history(&self) -> &[TimeTick] {
        &self.history
    }

    /// Advance time by `delta` units, recording why.
    ///
    /// Fails on a non-positive delta or a blank reason; on success the
    /// clock strictly increases.
    pub fn advance(&mut self, delta: Tick, reason: &str) -> Result<()> {
        if delta == 0 {
            return Err(SimError::Time(
                "time advance must be a positive number of units".to_string(),
            ));
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(SimError::Time(
                "time advance requires a meaningful reason".to_string(),
            ));
        }

        let from_time = self.current_time;
        let to_time = from_time + delta;

        self.history.push(TimeTick {
            from_time,
            to_time,
            reason: reason.to_string(),
        });
        self.current_time = to_time;

        Ok(())
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new()
    }
}
