//! Engine configuration with documented constants
//!
//! All tuning knobs for the tick pipeline are collected here with
//! explanations of their purpose.

/// Configuration for the simulation engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum decisions recorded per tick
    ///
    /// Rule evaluators can surface many proposals in one tick; anything
    /// beyond this cap is dropped for the tick and may be re-proposed
    /// later. Keeps a single tick's decision load reviewable by one
    /// actor.
    pub max_decisions_per_tick: usize,

    /// Audit reason stamped on every engine-driven clock advance
    ///
    /// Each tick advances time by exactly one unit; the clock ledger
    /// needs a reason for every advance, and this is the one the
    /// engine uses.
    pub tick_reason: String,

    /// Seed for industry modules that schedule events deterministically
    ///
    /// Same seed + same actor inputs = same run. Forensic replay
    /// depends on this.
    pub event_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_decisions_per_tick: 3,
            tick_reason: "engine tick".to_string(),
            event_seed: 12345,
        }
    }
}
