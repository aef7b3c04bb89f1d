use thiserror::Error;

use crate::core::types::DecisionId;
use crate::work::WorkStatus;

/// All failure modes of the simulation core.
///
/// `Halt` is the only variant the engine intercepts: it force-ends the
/// session (evidence preserved) and re-raises. Everything else
/// propagates to the engine's caller untouched.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid session state: {0}")]
    InvalidState(String),

    #[error("Time error: {0}")]
    Time(String),

    #[error("Work error: {0}")]
    Work(String),

    #[error("Illegal work transition from '{from}' to '{to}'")]
    InvalidWorkTransition { from: WorkStatus, to: WorkStatus },

    #[error("Insufficient resource '{name}': requested {requested}, available {available}")]
    InsufficientResource {
        name: String,
        requested: i64,
        available: i64,
    },

    #[error("Resource error: {0}")]
    Resource(String),

    #[error("Decision error: {0}")]
    Decision(String),

    #[error("Decision {0:?} has already been made")]
    DecisionAlreadyMade(DecisionId),

    #[error("Event error: {0}")]
    Event(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Simulation halted: {0}")]
    Halt(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
