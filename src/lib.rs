//! Worksim - Tick-Driven Work Simulation Engine

pub mod clock;
pub mod cohort;
pub mod content;
pub mod core;
pub mod decision;
pub mod engine;
pub mod event;
pub mod evidence;
pub mod industry;
pub mod resource;
pub mod session;
pub mod snapshot;
pub mod work;
