//! Mossgard Simulation
//!
//! Headless driver: loads behaviour trees and a tuning config, spawns
//! the configured populations, and runs the world tick by tick while
//! logging every action to JSONL.

pub mod config;
pub mod logger;
pub mod runner;

pub use config::SimConfig;
pub use logger::{ActionLogger, ActionRecord};
pub use runner::{RunError, RunSummary, Runner};
