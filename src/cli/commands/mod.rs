//! CLI command implementations.

pub mod agent;
pub mod health;
pub mod simulation;
