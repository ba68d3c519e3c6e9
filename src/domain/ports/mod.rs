//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that infrastructure adapters must implement:
//! - Transport: request/response exchanges with the simulation server
//! - AgentRepository: agent resource operations
//! - SimulationRepository: simulation resource operations

pub mod agent_repository;
pub mod simulation_repository;
pub mod transport;

pub use agent_repository::AgentRepository;
pub use simulation_repository::SimulationRepository;
pub use transport::{Method, Transport, TransportResponse};
