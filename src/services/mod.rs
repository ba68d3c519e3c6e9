//! Service layer
//!
//! Coordinates the repositories with the shared entity cache:
//! - `cache`: snapshot store with scoped invalidation
//! - `agent_service` / `simulation_service`: read-through reads
//! - `mutation_orchestrator`: writes and the create-and-run workflow
//! - `status_poller`: background status polling until a terminal state
//! - `results_export`: result files on disk

pub mod agent_service;
pub mod cache;
pub mod mutation_orchestrator;
pub mod results_export;
pub mod simulation_service;
pub mod status_poller;

pub use agent_service::AgentService;
pub use cache::{CacheKey, EntityFamily, Invalidation, KeyScope, QueryCache, Snapshot};
pub use mutation_orchestrator::{CreateAndRunOutcome, MutationOrchestrator};
pub use results_export::{export_result, load_result, ExportError};
pub use simulation_service::SimulationService;
pub use status_poller::{PollHandle, PollOutcome, StatusPoller};
