//! simsync - client-side lifecycle synchronization for agent simulations
//!
//! Drives a simulation server's agent and simulation resources over HTTP
//! and keeps a local, invalidation-based view of server state consistent
//! across multi-step and partially failing operations.
//!
//! # Architecture
//!
//! The crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): entity models, errors and port traits
//! - **Adapters** (`adapters`): REST repositories over the transport port
//! - **Infrastructure Layer** (`infrastructure`): HTTP transport, config, logging
//! - **Service Layer** (`services`): cache, mutations, status polling, export
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use simsync::adapters::rest::{RestAgentRepository, RestSimulationRepository};
//! use simsync::domain::models::{ApiConfig, EnvironmentType, SimulationConfig, SimulationCreateRequest};
//! use simsync::infrastructure::http::HttpTransport;
//! use simsync::services::{CreateAndRunOutcome, MutationOrchestrator, QueryCache, StatusPoller};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let transport = Arc::new(HttpTransport::new(&ApiConfig::default())?);
//! let agents = Arc::new(RestAgentRepository::new(Arc::clone(&transport)));
//! let simulations = Arc::new(RestSimulationRepository::new(transport));
//! let cache = Arc::new(QueryCache::new());
//!
//! let mutations = MutationOrchestrator::new(agents, Arc::clone(&simulations), Arc::clone(&cache));
//! let request = SimulationCreateRequest {
//!     name: "S1".to_string(),
//!     agent_ids: vec!["a1".to_string()],
//!     config: SimulationConfig::new(5, "discuss", EnvironmentType::ChatRoom),
//! };
//! request.validate()?;
//!
//! if let CreateAndRunOutcome::Started { simulation } = mutations.create_and_run(&request).await {
//!     let poller = StatusPoller::new(simulations, cache);
//!     let handle = poller.start_polling(simulation.id, |status| println!("{}", status.status));
//!     let _outcome = handle.join().await;
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{ClientError, ClientResult};
pub use domain::models::{
    Agent, Config, Simulation, SimulationCreateRequest, SimulationStatus,
    SimulationStatusResponse,
};
pub use domain::ports::{AgentRepository, SimulationRepository, Transport};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    CreateAndRunOutcome, MutationOrchestrator, PollHandle, PollOutcome, QueryCache, StatusPoller,
};
