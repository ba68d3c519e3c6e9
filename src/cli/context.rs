//! Wiring of the client stack for one CLI invocation.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::adapters::rest::{RestAgentRepository, RestSimulationRepository};
use crate::domain::models::Config;
use crate::infrastructure::http::HttpTransport;
use crate::services::{AgentService, MutationOrchestrator, QueryCache, SimulationService, StatusPoller};

type Agents = RestAgentRepository<HttpTransport>;
type Simulations = RestSimulationRepository<HttpTransport>;

/// Every service a command may need, sharing one transport and one cache.
pub struct CliContext {
    pub config: Config,
    pub transport: Arc<HttpTransport>,
    pub agents: AgentService<Agents>,
    pub simulations: SimulationService<Simulations>,
    pub mutations: MutationOrchestrator<Agents, Simulations>,
    pub poller: StatusPoller<Simulations>,
}

impl CliContext {
    pub fn new(config: Config) -> Result<Self> {
        let transport = Arc::new(
            HttpTransport::new(&config.api).context("Failed to build HTTP client")?,
        );
        let cache = Arc::new(QueryCache::from_config(&config.cache));
        let agent_repo = Arc::new(RestAgentRepository::new(Arc::clone(&transport)));
        let simulation_repo = Arc::new(RestSimulationRepository::new(Arc::clone(&transport)));

        Ok(Self {
            agents: AgentService::new(Arc::clone(&agent_repo), Arc::clone(&cache)),
            simulations: SimulationService::new(Arc::clone(&simulation_repo), Arc::clone(&cache)),
            mutations: MutationOrchestrator::new(
                agent_repo,
                Arc::clone(&simulation_repo),
                Arc::clone(&cache),
            ),
            poller: StatusPoller::with_config(simulation_repo, cache, &config.poller),
            transport,
            config,
        })
    }
}
