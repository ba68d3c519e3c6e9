//! Write sequencing and cache invalidation.
//!
//! Every write goes through [`MutationOrchestrator::run`], which awaits the
//! server's answer and, only when it succeeds, marks the affected cache
//! keys stale before handing the entity back. A failed write leaves the
//! cache exactly as it was.

use std::future::Future;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::domain::errors::{ClientError, ClientResult};
use crate::domain::models::{
    Agent, AgentCreateRequest, AgentGenerateRequest, AgentUpdateRequest, Simulation,
    SimulationCreateRequest,
};
use crate::domain::ports::{AgentRepository, SimulationRepository};
use crate::services::cache::{EntityFamily, Invalidation, QueryCache};

/// Result of the two-step create-then-start workflow.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateAndRunOutcome {
    /// Nothing was created; `start` was never issued.
    CreateFailed { error: ClientError },
    /// The simulation exists in `pending` state but could not be started.
    StartFailed {
        created: Simulation,
        error: ClientError,
    },
    /// The simulation was created and accepted for execution.
    Started { simulation: Simulation },
}

impl CreateAndRunOutcome {
    /// The simulation left on the server, if any.
    pub const fn simulation(&self) -> Option<&Simulation> {
        match self {
            Self::CreateFailed { .. } => None,
            Self::StartFailed { created, .. } => Some(created),
            Self::Started { simulation } => Some(simulation),
        }
    }

    pub const fn error(&self) -> Option<&ClientError> {
        match self {
            Self::CreateFailed { error } | Self::StartFailed { error, .. } => Some(error),
            Self::Started { .. } => None,
        }
    }

    pub const fn is_started(&self) -> bool {
        matches!(self, Self::Started { .. })
    }
}

/// Executes writes against both resource families.
///
/// Inputs are expected to be validated by the caller; no semantic checks
/// happen here.
pub struct MutationOrchestrator<A: AgentRepository, S: SimulationRepository> {
    agents: Arc<A>,
    simulations: Arc<S>,
    cache: Arc<QueryCache>,
}

impl<A: AgentRepository, S: SimulationRepository> MutationOrchestrator<A, S> {
    pub fn new(agents: Arc<A>, simulations: Arc<S>, cache: Arc<QueryCache>) -> Self {
        Self {
            agents,
            simulations,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// Await `write`; on success apply `invalidations` before returning.
    pub async fn run<T, Fut>(
        &self,
        name: &str,
        invalidations: &[Invalidation],
        write: Fut,
    ) -> ClientResult<T>
    where
        Fut: Future<Output = ClientResult<T>>,
    {
        match write.await {
            Ok(value) => {
                for invalidation in invalidations {
                    self.cache.invalidate(invalidation).await;
                }
                info!(mutation = name, "mutation succeeded");
                Ok(value)
            }
            Err(error) => {
                warn!(mutation = name, error = %error, "mutation failed");
                Err(error)
            }
        }
    }

    pub async fn create_agent(&self, request: &AgentCreateRequest) -> ClientResult<Agent> {
        self.run(
            "create agent",
            &[Invalidation::List(EntityFamily::Agents)],
            self.agents.create(request),
        )
        .await
    }

    pub async fn generate_agent(&self, request: &AgentGenerateRequest) -> ClientResult<Agent> {
        self.run(
            "generate agent",
            &[Invalidation::List(EntityFamily::Agents)],
            self.agents.generate(request),
        )
        .await
    }

    pub async fn upload_agent(&self, file_name: &str, bytes: Vec<u8>) -> ClientResult<Agent> {
        self.run(
            "upload agent",
            &[Invalidation::List(EntityFamily::Agents)],
            self.agents.upload(file_name, bytes),
        )
        .await
    }

    pub async fn update_agent(&self, id: &str, request: &AgentUpdateRequest) -> ClientResult<Agent> {
        self.run(
            "update agent",
            &entity_and_list(EntityFamily::Agents, id),
            self.agents.update(id, request),
        )
        .await
    }

    pub async fn delete_agent(&self, id: &str) -> ClientResult<()> {
        self.run(
            "delete agent",
            &entity_and_list(EntityFamily::Agents, id),
            self.agents.delete(id),
        )
        .await
    }

    pub async fn create_simulation(
        &self,
        request: &SimulationCreateRequest,
    ) -> ClientResult<Simulation> {
        self.run(
            "create simulation",
            &[Invalidation::List(EntityFamily::Simulations)],
            self.simulations.create(request),
        )
        .await
    }

    pub async fn start_simulation(&self, id: &str) -> ClientResult<Simulation> {
        self.run(
            "start simulation",
            &entity_and_list(EntityFamily::Simulations, id),
            self.simulations.start(id),
        )
        .await
    }

    pub async fn delete_simulation(&self, id: &str) -> ClientResult<()> {
        self.run(
            "delete simulation",
            &entity_and_list(EntityFamily::Simulations, id),
            self.simulations.delete(id),
        )
        .await
    }

    /// Create a simulation and, only once that succeeded, start it.
    ///
    /// A failed start is not rolled back: the created simulation stays
    /// `pending` and can be started again later.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_and_run(&self, request: &SimulationCreateRequest) -> CreateAndRunOutcome {
        let created = match self.create_simulation(request).await {
            Ok(created) => created,
            Err(error) => return CreateAndRunOutcome::CreateFailed { error },
        };

        match self.start_simulation(&created.id).await {
            Ok(simulation) => CreateAndRunOutcome::Started { simulation },
            Err(error) => {
                warn!(
                    simulation_id = %created.id,
                    error = %error,
                    "simulation created but not started"
                );
                CreateAndRunOutcome::StartFailed { created, error }
            }
        }
    }
}

fn entity_and_list(family: EntityFamily, id: &str) -> [Invalidation; 2] {
    [
        Invalidation::List(family),
        Invalidation::Entity(family, id.to_string()),
    ]
}
