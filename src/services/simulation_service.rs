//! Cached reads of the simulation resource family.

use std::sync::Arc;
use tracing::warn;

use crate::domain::errors::ClientResult;
use crate::domain::models::{Simulation, SimulationListResponse, SimulationStatusResponse};
use crate::domain::ports::SimulationRepository;
use crate::services::cache::{CacheKey, EntityFamily, QueryCache};

pub struct SimulationService<R: SimulationRepository> {
    repository: Arc<R>,
    cache: Arc<QueryCache>,
}

impl<R: SimulationRepository> SimulationService<R> {
    pub fn new(repository: Arc<R>, cache: Arc<QueryCache>) -> Self {
        Self { repository, cache }
    }

    /// List all simulations, served from the cache while fresh.
    pub async fn list(&self) -> ClientResult<SimulationListResponse> {
        self.cache
            .read_through(CacheKey::list(EntityFamily::Simulations), || {
                self.repository.list()
            })
            .await
    }

    /// Get a simulation by id.
    pub async fn get(&self, id: &str) -> ClientResult<Simulation> {
        self.cache
            .read_through(CacheKey::detail(EntityFamily::Simulations, id), || {
                self.repository.get(id)
            })
            .await
    }

    /// Read the current status from the server and record it.
    ///
    /// Status changes on the server without any client write, so this
    /// never answers from the cache.
    pub async fn status(&self, id: &str) -> ClientResult<SimulationStatusResponse> {
        let status = self.repository.status(id).await?;
        self.cache.put(CacheKey::status(id), &status).await;
        Ok(status)
    }

    /// Last status recorded by a read or a poll, if any.
    pub async fn cached_status(&self, id: &str) -> Option<SimulationStatusResponse> {
        self.cache
            .peek::<SimulationStatusResponse>(&CacheKey::status(id))
            .await
            .map(|snapshot| snapshot.value)
    }

    /// Fetch the simulation together with its result and refresh the detail view.
    pub async fn results(&self, id: &str) -> ClientResult<Simulation> {
        let simulation = self.repository.results(id).await?;
        if !simulation.is_consistent() {
            warn!(
                simulation_id = %simulation.id,
                status = %simulation.status,
                has_result = simulation.result.is_some(),
                has_error = simulation.error.is_some(),
                "result and error do not match the simulation status"
            );
        }
        self.cache
            .put(CacheKey::detail(EntityFamily::Simulations, id), &simulation)
            .await;
        Ok(simulation)
    }
}
