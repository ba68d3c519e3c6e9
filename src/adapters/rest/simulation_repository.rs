//! REST adapter for the simulation resource family.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use super::entity_path;
use crate::domain::errors::ClientResult;
use crate::domain::models::{
    Simulation, SimulationCreateRequest, SimulationListResponse, SimulationStatusResponse,
};
use crate::domain::ports::{Method, SimulationRepository, Transport};

const SIMULATIONS: &str = "simulations";

/// Simulation repository over a [`Transport`].
pub struct RestSimulationRepository<T: Transport> {
    transport: Arc<T>,
}

impl<T: Transport> RestSimulationRepository<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl<T: Transport + 'static> SimulationRepository for RestSimulationRepository<T> {
    #[instrument(skip(self))]
    async fn list(&self) -> ClientResult<SimulationListResponse> {
        self.transport
            .send(Method::Get, "/simulations", None)
            .await?
            .decode()
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> ClientResult<Simulation> {
        self.transport
            .send(Method::Get, &entity_path(SIMULATIONS, id, None), None)
            .await?
            .decode()
    }

    #[instrument(skip(self, request), fields(name = %request.name, agents = request.agent_ids.len()))]
    async fn create(&self, request: &SimulationCreateRequest) -> ClientResult<Simulation> {
        let body = serde_json::to_value(request)?;
        self.transport
            .send(Method::Post, "/simulations", Some(body))
            .await?
            .decode()
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> ClientResult<()> {
        self.transport
            .send(Method::Delete, &entity_path(SIMULATIONS, id, None), None)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn start(&self, id: &str) -> ClientResult<Simulation> {
        self.transport
            .send(Method::Post, &entity_path(SIMULATIONS, id, Some("start")), None)
            .await?
            .decode()
    }

    #[instrument(skip(self))]
    async fn status(&self, id: &str) -> ClientResult<SimulationStatusResponse> {
        self.transport
            .send(Method::Get, &entity_path(SIMULATIONS, id, Some("status")), None)
            .await?
            .decode()
    }

    #[instrument(skip(self))]
    async fn results(&self, id: &str) -> ClientResult<Simulation> {
        self.transport
            .send(Method::Get, &entity_path(SIMULATIONS, id, Some("results")), None)
            .await?
            .decode()
    }
}
