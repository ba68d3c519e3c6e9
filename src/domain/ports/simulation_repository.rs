//! Simulation repository port.

use async_trait::async_trait;

use crate::domain::errors::ClientResult;
use crate::domain::models::{
    Simulation, SimulationCreateRequest, SimulationListResponse, SimulationStatusResponse,
};

/// Typed access to the simulation resource family.
#[async_trait]
pub trait SimulationRepository: Send + Sync {
    /// `GET /simulations`
    async fn list(&self) -> ClientResult<SimulationListResponse>;

    /// `GET /simulations/{id}`
    async fn get(&self, id: &str) -> ClientResult<Simulation>;

    /// `POST /simulations` - the new simulation starts out `pending`.
    async fn create(&self, request: &SimulationCreateRequest) -> ClientResult<Simulation>;

    /// `DELETE /simulations/{id}`
    async fn delete(&self, id: &str) -> ClientResult<()>;

    /// `POST /simulations/{id}/start` - moves a pending simulation to `running`.
    async fn start(&self, id: &str) -> ClientResult<Simulation>;

    /// `GET /simulations/{id}/status`
    async fn status(&self, id: &str) -> ClientResult<SimulationStatusResponse>;

    /// `GET /simulations/{id}/results`
    async fn results(&self, id: &str) -> ClientResult<Simulation>;
}
