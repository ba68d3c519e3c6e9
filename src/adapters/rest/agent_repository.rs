//! REST adapter for the agent resource family.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use super::entity_path;
use crate::domain::errors::ClientResult;
use crate::domain::models::{
    Agent, AgentCreateRequest, AgentGenerateRequest, AgentListResponse, AgentUpdateRequest,
    FragmentListResponse,
};
use crate::domain::ports::{AgentRepository, Method, Transport};

const AGENTS: &str = "agents";

/// Agent repository over a [`Transport`].
pub struct RestAgentRepository<T: Transport> {
    transport: Arc<T>,
}

impl<T: Transport> RestAgentRepository<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl<T: Transport + 'static> AgentRepository for RestAgentRepository<T> {
    #[instrument(skip(self))]
    async fn list(&self) -> ClientResult<AgentListResponse> {
        self.transport
            .send(Method::Get, "/agents", None)
            .await?
            .decode()
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> ClientResult<Agent> {
        self.transport
            .send(Method::Get, &entity_path(AGENTS, id, None), None)
            .await?
            .decode()
    }

    #[instrument(skip(self, request), fields(agent_type = %request.agent_type))]
    async fn create(&self, request: &AgentCreateRequest) -> ClientResult<Agent> {
        let body = serde_json::to_value(request)?;
        self.transport
            .send(Method::Post, "/agents", Some(body))
            .await?
            .decode()
    }

    #[instrument(skip(self, request))]
    async fn update(&self, id: &str, request: &AgentUpdateRequest) -> ClientResult<Agent> {
        let body = serde_json::to_value(request)?;
        self.transport
            .send(Method::Put, &entity_path(AGENTS, id, None), Some(body))
            .await?
            .decode()
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> ClientResult<()> {
        self.transport
            .send(Method::Delete, &entity_path(AGENTS, id, None), None)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, request))]
    async fn generate(&self, request: &AgentGenerateRequest) -> ClientResult<Agent> {
        let body = serde_json::to_value(request)?;
        self.transport
            .send(Method::Post, "/agents/generate", Some(body))
            .await?
            .decode()
    }

    #[instrument(skip(self, bytes))]
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> ClientResult<Agent> {
        self.transport
            .upload("/agents/upload", file_name, bytes)
            .await?
            .decode()
    }

    #[instrument(skip(self))]
    async fn list_fragments(&self, id: &str) -> ClientResult<FragmentListResponse> {
        self.transport
            .send(Method::Get, &entity_path(AGENTS, id, Some("fragments")), None)
            .await?
            .decode()
    }
}
