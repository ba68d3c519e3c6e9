//! Agent repository port.

use async_trait::async_trait;

use crate::domain::errors::ClientResult;
use crate::domain::models::{
    Agent, AgentCreateRequest, AgentGenerateRequest, AgentListResponse, AgentUpdateRequest,
    FragmentListResponse,
};

/// Typed access to the agent resource family.
///
/// Reads are idempotent. Writes execute at most once per call; there is
/// no retry at this layer.
#[async_trait]
pub trait AgentRepository: Send + Sync {
    /// `GET /agents`
    async fn list(&self) -> ClientResult<AgentListResponse>;

    /// `GET /agents/{id}`
    async fn get(&self, id: &str) -> ClientResult<Agent>;

    /// `POST /agents`
    async fn create(&self, request: &AgentCreateRequest) -> ClientResult<Agent>;

    /// `PUT /agents/{id}` with only the fields to change.
    async fn update(&self, id: &str, request: &AgentUpdateRequest) -> ClientResult<Agent>;

    /// `DELETE /agents/{id}`
    async fn delete(&self, id: &str) -> ClientResult<()>;

    /// `POST /agents/generate` - build an agent from a natural-language description.
    async fn generate(&self, request: &AgentGenerateRequest) -> ClientResult<Agent>;

    /// `POST /agents/upload` - import an agent definition file.
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> ClientResult<Agent>;

    /// `GET /agents/{id}/fragments`
    async fn list_fragments(&self, id: &str) -> ClientResult<FragmentListResponse>;
}
