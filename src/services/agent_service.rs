//! Cached reads of the agent resource family.

use std::sync::Arc;

use crate::domain::errors::ClientResult;
use crate::domain::models::{Agent, AgentListResponse, FragmentListResponse};
use crate::domain::ports::AgentRepository;
use crate::services::cache::{CacheKey, EntityFamily, QueryCache};

pub struct AgentService<R: AgentRepository> {
    repository: Arc<R>,
    cache: Arc<QueryCache>,
}

impl<R: AgentRepository> AgentService<R> {
    pub fn new(repository: Arc<R>, cache: Arc<QueryCache>) -> Self {
        Self { repository, cache }
    }

    /// List all agents, served from the cache while fresh.
    pub async fn list(&self) -> ClientResult<AgentListResponse> {
        self.cache
            .read_through(CacheKey::list(EntityFamily::Agents), || self.repository.list())
            .await
    }

    /// Get an agent by id.
    pub async fn get(&self, id: &str) -> ClientResult<Agent> {
        self.cache
            .read_through(CacheKey::detail(EntityFamily::Agents, id), || {
                self.repository.get(id)
            })
            .await
    }

    /// Memory fragments recorded for an agent.
    pub async fn fragments(&self, id: &str) -> ClientResult<FragmentListResponse> {
        self.cache
            .read_through(CacheKey::fragments(id), || self.repository.list_fragments(id))
            .await
    }
}
