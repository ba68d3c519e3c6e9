use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::{ClientError, ClientResult};

/// Smallest and largest step counts the server accepts.
pub const MIN_STEPS: u32 = 1;
pub const MAX_STEPS: u32 = 50;

/// Lifecycle state of a simulation.
///
/// `Pending -> Running -> Completed | Failed`. Only the server advances a
/// running simulation; the client observes it through polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl SimulationStatus {
    /// Completed and failed simulations never transition again.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SimulationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimulationStatus {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(ClientError::validation(format!("Invalid simulation status: {s}"))),
        }
    }
}

/// Kind of environment the agents interact in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentType {
    #[default]
    ChatRoom,
    FocusGroup,
    Interview,
    Custom,
}

impl EnvironmentType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ChatRoom => "chat_room",
            Self::FocusGroup => "focus_group",
            Self::Interview => "interview",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for EnvironmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvironmentType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "chat_room" => Ok(Self::ChatRoom),
            "focus_group" => Ok(Self::FocusGroup),
            "interview" => Ok(Self::Interview),
            "custom" => Ok(Self::Custom),
            _ => Err(ClientError::validation(format!("Invalid environment type: {s}"))),
        }
    }
}

/// Parameters of a simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub steps: u32,
    pub initial_prompt: String,
    #[serde(default)]
    pub environment_type: EnvironmentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel_actions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_enabled: Option<bool>,
}

impl SimulationConfig {
    pub fn new(steps: u32, initial_prompt: impl Into<String>, environment_type: EnvironmentType) -> Self {
        Self {
            steps,
            initial_prompt: initial_prompt.into(),
            environment_type,
            parallel_actions: None,
            cache_enabled: None,
        }
    }
}

/// Body of `POST /simulations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationCreateRequest {
    pub name: String,
    pub agent_ids: Vec<String>,
    pub config: SimulationConfig,
}

impl SimulationCreateRequest {
    /// Trim the free-text fields the way the server expects them.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.config.initial_prompt = self.config.initial_prompt.trim().to_string();
        self
    }

    /// Caller-side preconditions; run before any request is issued.
    pub fn validate(&self) -> ClientResult<()> {
        if self.name.trim().is_empty() {
            return Err(ClientError::validation("simulation name must not be empty"));
        }
        if self.agent_ids.is_empty() {
            return Err(ClientError::validation("select at least one agent"));
        }
        if self.agent_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(ClientError::validation("agent ids must not be blank"));
        }
        if self.config.initial_prompt.trim().is_empty() {
            return Err(ClientError::validation("initial prompt must not be empty"));
        }
        if !(MIN_STEPS..=MAX_STEPS).contains(&self.config.steps) {
            return Err(ClientError::validation(format!(
                "steps must be between {MIN_STEPS} and {MAX_STEPS}, got {}",
                self.config.steps
            )));
        }
        Ok(())
    }
}

/// One message exchanged during a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionMessage {
    pub timestamp: String,
    pub agent_id: String,
    pub agent_name: String,
    pub message_type: String,
    pub content: String,
}

/// Outcome of a completed simulation.
///
/// `interactions` keeps the server's chronological order verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    #[serde(default)]
    pub interactions: Vec<InteractionMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_data: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Simulation entity as reported by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    pub id: String,
    pub name: String,
    pub agent_ids: Vec<String>,
    pub config: SimulationConfig,
    pub status: SimulationStatus,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<SimulationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Simulation {
    /// Check the result/error exclusivity the server guarantees.
    ///
    /// `result` only accompanies `completed`, `error` only `failed`.
    pub fn is_consistent(&self) -> bool {
        let result_ok = self.result.is_none() || self.status == SimulationStatus::Completed;
        let error_ok = self.error.is_none() || self.status == SimulationStatus::Failed;
        result_ok && error_ok
    }
}

/// Response of `GET /simulations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationListResponse {
    pub simulations: Vec<Simulation>,
    pub total: usize,
}

/// Response of `GET /simulations/{id}/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStatusResponse {
    pub id: String,
    pub status: SimulationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_steps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SimulationStatusResponse {
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Progress for display, `0..=100`; missing values count as zero.
    pub fn progress_percent(&self) -> u8 {
        self.progress.unwrap_or(0).min(100)
    }

    /// `(current, total)` step counts, falling back to the configured
    /// step count when the server omits the total.
    pub fn step_counts(&self, configured_steps: u32) -> (u32, u32) {
        (
            self.current_step.unwrap_or(0),
            self.total_steps.unwrap_or(configured_steps),
        )
    }
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Response of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub status: String,
    #[serde(default)]
    pub api_configured: bool,
    #[serde(default)]
    pub api_type: Option<String>,
}

/// Parse a server timestamp.
///
/// The server emits naive ISO-8601 UTC timestamps; RFC 3339 with an
/// offset is accepted as well.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
