use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::errors::{ClientError, ClientResult};

/// Big Five personality summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigFivePersonality {
    pub openness: String,
    pub conscientiousness: String,
    pub extraversion: String,
    pub agreeableness: String,
    pub neuroticism: String,
}

/// Personality traits of a persona.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalityTraits {
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub big_five: Option<BigFivePersonality>,
}

/// Occupation of a persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupation {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// Likes, dislikes and interests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dislikes: Option<Vec<String>>,
}

/// Habitual behaviors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Behaviors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routines: Option<BTreeMap<String, Vec<String>>>,
}

/// A named relationship to another person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Free-form descriptive record of an agent.
///
/// Only `name` is required. Fields the client does not model are kept in
/// `extra` so an update round-trips them unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_term_goals: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<Occupation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<PersonalityTraits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beliefs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behaviors: Option<Behaviors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Vec<Relationship>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_facts: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Persona {
    /// Create a persona with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Agent entity as reported by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    #[serde(rename = "type")]
    pub agent_type: String,
    pub persona: Persona,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Body of `POST /agents`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCreateRequest {
    #[serde(rename = "type")]
    pub agent_type: String,
    pub persona: Persona,
}

/// Body of `PUT /agents/{id}`; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentUpdateRequest {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<Persona>,
}

impl AgentUpdateRequest {
    /// True when the update would change nothing.
    pub const fn is_empty(&self) -> bool {
        self.agent_type.is_none() && self.persona.is_none()
    }
}

/// Body of `POST /agents/generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentGenerateRequest {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl AgentGenerateRequest {
    /// Build a trimmed request; a blank context is dropped.
    pub fn new(description: &str, context: Option<&str>) -> Self {
        Self {
            description: description.trim().to_string(),
            context: context
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(ToString::to_string),
        }
    }

    /// Reject requests the server would refuse before sending them.
    pub fn validate(&self) -> ClientResult<()> {
        if self.description.trim().is_empty() {
            return Err(ClientError::validation("agent description must not be empty"));
        }
        Ok(())
    }
}

/// Response of `GET /agents`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentListResponse {
    pub agents: Vec<Agent>,
    pub total: usize,
}

/// Response of `GET /agents/{id}/fragments`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentListResponse {
    #[serde(default)]
    pub fragments: Vec<String>,
    #[serde(default)]
    pub total: usize,
}

/// Check that an agent definition file can be uploaded.
///
/// The server only accepts JSON definitions.
pub fn validate_upload_file_name(file_name: &str) -> ClientResult<()> {
    let is_json = std::path::Path::new(file_name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(())
    } else {
        Err(ClientError::validation(format!(
            "agent definition must be a .json file: {file_name}"
        )))
    }
}
