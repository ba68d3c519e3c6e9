pub mod agent;
pub mod config;
pub mod simulation;

pub use agent::{
    validate_upload_file_name, Agent, AgentCreateRequest, AgentGenerateRequest,
    AgentListResponse, AgentUpdateRequest, Behaviors, BigFivePersonality, FragmentListResponse,
    Occupation, Persona, PersonalityTraits, Preferences, Relationship,
};
pub use config::{ApiConfig, CacheConfig, Config, LoggingConfig, PollerConfig};
pub use simulation::{
    parse_timestamp, EnvironmentType, HealthResponse, InteractionMessage, ServiceInfo, Simulation,
    SimulationConfig, SimulationCreateRequest, SimulationListResponse, SimulationResult,
    SimulationStatus, SimulationStatusResponse, MAX_STEPS, MIN_STEPS,
};
