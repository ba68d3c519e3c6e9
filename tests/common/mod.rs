//! Common test utilities for integration tests
//!
//! In-memory repositories that behave like the simulation server, plus
//! fixtures shared across test files.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use simsync::domain::models::{
    Agent, AgentCreateRequest, AgentGenerateRequest, AgentListResponse, AgentUpdateRequest,
    EnvironmentType, FragmentListResponse, InteractionMessage, Persona, Simulation,
    SimulationConfig, SimulationCreateRequest, SimulationListResponse, SimulationResult,
    SimulationStatus, SimulationStatusResponse,
};
use simsync::domain::ports::{AgentRepository, SimulationRepository};
use simsync::{ClientError, ClientResult};

const NOW: &str = "2024-05-01T10:00:00.000000";

/// Setup test logging
#[allow(dead_code)]
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn not_found(kind: &str, id: &str) -> ClientError {
    ClientError::request_failed(format!("{kind} with ID {id} not found"), 404)
}

/// The request used throughout the lifecycle scenarios.
pub fn s1_request() -> SimulationCreateRequest {
    SimulationCreateRequest {
        name: "S1".to_string(),
        agent_ids: vec!["a1".to_string()],
        config: SimulationConfig::new(5, "discuss", EnvironmentType::ChatRoom),
    }
}

pub fn status(id: &str, status: SimulationStatus, progress: u8) -> SimulationStatusResponse {
    SimulationStatusResponse {
        id: id.to_string(),
        status,
        progress: Some(progress),
        current_step: Some(u32::from(progress) / 20),
        total_steps: Some(5),
        message: None,
    }
}

pub fn running(id: &str, progress: u8) -> ClientResult<SimulationStatusResponse> {
    Ok(status(id, SimulationStatus::Running, progress))
}

pub fn completed(id: &str) -> ClientResult<SimulationStatusResponse> {
    Ok(status(id, SimulationStatus::Completed, 100))
}

pub fn server_error() -> ClientResult<SimulationStatusResponse> {
    Err(ClientError::request_failed("Internal Server Error", 500))
}

pub fn sample_result() -> SimulationResult {
    let mut extracted = serde_json::Map::new();
    extracted.insert("consensus".to_string(), serde_json::json!(false));
    extracted.insert("topics".to_string(), serde_json::json!(["pricing", "design"]));

    SimulationResult {
        interactions: vec![
            InteractionMessage {
                timestamp: "2024-05-01T10:00:01.000001".to_string(),
                agent_id: "a1".to_string(),
                agent_name: "Lisa".to_string(),
                message_type: "talk".to_string(),
                content: "I think the price is too high.".to_string(),
            },
            InteractionMessage {
                timestamp: "2024-05-01T10:00:02.000002".to_string(),
                agent_id: "a2".to_string(),
                agent_name: "Oscar".to_string(),
                message_type: "think".to_string(),
                content: "She has a point.".to_string(),
            },
        ],
        summary: Some("Two agents discussed pricing.".to_string()),
        extracted_data: Some(extracted),
    }
}

pub fn completed_simulation(id: &str) -> Simulation {
    Simulation {
        id: id.to_string(),
        name: "S1".to_string(),
        agent_ids: vec!["a1".to_string(), "a2".to_string()],
        config: SimulationConfig::new(5, "discuss", EnvironmentType::FocusGroup),
        status: SimulationStatus::Completed,
        created_at: NOW.to_string(),
        started_at: Some(NOW.to_string()),
        completed_at: Some(NOW.to_string()),
        result: Some(sample_result()),
        error: None,
    }
}

#[derive(Default)]
struct SimulationState {
    simulations: BTreeMap<String, Simulation>,
    scripts: HashMap<String, VecDeque<ClientResult<SimulationStatusResponse>>>,
    status_calls: HashMap<String, usize>,
    fail_create: Option<ClientError>,
    fail_start: Option<ClientError>,
    next_id: usize,
}

/// Simulation server held in memory.
///
/// Status reads follow a per-id script; the last scripted entry repeats.
/// A scripted terminal status also settles the stored simulation.
#[derive(Default)]
pub struct FakeSimulationRepository {
    state: Mutex<SimulationState>,
    pub list_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub start_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl FakeSimulationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_create_with(&self, error: ClientError) {
        self.state.lock().unwrap().fail_create = Some(error);
    }

    pub fn fail_start_with(&self, error: ClientError) {
        self.state.lock().unwrap().fail_start = Some(error);
    }

    pub fn script_statuses(
        &self,
        id: &str,
        statuses: Vec<ClientResult<SimulationStatusResponse>>,
    ) {
        self.state
            .lock()
            .unwrap()
            .scripts
            .insert(id.to_string(), statuses.into());
    }

    pub fn insert(&self, simulation: Simulation) {
        self.state
            .lock()
            .unwrap()
            .simulations
            .insert(simulation.id.clone(), simulation);
    }

    pub fn stored(&self, id: &str) -> Option<Simulation> {
        self.state.lock().unwrap().simulations.get(id).cloned()
    }

    pub fn status_calls_for(&self, id: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .status_calls
            .get(id)
            .copied()
            .unwrap_or(0)
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SimulationRepository for FakeSimulationRepository {
    async fn list(&self) -> ClientResult<SimulationListResponse> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        let simulations: Vec<Simulation> = state.simulations.values().cloned().collect();
        Ok(SimulationListResponse {
            total: simulations.len(),
            simulations,
        })
    }

    async fn get(&self, id: &str) -> ClientResult<Simulation> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.stored(id).ok_or_else(|| not_found("Simulation", id))
    }

    async fn create(&self, request: &SimulationCreateRequest) -> ClientResult<Simulation> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.fail_create.clone() {
            return Err(error);
        }
        state.next_id += 1;
        let simulation = Simulation {
            id: format!("sim-{}", state.next_id),
            name: request.name.clone(),
            agent_ids: request.agent_ids.clone(),
            config: request.config.clone(),
            status: SimulationStatus::Pending,
            created_at: NOW.to_string(),
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
        };
        state
            .simulations
            .insert(simulation.id.clone(), simulation.clone());
        Ok(simulation)
    }

    async fn delete(&self, id: &str) -> ClientResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        state
            .simulations
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("Simulation", id))
    }

    async fn start(&self, id: &str) -> ClientResult<Simulation> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.fail_start.clone() {
            return Err(error);
        }
        let simulation = state
            .simulations
            .get_mut(id)
            .ok_or_else(|| not_found("Simulation", id))?;
        if simulation.status != SimulationStatus::Pending {
            return Err(ClientError::request_failed(
                format!("Simulation is already {}", simulation.status),
                400,
            ));
        }
        simulation.status = SimulationStatus::Running;
        simulation.started_at = Some(NOW.to_string());
        Ok(simulation.clone())
    }

    async fn status(&self, id: &str) -> ClientResult<SimulationStatusResponse> {
        let mut state = self.state.lock().unwrap();
        *state.status_calls.entry(id.to_string()).or_insert(0) += 1;

        let scripted = match state.scripts.get_mut(id) {
            Some(script) if script.len() > 1 => script.pop_front(),
            Some(script) => script.front().cloned(),
            None => None,
        };

        let response = match scripted {
            Some(response) => response,
            None => {
                let simulation = state
                    .simulations
                    .get(id)
                    .ok_or_else(|| not_found("Simulation", id))?;
                Ok(status(id, simulation.status, 0))
            }
        };

        if let Ok(observed) = &response {
            if let Some(simulation) = state.simulations.get_mut(id) {
                simulation.status = observed.status;
                if observed.status == SimulationStatus::Completed {
                    simulation.completed_at = Some(NOW.to_string());
                    simulation.result.get_or_insert_with(sample_result);
                }
            }
        }
        response
    }

    async fn results(&self, id: &str) -> ClientResult<Simulation> {
        self.stored(id).ok_or_else(|| not_found("Simulation", id))
    }
}

#[derive(Default)]
struct AgentState {
    agents: BTreeMap<String, Agent>,
    fail_writes: Option<ClientError>,
    next_id: usize,
}

/// Agent server held in memory.
#[derive(Default)]
pub struct FakeAgentRepository {
    state: Mutex<AgentState>,
    pub list_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
}

impl FakeAgentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes_with(&self, error: ClientError) {
        self.state.lock().unwrap().fail_writes = Some(error);
    }

    fn insert_new(&self, agent_type: &str, persona: Persona) -> ClientResult<Agent> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.fail_writes.clone() {
            return Err(error);
        }
        state.next_id += 1;
        let agent = Agent {
            id: format!("agent-{}", state.next_id),
            agent_type: agent_type.to_string(),
            persona,
            created_at: Some(NOW.to_string()),
            updated_at: None,
        };
        state.agents.insert(agent.id.clone(), agent.clone());
        Ok(agent)
    }
}

#[async_trait]
impl AgentRepository for FakeAgentRepository {
    async fn list(&self) -> ClientResult<AgentListResponse> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        let agents: Vec<Agent> = state.agents.values().cloned().collect();
        Ok(AgentListResponse {
            total: agents.len(),
            agents,
        })
    }

    async fn get(&self, id: &str) -> ClientResult<Agent> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        state
            .agents
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("Agent", id))
    }

    async fn create(&self, request: &AgentCreateRequest) -> ClientResult<Agent> {
        self.insert_new(&request.agent_type, request.persona.clone())
    }

    async fn update(&self, id: &str, request: &AgentUpdateRequest) -> ClientResult<Agent> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.fail_writes.clone() {
            return Err(error);
        }
        let agent = state
            .agents
            .get_mut(id)
            .ok_or_else(|| not_found("Agent", id))?;
        if let Some(agent_type) = &request.agent_type {
            agent.agent_type.clone_from(agent_type);
        }
        if let Some(persona) = &request.persona {
            agent.persona = persona.clone();
        }
        agent.updated_at = Some(NOW.to_string());
        Ok(agent.clone())
    }

    async fn delete(&self, id: &str) -> ClientResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.fail_writes.clone() {
            return Err(error);
        }
        state
            .agents
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("Agent", id))
    }

    async fn generate(&self, request: &AgentGenerateRequest) -> ClientResult<Agent> {
        self.insert_new("TinyPerson", Persona::named(request.description.clone()))
    }

    async fn upload(&self, file_name: &str, _bytes: Vec<u8>) -> ClientResult<Agent> {
        let name = file_name.trim_end_matches(".json");
        self.insert_new("TinyPerson", Persona::named(name))
    }

    async fn list_fragments(&self, id: &str) -> ClientResult<FragmentListResponse> {
        let state = self.state.lock().unwrap();
        if state.agents.contains_key(id) {
            Ok(FragmentListResponse::default())
        } else {
            Err(not_found("Agent", id))
        }
    }
}
