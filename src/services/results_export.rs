//! Saving simulation results to disk and reading them back.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::domain::models::{Simulation, SimulationResult};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Simulation {0} has no result to export")]
    NoResult(String),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid result document: {0}")]
    Serde(#[from] serde_json::Error),
}

/// File name a simulation's result is exported under.
pub fn export_file_name(simulation_id: &str) -> String {
    format!("simulation-{simulation_id}.json")
}

/// Write the simulation's result as pretty JSON into `dir`.
///
/// Returns the path of the written file.
pub fn export_result(simulation: &Simulation, dir: &Path) -> Result<PathBuf, ExportError> {
    let result = simulation
        .result
        .as_ref()
        .ok_or_else(|| ExportError::NoResult(simulation.id.clone()))?;

    let path = dir.join(export_file_name(&simulation.id));
    let json = serde_json::to_string_pretty(result)?;
    fs::write(&path, json).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;

    info!(
        simulation_id = %simulation.id,
        interactions = result.interactions.len(),
        path = %path.display(),
        "exported simulation result"
    );
    Ok(path)
}

/// Parse a previously exported result file.
pub fn load_result(path: &Path) -> Result<SimulationResult, ExportError> {
    let raw = fs::read_to_string(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{EnvironmentType, SimulationConfig, SimulationStatus};

    fn pending() -> Simulation {
        Simulation {
            id: "s1".to_string(),
            name: "S1".to_string(),
            agent_ids: vec!["a1".to_string()],
            config: SimulationConfig::new(5, "discuss", EnvironmentType::ChatRoom),
            status: SimulationStatus::Pending,
            created_at: "2024-05-01T10:00:00".to_string(),
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
        }
    }

    #[test]
    fn test_export_without_result_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = export_result(&pending(), dir.path()).unwrap_err();
        assert!(matches!(err, ExportError::NoResult(id) if id == "s1"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("abc"), "simulation-abc.json");
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = load_result(&missing).unwrap_err();
        assert!(err.to_string().contains("nope.json"));
    }
}
