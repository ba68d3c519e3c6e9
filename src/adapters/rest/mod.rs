//! REST implementations of the repository ports.
//!
//! Thin typed wrappers over any [`Transport`](crate::domain::ports::Transport):
//! path construction and body shaping only.

pub mod agent_repository;
pub mod simulation_repository;

pub use agent_repository::RestAgentRepository;
pub use simulation_repository::RestSimulationRepository;

/// Build a resource path with a percent-encoded id segment.
pub(crate) fn entity_path(collection: &str, id: &str, action: Option<&str>) -> String {
    let encoded = urlencoding::encode(id);
    match action {
        Some(action) => format!("/{collection}/{encoded}/{action}"),
        None => format!("/{collection}/{encoded}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_path_encodes_id() {
        assert_eq!(entity_path("agents", "a1", None), "/agents/a1");
        assert_eq!(
            entity_path("simulations", "s 1/x", Some("start")),
            "/simulations/s%201%2Fx/start"
        );
    }
}
