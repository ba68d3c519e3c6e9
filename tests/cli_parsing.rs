use clap::Parser;

use simsync::cli::commands::agent::AgentCommands;
use simsync::cli::commands::simulation::SimulationCommands;
use simsync::cli::{Cli, Commands};
use simsync::domain::models::EnvironmentType;
use simsync::ClientError;

#[test]
fn test_parse_sim_run_with_wait() {
    let cli = Cli::try_parse_from([
        "simsync", "sim", "run", "--name", "S1", "--agent", "a1", "--agent", "a2", "--prompt",
        "discuss pricing", "--env", "focus-group", "--wait",
    ])
    .unwrap();

    match cli.command {
        Commands::Sim(args) => match args.command {
            SimulationCommands::Run { simulation, wait } => {
                assert!(wait);
                assert_eq!(simulation.agents, vec!["a1", "a2"]);
                assert_eq!(simulation.steps, 5);
                assert_eq!(simulation.environment, EnvironmentType::FocusGroup);

                let request = simulation.into_request().unwrap();
                assert_eq!(request.config.initial_prompt, "discuss pricing");
                assert_eq!(request.config.parallel_actions, Some(true));
                assert_eq!(request.config.cache_enabled, Some(false));
            }
            other => panic!("Wrong simulation command: {other:?}"),
        },
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_sim_create_requires_an_agent() {
    let result = Cli::try_parse_from(["simsync", "sim", "create", "--name", "S1", "--prompt", "hi"]);
    assert!(result.is_err());
}

#[test]
fn test_out_of_range_steps_fail_validation_before_any_request() {
    let cli = Cli::try_parse_from([
        "simsync", "simulation", "create", "-n", "S1", "-a", "a1", "-p", "hi", "--steps", "51",
    ])
    .unwrap();

    let Commands::Sim(args) = cli.command else {
        panic!("Wrong top-level command");
    };
    let SimulationCommands::Create(simulation) = args.command else {
        panic!("Wrong simulation command");
    };
    let err = simulation.into_request().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ClientError>(),
        Some(ClientError::ValidationRejected(_))
    ));
}

#[test]
fn test_parse_sim_watch_many_ids() {
    let cli = Cli::try_parse_from(["simsync", "--json", "sim", "watch", "s1", "s2", "s3"]).unwrap();

    assert!(cli.json);
    match cli.command {
        Commands::Sim(args) => match args.command {
            SimulationCommands::Watch { ids } => assert_eq!(ids, vec!["s1", "s2", "s3"]),
            other => panic!("Wrong simulation command: {other:?}"),
        },
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_agent_create_defaults() {
    let cli = Cli::try_parse_from(["simsync", "agent", "create", "--name", "Lisa"]).unwrap();

    match cli.command {
        Commands::Agent(args) => match args.command {
            AgentCommands::Create {
                agent_type,
                name,
                persona_file,
            } => {
                assert_eq!(agent_type, "TinyPerson");
                assert_eq!(name.as_deref(), Some("Lisa"));
                assert!(persona_file.is_none());
            }
            other => panic!("Wrong agent command: {other:?}"),
        },
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_agent_create_needs_name_or_persona_file() {
    assert!(Cli::try_parse_from(["simsync", "agent", "create"]).is_err());
    assert!(
        Cli::try_parse_from(["simsync", "agent", "create", "--persona-file", "lisa.json"]).is_ok()
    );
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "simsync", "health", "--base-url", "http://10.0.0.5:9000", "--config", "ci.yaml",
    ])
    .unwrap();

    assert!(matches!(cli.command, Commands::Health));
    assert_eq!(cli.base_url.as_deref(), Some("http://10.0.0.5:9000"));
    assert_eq!(cli.config.unwrap().to_str(), Some("ci.yaml"));
}

#[test]
fn test_sequential_flag_turns_parallel_actions_off() {
    let cli = Cli::try_parse_from([
        "simsync", "sim", "create", "-n", "S1", "-a", "a1", "-p", "discuss", "--sequential",
    ])
    .unwrap();

    let Commands::Sim(args) = cli.command else {
        panic!("Wrong top-level command");
    };
    let SimulationCommands::Create(simulation) = args.command else {
        panic!("Wrong simulation command");
    };
    let request = simulation.into_request().unwrap();
    assert_eq!(request.config.parallel_actions, Some(false));
    assert_eq!(request.config.cache_enabled, Some(false));
}
