use super::*;

#[test]
fn test_toml_parsing() {
    let toml = r#"
        environment_mode = "full_assert"
        random_seed = 42

        [termination]
        seconds_spent_limit = 60
        best_score_limit = "0hard/0soft"

        [[phases]]
        type = "construction_heuristic"
        construction_heuristic_type = "first_fit_decreasing"
        pick_early_type = "first_feasible_score"

        [[phases]]
        type = "local_search"

        [[phases.acceptors]]
        type = "entity_tabu"
        entity_tabu_size = 7

        [[phases.acceptors]]
        type = "simulated_annealing"
        starting_temperature = "2hard/100soft"

        [phases.forager]
        accepted_count_limit = 1000
        finalist_podium_type = "strategic_oscillation"
    "#;

    let config = SolverConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.environment_mode, EnvironmentMode::FullAssert);
    assert_eq!(config.random_seed, Some(42));
    assert_eq!(config.time_limit(), Some(Duration::from_secs(60)));
    assert_eq!(config.phases.len(), 2);

    match &config.phases[0] {
        PhaseConfig::ConstructionHeuristic(ch) => {
            assert_eq!(
                ch.construction_heuristic_type,
                ConstructionHeuristicType::FirstFitDecreasing
            );
            assert_eq!(
                ch.pick_early_type,
                Some(ConstructionPickEarlyType::FirstFeasibleScore)
            );
        }
        other => panic!("expected construction heuristic, got {:?}", other),
    }

    match &config.phases[1] {
        PhaseConfig::LocalSearch(ls) => {
            assert_eq!(ls.acceptors.len(), 2);
            assert_eq!(
                ls.acceptors[0],
                AcceptorConfig::EntityTabu(EntityTabuConfig {
                    entity_tabu_size: 7,
                    aspiration_enabled: true,
                })
            );
            let forager = ls.forager.as_ref().unwrap();
            assert_eq!(forager.accepted_count_limit, Some(1000));
            assert_eq!(
                forager.finalist_podium_type,
                Some(FinalistPodiumType::StrategicOscillation)
            );
        }
        other => panic!("expected local search, got {:?}", other),
    }
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
environment_mode: non_reproducible
move_thread_count: auto
termination:
  unimproved_step_count_limit: 100
  termination_composition_style: and
  step_count_limit: 1000
phases:
  - type: local_search
    acceptors:
      - type: late_acceptance
        late_acceptance_size: 50
        hill_climbing_enabled: false
      - type: hill_climbing
  - type: exhaustive_search
    exhaustive_search_type: brute_force
    node_limit: 10000
"#;

    let config = SolverConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.environment_mode, EnvironmentMode::NonReproducible);
    assert_eq!(config.move_thread_count, MoveThreadCount::Auto);

    let termination = config.termination.as_ref().unwrap();
    assert_eq!(termination.unimproved_step_count_limit, Some(100));
    assert_eq!(
        termination.termination_composition_style,
        TerminationCompositionStyle::And
    );

    match &config.phases[0] {
        PhaseConfig::LocalSearch(ls) => {
            assert_eq!(
                ls.acceptors[0],
                AcceptorConfig::LateAcceptance(LateAcceptanceConfig {
                    late_acceptance_size: Some(50),
                    hill_climbing_enabled: false,
                })
            );
            assert_eq!(ls.acceptors[1], AcceptorConfig::HillClimbing);
        }
        other => panic!("expected local search, got {:?}", other),
    }
    match &config.phases[1] {
        PhaseConfig::ExhaustiveSearch(es) => {
            assert_eq!(es.exhaustive_search_type, ExhaustiveSearchType::BruteForce);
            assert_eq!(es.node_limit, Some(10000));
        }
        other => panic!("expected exhaustive search, got {:?}", other),
    }
}

#[test]
fn test_phase_termination() {
    let config = SolverConfig::from_toml_str(
        r#"
        [[phases]]
        type = "construction_heuristic"

        [phases.termination]
        step_count_limit = 5
    "#,
    )
    .unwrap();

    let termination = config.phases[0].termination().unwrap();
    assert_eq!(termination.step_count_limit, Some(5));
    assert!(config.termination.is_none());
}

#[test]
fn test_defaults() {
    let config = SolverConfig::default();
    assert_eq!(config.environment_mode, EnvironmentMode::Reproducible);
    assert_eq!(config.move_thread_count, MoveThreadCount::None);
    assert!(config.termination.is_none());
    assert!(config.time_limit().is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn test_builders() {
    let config = SolverConfig::new()
        .with_termination_seconds(10)
        .with_random_seed(3)
        .with_environment_mode(EnvironmentMode::FastAssert)
        .with_phase(PhaseConfig::LocalSearch(LocalSearchConfig::default()));

    assert_eq!(config.time_limit(), Some(Duration::from_secs(10)));
    assert_eq!(config.random_seed, Some(3));
    assert!(config.environment_mode.is_asserted());
    assert!(!config.environment_mode.is_fully_asserted());
    assert_eq!(config.phases.len(), 1);
}

#[test]
fn test_termination_is_empty() {
    assert!(TerminationConfig::default().is_empty());

    let feasible = TerminationConfig {
        best_score_feasible: Some(true),
        ..Default::default()
    };
    assert!(!feasible.is_empty());
}

#[test]
fn test_unknown_phase_type_rejected() {
    let result = SolverConfig::from_toml_str(
        r#"
        [[phases]]
        type = "tabu_everything"
    "#,
    );
    assert!(matches!(result, Err(ConfigError::Toml(_))));
}

#[test]
fn test_zero_sizes_rejected() {
    let tabu = SolverConfig::from_toml_str(
        r#"
        [[phases]]
        type = "local_search"
        [[phases.acceptors]]
        type = "move_tabu"
        move_tabu_size = 0
    "#,
    );
    assert!(matches!(tabu, Err(ConfigError::Invalid(_))));

    let threads = SolverConfig::new().with_move_thread_count(MoveThreadCount::Count(0));
    assert!(matches!(threads.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_move_thread_count_resolve() {
    assert_eq!(MoveThreadCount::None.resolve(), 1);
    assert_eq!(MoveThreadCount::Count(4).resolve(), 4);
    assert!(MoveThreadCount::Auto.resolve() >= 1);
}

#[test]
fn test_load_picks_format_by_extension() {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("planforge-config-{}.yaml", std::process::id()));
    std::fs::write(&path, "random_seed: 11\n").unwrap();

    let config = SolverConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(config.random_seed, Some(11));

    let missing = SolverConfig::load(dir.join("planforge-config-missing.toml"));
    assert!(matches!(missing, Err(ConfigError::Io(_))));
}
