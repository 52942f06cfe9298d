use linesim::core::execution::snapshot::BufferSnapshot;
use linesim::{
    ConcurrencyMode, ConfigError, Distribution, DistributionKind, ExecutionConfig, LineConfig,
    LineEngine, MachineStatus, PieceLocation, Preset, ScenarioError, ScenarioRunner,
    SimulationEngine, StationConfig,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Three-station line with a two-machine middle station
fn cell_line() -> LineConfig {
    LineConfig::empty()
        .with_station(StationConfig::new("cut", Distribution::uniform(2.0, 4.0)), 0)
        .with_station(
            StationConfig::new("weld", Distribution::normal(6.0, 1.0))
                .with_parallel_machines(2)
                .with_oee(0.9),
            3,
        )
        .with_station(StationConfig::new("paint", Distribution::triangular(2.0, 3.0, 5.0)), 2)
        .with_wip(6)
        .with_random_seed(Some(3))
}

#[test]
fn test_builds_and_runs_custom_line() {
    init_logging();
    let mut engine = LineEngine::new(cell_line()).unwrap();
    let completed = engine.run_for(1000);

    assert_eq!(completed as u64, engine.completed_count());
    assert!(completed > 50);
    assert!(engine.total_wip() <= 6);
    assert_eq!(engine.stations()[1].machines().len(), 2);
}

#[test]
fn test_snapshot_describes_every_live_piece() {
    let mut engine = LineEngine::new(cell_line()).unwrap();
    engine.run_for(137);
    let snapshot = engine.snapshot();

    for piece in &snapshot.pieces {
        match piece.location {
            PieceLocation::Machine { station, machine } => {
                let m = &snapshot.stations[station].machines[machine];
                assert_ne!(m.status, MachineStatus::Free);
                assert!(m.batch.contains(&piece.id));
            }
            PieceLocation::Buffer { buffer } => {
                let b: &BufferSnapshot = &snapshot.buffers[buffer];
                assert!(b.pieces.contains(&piece.id));
            }
        }
        assert!(piece.created_at < snapshot.time);
    }
    assert_eq!(snapshot.metrics.wip, snapshot.pieces.len());
    assert_eq!(snapshot.metrics.wip_cap, 6);
}

#[test]
fn test_config_errors_are_reported() {
    let mut config = cell_line();
    config.buffer_capacities.pop();
    assert!(matches!(
        LineEngine::new(config),
        Err(ConfigError::BufferCountMismatch { stations: 3, buffers: 1 })
    ));

    let mut config = cell_line();
    config.stations[0].distribution = Distribution::uniform(4.0, 2.0);
    let err = LineEngine::new(config).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidDistribution { .. }));
    assert!(err.to_string().contains("cut"));

    let config = cell_line().with_log_step(0);
    assert!(matches!(LineEngine::new(config), Err(ConfigError::InvalidLogStep)));
}

#[test]
fn test_distribution_kind_names() {
    assert_eq!(DistributionKind::Triangular.to_string(), "triangular");
    assert_eq!(Distribution::exponential(3.0).kind, DistributionKind::Exponential);
}

#[test]
fn test_driver_runs_to_horizon() {
    let mut sim = SimulationEngine::new(LineConfig::preset(Preset::Bottleneck), Some(600)).unwrap();
    assert_eq!(sim.run(), 600);
    assert!(sim.line().throughput() > 0.0);
}

#[test]
fn test_sequential_and_rayon_scenarios_agree() {
    init_logging();
    let sequential = ScenarioRunner::presets(3000)
        .with_scenario("cell", cell_line())
        .run()
        .unwrap();
    let parallel = ScenarioRunner::presets(3000)
        .with_scenario("cell", cell_line())
        .with_execution(
            ExecutionConfig::new()
                .with_concurrency(ConcurrencyMode::Rayon)
                .with_thread_pool_size(2),
        )
        .run()
        .unwrap();

    assert_eq!(sequential.len(), 4);
    assert_eq!(sequential, parallel);
    assert_eq!(parallel[3].name, "cell");
}

#[test]
fn test_invalid_scenario_prevents_run() {
    let result = ScenarioRunner::new(100)
        .with_scenario("empty", LineConfig::empty())
        .with_execution(ExecutionConfig::new().with_concurrency(ConcurrencyMode::Rayon))
        .run();
    assert!(matches!(result, Err(ScenarioError::Config { .. })));
}
