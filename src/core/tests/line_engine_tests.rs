use crate::core::errors::{ConfigError, ConfigWarning};
use crate::core::execution::line_config::{LineConfig, Preset, StationConfig};
use crate::core::execution::line_engine::LineEngine;
use crate::core::line::{Distribution, MachineStatus, Piece};
use crate::core::metrics::ConvergenceStatus;
use crate::core::types::{PieceId, PieceLocation};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn station(id: &str, mean: f64) -> StationConfig {
    StationConfig::new(id, Distribution::deterministic(mean))
}

fn single_station(mean: f64, wip: usize) -> LineConfig {
    LineConfig::empty().with_station(station("S1", mean), 0).with_wip(wip)
}

/// Fast upstream feeding a slow downstream through a zero-capacity buffer
fn hand_off_line() -> LineConfig {
    LineConfig::empty()
        .with_station(station("S1", 2.0), 0)
        .with_station(station("S2", 6.0), 0)
        .with_wip(10)
}

fn assert_conserved(engine: &LineEngine) {
    let snapshot = engine.snapshot();
    let wip = engine.total_wip();
    assert_eq!(wip, snapshot.recount_wip());
    assert_eq!(wip, snapshot.pieces.len());
    assert_eq!(wip as u64, engine.pieces_created() - engine.completed_count());
}

#[test]
fn test_single_station_first_completion() {
    let mut engine = LineEngine::new(single_station(5.0, 1)).unwrap();

    for call in 1..=5 {
        let result = engine.step();
        assert!(result.completions.is_empty(), "nothing completes on call {}", call);
    }

    let result = engine.step();
    assert_eq!(result.completions.len(), 1);
    let record = result.completions[0];
    assert_eq!(record.piece, PieceId::new(1));
    assert_eq!(record.time, 5);
    assert_eq!(record.lead_time, 5);
    assert_eq!(result.snapshot.time, 6);
    assert_eq!(result.snapshot.completed, 1);
}

#[test]
fn test_first_piece_location() {
    let mut engine = LineEngine::new(single_station(5.0, 1)).unwrap();
    let snapshot = engine.step().snapshot;

    assert_eq!(snapshot.pieces.len(), 1);
    assert_eq!(snapshot.pieces[0].created_at, 0);
    assert_eq!(
        engine.piece_location(PieceId::new(1)),
        Some(PieceLocation::Machine { station: 0, machine: 0 })
    );
    assert_eq!(snapshot.stations[0].machines[0].status, MachineStatus::Occupied);
    assert_eq!(snapshot.stations[0].machines[0].remaining_time, 5);
}

#[test]
fn test_zero_capacity_upstream_stays_blocked() {
    let mut engine = LineEngine::new(hand_off_line()).unwrap();

    // P1 finishes S1 on call 3 and is handed straight to S2
    for _ in 0..3 {
        engine.step();
    }
    assert_eq!(engine.stations()[1].machines()[0].status(), MachineStatus::Occupied);

    // P2 finishes S1 on call 6 and waits there while S2 is busy
    for call in 4..=8 {
        let snapshot = engine.step().snapshot;
        if call >= 6 {
            assert_eq!(
                snapshot.stations[0].machines[0].status,
                MachineStatus::Blocked,
                "S1 should be blocked after call {}",
                call
            );
            assert_eq!(snapshot.stations[0].machines[0].batch, vec![PieceId::new(2)]);
            assert_eq!(engine.pieces_created(), 2, "a blocked machine takes no new work");
        }
    }

    let result = engine.step();
    assert_eq!(result.completions.len(), 1);
    assert_eq!(result.completions[0].piece, PieceId::new(1));
    assert_eq!(result.completions[0].time, 8);
    assert_eq!(result.completions[0].lead_time, 8);

    let s1 = &result.snapshot.stations[0].machines[0];
    let s2 = &result.snapshot.stations[1].machines[0];
    assert_eq!(s1.status, MachineStatus::Free);
    assert_eq!(s2.status, MachineStatus::Occupied);
    assert_eq!(s2.batch, vec![PieceId::new(2)]);
}

#[test]
fn test_conwip_cap_is_never_exceeded() {
    let mut engine = LineEngine::new(LineConfig::default().with_wip(2)).unwrap();
    for _ in 0..2000 {
        engine.advance();
        assert!(engine.total_wip() <= 2);
        assert!(engine.pieces_created() - engine.completed_count() <= 2);
    }
    assert!(engine.completed_count() > 0);
}

#[test]
fn test_conwip_gate_counts_whole_batch() {
    let config = LineConfig::empty()
        .with_station(station("S1", 3.0).with_batch_size(3), 0)
        .with_wip(4);
    let mut engine = LineEngine::new(config).unwrap();

    for _ in 0..100 {
        engine.advance();
        // a second batch of 3 would need a cap of 6
        assert!(engine.total_wip() <= 3);
    }
    assert_eq!(engine.completed_count() % 3, 0);
}

#[test]
fn test_parallel_machines_fill_in_index_order() {
    let config = LineConfig::empty()
        .with_station(station("S1", 4.0).with_parallel_machines(2), 0)
        .with_wip(2);
    let mut engine = LineEngine::new(config).unwrap();
    let snapshot = engine.step().snapshot;

    let machines = &snapshot.stations[0].machines;
    assert_eq!(machines[0].batch, vec![PieceId::new(1)]);
    assert_eq!(machines[1].batch, vec![PieceId::new(2)]);
}

#[test]
fn test_wip_is_conserved_every_tick() {
    for preset in Preset::ALL {
        let mut engine = LineEngine::new(LineConfig::preset(preset)).unwrap();
        for _ in 0..1500 {
            engine.advance();
            assert_conserved(&engine);
        }
    }
}

#[test]
fn test_batches_stay_whole_and_buffers_bounded() {
    let mut engine = LineEngine::new(LineConfig::preset(Preset::HighVolatility)).unwrap();
    for _ in 0..5000 {
        engine.advance();
        for station in engine.stations() {
            for machine in station.machines() {
                let len = machine.batch().len();
                assert!(len == 0 || len == station.batch_size);
                assert_eq!(len == 0, machine.is_free());
            }
        }
        for buffer in engine.buffers() {
            assert!(buffer.current_count() <= buffer.capacity);
        }
    }
    assert!(engine.completed_count() > 0);
}

#[test]
fn test_single_machine_line_completes_in_creation_order() {
    let mut engine = LineEngine::new(LineConfig::preset(Preset::Bottleneck)).unwrap();
    engine.run_for(3000);

    let ids: Vec<PieceId> = engine.metrics().completions().iter().map(|c| c.piece).collect();
    assert!(ids.len() > 100);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_same_seed_same_timeline() {
    let config = LineConfig::preset(Preset::HighVolatility).with_random_seed(Some(7));
    let mut a = LineEngine::new(config.clone()).unwrap();
    let mut b = LineEngine::new(config).unwrap();
    a.run_for(2000);
    b.run_for(2000);

    assert_eq!(a.metrics().completions(), b.metrics().completions());
    assert_eq!(a.snapshot(), b.snapshot());
    assert_ne!(a.run_id(), b.run_id());
}

#[test]
fn test_explicit_rng_matches_seeded_config() {
    let config = LineConfig::preset(Preset::Bottleneck).with_random_seed(Some(11));
    let mut seeded = LineEngine::new(config.clone()).unwrap();
    let mut explicit = LineEngine::with_rng(config, StdRng::seed_from_u64(11)).unwrap();
    seeded.run_for(500);
    explicit.run_for(500);
    assert_eq!(seeded.metrics().completions(), explicit.metrics().completions());
}

#[test]
fn test_reset_replays_seeded_run() {
    let mut engine = LineEngine::new(LineConfig::preset(Preset::HighVolatility)).unwrap();
    engine.run_for(800);
    let first = engine.metrics().completions().to_vec();
    let first_snapshot = engine.snapshot();

    engine.reset();
    assert_eq!(engine.current_time(), 0);
    assert_eq!(engine.completed_count(), 0);
    assert_eq!(engine.total_wip(), 0);
    assert!(engine.snapshot().pieces.is_empty());

    engine.run_for(800);
    assert_eq!(engine.metrics().completions(), first.as_slice());
    assert_eq!(engine.snapshot(), first_snapshot);
}

#[test]
fn test_sampling_follows_log_step() {
    let mut engine = LineEngine::new(LineConfig::default()).unwrap();
    engine.run_for(100);
    assert_eq!(engine.metrics().log().len(), 20);
    assert_eq!(engine.metrics().log()[0].time, 5);

    let mut engine = LineEngine::new(LineConfig::default().with_log_step(1)).unwrap();
    engine.run_for(30);
    assert_eq!(engine.metrics().samples().len(), 30);
    let entry = engine.metrics().log().last().unwrap();
    assert_eq!(entry.stations.len(), 5);
    assert_eq!(entry.buffers.len(), 4);
    assert_eq!(entry.wip_cap, 9);
}

#[test]
fn test_warmup_status_and_throughput() {
    let mut engine = LineEngine::new(LineConfig::default().with_warmup_period(100)).unwrap();
    engine.run_for(50);
    assert_eq!(
        engine.convergence(),
        ConvergenceStatus::WarmingUp {
            current: 50,
            warmup: 100
        }
    );
    assert_eq!(engine.throughput(), 0.0);
    assert!(engine.metrics().log().is_empty());

    engine.run_for(100);
    assert!(engine.throughput() > 0.0);
    assert!(engine.metrics().completions().iter().any(|c| c.time <= 100));
    assert!(engine.metrics().lead_times().len() < engine.metrics().completions().len());
}

#[test]
fn test_balanced_line_reaches_steady_state() {
    let mut engine = LineEngine::new(LineConfig::preset(Preset::Balanced)).unwrap();
    engine.run_for(5000);

    assert!(engine.convergence().is_converged(), "{}", engine.convergence());
    // one piece every 5 ticks
    assert!((engine.throughput() - 720.0).abs() < 10.0);
}

#[test]
fn test_littles_law_on_bottleneck_line() {
    let config = LineConfig::preset(Preset::Bottleneck).with_warmup_period(1000);
    let mut engine = LineEngine::new(config).unwrap();
    engine.run_for(50_000);

    let law = engine.littles_law().unwrap();
    assert!(
        law.holds_within(0.15),
        "observed {:.2} vs predicted {:.2}",
        law.average_wip,
        law.predicted_wip
    );
}

#[test]
fn test_analysis_views() {
    let mut engine = LineEngine::new(LineConfig::preset(Preset::Bottleneck)).unwrap();
    engine.run_for(2000);

    let histogram = engine.lead_time_histogram();
    let total: usize = histogram.iter().map(|b| b.count).sum();
    assert_eq!(total, engine.metrics().lead_times().len());

    let flow = engine.cumulative_flow();
    let last = flow.last().unwrap();
    assert_eq!(last.time, engine.current_time());
    assert_eq!(last.entered - last.exited, engine.total_wip());
    assert!(flow.windows(2).all(|w| w[0].entered <= w[1].entered && w[0].exited <= w[1].exited));

    for station in engine.stations() {
        assert!(station.utilization() > 0.0 && station.utilization() <= 1.0);
        assert!(station.processing_ratio() <= station.utilization());
    }
}

#[test]
fn test_invalid_config_is_rejected() {
    assert!(matches!(LineEngine::new(LineConfig::empty()), Err(ConfigError::EmptyLine)));

    let mismatched = LineConfig::empty()
        .with_station(station("S1", 2.0), 0)
        .with_station(station("S2", 2.0).with_batch_size(2), 0);
    assert!(matches!(
        LineEngine::new(mismatched),
        Err(ConfigError::HandOffBatchMismatch { .. })
    ));
}

#[test]
fn test_low_oee_warning_is_kept() {
    let config = LineConfig::empty().with_station(station("S1", 1.0).with_oee(0.005), 0);
    let engine = LineEngine::new(config).unwrap();
    assert!(matches!(engine.warnings(), [ConfigWarning::OeeClamped { .. }]));
}

#[test]
fn test_full_buffer_blocks_upstream_and_stops_admission() {
    let config = LineConfig::empty()
        .with_station(station("S1", 1.0), 0)
        .with_station(station("S2", 10.0), 1)
        .with_wip(20);
    let mut engine = LineEngine::new(config).unwrap();

    // P1 goes straight through the buffer into S2, P2 fills the buffer, P3 is stuck on S1
    for call in 1..=11 {
        let snapshot = engine.step().snapshot;
        if call >= 4 {
            assert_eq!(snapshot.buffers[0].pieces, vec![PieceId::new(2)], "call {}", call);
            let s1 = &snapshot.stations[0].machines[0];
            assert_eq!(s1.status, MachineStatus::Blocked, "call {}", call);
            assert_eq!(s1.batch, vec![PieceId::new(3)]);
            assert_eq!(engine.pieces_created(), 3, "no admission while S1 is blocked");
        }
    }

    // S2 ships P1 and pops P2; S1 was visited first and is still blocked
    let result = engine.step();
    assert_eq!(result.completions.len(), 1);
    assert_eq!(result.completions[0].time, 11);
    assert!(result.snapshot.buffers[0].pieces.is_empty());
    assert_eq!(result.snapshot.stations[0].machines[0].status, MachineStatus::Blocked);
    assert_eq!(result.snapshot.stations[1].machines[0].batch, vec![PieceId::new(2)]);
    assert_eq!(engine.pieces_created(), 3);

    // next push phase moves P3 into the freed slot and S1 admits P4
    let snapshot = engine.step().snapshot;
    assert_eq!(snapshot.buffers[0].pieces, vec![PieceId::new(3)]);
    assert_eq!(snapshot.stations[0].machines[0].status, MachineStatus::Occupied);
    assert_eq!(snapshot.stations[0].machines[0].batch, vec![PieceId::new(4)]);
    assert_eq!(engine.pieces_created(), 4);
    assert_eq!(
        engine.piece_location(PieceId::new(3)),
        Some(PieceLocation::Buffer { buffer: 0 })
    );
}

#[test]
fn test_throughput_after_warmup_is_exact() {
    // one piece per tick from tick 1 on
    let mut engine = LineEngine::new(single_station(1.0, 1).with_warmup_period(10)).unwrap();
    engine.run_for(20);

    assert_eq!(engine.completed_count(), 19);
    assert_eq!(engine.metrics().lead_times().len(), 10);
    assert!((engine.throughput() - 3600.0).abs() < 1e-9, "got {}", engine.throughput());
}

#[test]
fn test_refused_batch_is_scrapped() {
    let mut engine = LineEngine::new(single_station(2.0, 1)).unwrap();
    let batch: Vec<Piece> = (1..=2)
        .map(|id| Piece {
            id: PieceId::new(id),
            created_at: 0,
        })
        .collect();

    // the station takes batches of one
    assert!(!engine.start_batch(0, 0, batch));
    assert!(engine.stations()[0].machines()[0].is_free());
    assert_eq!(engine.total_wip(), 0);
    assert!(engine.snapshot().pieces.is_empty());
}
