use linesim::{
    ConcurrencyMode, ExecutionConfig, LineConfig, Preset, ScenarioRunner, SimulationEngine,
};

const HORIZON: u64 = 20_000;
const WARMUP: u64 = 1_000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .init();

    println!("Starting CONWIP line simulation");
    println!();

    // Detailed run of the default line
    let mut sim = SimulationEngine::new(LineConfig::default().with_warmup_period(WARMUP), Some(HORIZON))?;
    println!("Configuration:");
    for station in &sim.line().config().stations {
        println!(
            "  {}: {} mean={:.1} oee={:.2} batch={} machines={}",
            station.id,
            station.distribution.kind,
            station.distribution.params.mean,
            station.oee,
            station.batch_size,
            station.parallel_machines
        );
    }
    println!("  Buffers: {:?}", sim.line().config().buffer_capacities);
    println!("  WIP cap: {}", sim.line().config().wip);
    println!();

    let ticks = sim.run();
    let line = sim.line();
    println!("Default line after {} ticks:", ticks);
    println!("  Completed: {}", line.completed_count());
    println!("  Throughput: {:.1} pieces/h", line.throughput());
    println!("  Average lead time: {:.1} ticks", line.average_lead_time());
    println!("  Status: {}", line.convergence());
    for station in line.stations() {
        println!(
            "  {} utilization {:.1}% (processing {:.1}%)",
            station.id,
            station.utilization() * 100.0,
            station.processing_ratio() * 100.0
        );
    }
    for buffer in line.buffers() {
        println!(
            "  buffer {} average fill {:.1}%",
            buffer.index,
            buffer.average_utilization(line.current_time()) * 100.0
        );
    }
    if let Some(law) = line.littles_law() {
        println!(
            "  Little's Law: observed WIP {:.2}, predicted {:.2} ({:.1}% off)",
            law.average_wip,
            law.predicted_wip,
            law.relative_error * 100.0
        );
    }
    println!("  Lead-time histogram:");
    for bin in line.lead_time_histogram() {
        println!("    [{:>6.1}, {:>6.1}) {}", bin.start, bin.end, bin.count);
    }
    println!();

    // Compare the presets in parallel
    let runner = Preset::ALL
        .iter()
        .fold(ScenarioRunner::new(HORIZON), |runner, &preset| {
            runner.with_scenario(
                preset.name(),
                LineConfig::preset(preset).with_warmup_period(WARMUP),
            )
        })
        .with_execution(ExecutionConfig::new().with_concurrency(ConcurrencyMode::Rayon));

    println!("Preset comparison over {} ticks:", HORIZON);
    for outcome in runner.run()? {
        println!(
            "  {:<16} completed={:<6} throughput={:>6.1}/h lead={:>6.1} wip={} | {}",
            outcome.name,
            outcome.completed,
            outcome.throughput,
            outcome.average_lead_time,
            outcome.final_wip,
            outcome.convergence
        );
    }

    Ok(())
}
