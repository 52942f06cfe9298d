use crate::core::errors::{ConfigError, ConfigWarning};
use crate::core::execution::line_config::LineConfig;
use crate::core::execution::snapshot::{
    BufferSnapshot, LineSnapshot, MetricsSnapshot, PieceSnapshot, StationSnapshot, StepResult,
};
use crate::core::line::{Buffer, MachineStatus, Piece, PieceTracker, Station};
use crate::core::metrics::analysis::{self, FlowPoint, HistogramBin, LittlesLaw};
use crate::core::metrics::{
    BufferLogEntry, CompletionRecord, ConvergenceStatus, MetricSample, MetricsCollector,
    MetricsLogEntry, StationLogEntry,
};
use crate::core::types::{PieceId, PieceLocation, Tick};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

/// Discrete-time engine for one production line.
///
/// Each call to `step` runs exactly one tick in a fixed order:
/// timers, downstream pushes, upstream pulls, buffer fill accounting.
/// Stations are always visited in line order and machines in index order,
/// so a seeded engine replays the same piece timeline every run.
#[derive(Debug, Clone)]
pub struct LineEngine {
    run_id: Uuid,
    config: LineConfig,
    stations: Vec<Station>,
    buffers: Vec<Buffer>,
    tracker: PieceTracker,
    metrics: MetricsCollector,
    rng: StdRng,
    current_time: Tick,
    completed: u64,
    warnings: Vec<ConfigWarning>,
}

impl LineEngine {
    /// Build a line from `config`, seeding the random source from
    /// `config.random_seed` or from entropy when no seed is set
    pub fn new(config: LineConfig) -> Result<Self, ConfigError> {
        let rng = seeded_rng(config.random_seed);
        Self::with_rng(config, rng)
    }

    /// Build a line driven by an explicit random source
    pub fn with_rng(config: LineConfig, rng: StdRng) -> Result<Self, ConfigError> {
        let layout = config.layout()?;
        let run_id = Uuid::new_v4();

        for warning in &layout.warnings {
            warn!("[Line:{}] {}", run_id, warning);
        }
        info!(
            "[Line:{}] built {} stations, {} buffers, WIP cap {}",
            run_id,
            layout.stations.len(),
            layout.buffers.len(),
            config.wip
        );

        Ok(Self {
            run_id,
            metrics: MetricsCollector::new(config.warmup_period),
            stations: layout.stations,
            buffers: layout.buffers,
            warnings: layout.warnings,
            tracker: PieceTracker::new(),
            rng,
            current_time: 0,
            completed: 0,
            config,
        })
    }

    /// Run one tick and return its completions together with the resulting state
    pub fn step(&mut self) -> StepResult {
        let completions = self.advance();
        StepResult {
            completions,
            snapshot: self.snapshot(),
        }
    }

    /// Run one tick without building a snapshot
    pub fn advance(&mut self) -> Vec<CompletionRecord> {
        let now = self.current_time;
        let completed_before = self.completed;

        for station in &mut self.stations {
            station.advance_timers();
        }
        let completions = self.push_downstream(now);
        self.pull_upstream(now);
        for buffer in &mut self.buffers {
            buffer.accumulate_fill();
        }

        self.current_time += 1;
        let wip = self.total_wip();
        self.metrics.observe_tick(now, wip);
        if self.current_time % self.config.log_step == 0 {
            self.take_sample(wip);
        }
        for milestone in analysis::milestones_crossed(completed_before, self.completed, self.current_time) {
            info!("[Line:{}] milestone: {} at T={}", self.run_id, milestone, self.current_time);
        }

        completions
    }

    /// Run `ticks` ticks and return how many pieces completed meanwhile
    pub fn run_for(&mut self, ticks: u64) -> usize {
        (0..ticks).map(|_| self.advance().len()).sum()
    }

    /// Finished batches leave blocked machines: the last station ships them,
    /// the others move them into a buffer with room. Zero-capacity buffers
    /// are left to the pull phase.
    fn push_downstream(&mut self, now: Tick) -> Vec<CompletionRecord> {
        let mut completions = Vec::new();
        let last = self.stations.len() - 1;

        for s in 0..self.stations.len() {
            for m in 0..self.stations[s].machines().len() {
                if !self.stations[s].machines()[m].is_blocked() {
                    continue;
                }

                if s == last {
                    if let Some(batch) = self.stations[s].release(m) {
                        self.complete_batch(now, batch, &mut completions);
                    }
                    continue;
                }

                let buffer = &mut self.buffers[s];
                if buffer.is_bufferless() {
                    continue;
                }
                if buffer.try_push(self.stations[s].machines()[m].batch()) {
                    if let Some(batch) = self.stations[s].release(m) {
                        self.tracker.relocate(&batch, PieceLocation::Buffer { buffer: s });
                    }
                } else {
                    debug!(
                        "[Line:{}] T={} station {} machine {} blocked, buffer {} full ({}/{})",
                        self.run_id,
                        now,
                        self.stations[s].id,
                        m,
                        s,
                        buffer.current_count(),
                        buffer.capacity
                    );
                }
            }
        }

        completions
    }

    fn complete_batch(&mut self, now: Tick, batch: Vec<Piece>, completions: &mut Vec<CompletionRecord>) {
        for piece in &batch {
            let created_at = self.tracker.retire(piece.id).unwrap_or(piece.created_at);
            let record = CompletionRecord {
                piece: piece.id,
                time: now,
                lead_time: now.saturating_sub(created_at),
            };
            self.metrics.record_completion(record);
            completions.push(record);
        }
        self.completed += batch.len() as u64;
        self.metrics.record_exit(now, batch.len());
    }

    /// Free machines take new work: the first station mints pieces behind the
    /// CONWIP gate, the others pop from their upstream buffer or, without a
    /// buffer, take a finished batch straight off a blocked upstream machine.
    fn pull_upstream(&mut self, now: Tick) {
        for s in 0..self.stations.len() {
            let batch_size = self.stations[s].batch_size;

            for m in 0..self.stations[s].machines().len() {
                if !self.stations[s].machines()[m].is_free() {
                    continue;
                }

                let batch = if s == 0 {
                    match self.admit(now, m, batch_size) {
                        Some(batch) => batch,
                        None => continue,
                    }
                } else if !self.buffers[s - 1].is_bufferless() {
                    match self.buffers[s - 1].try_pop(batch_size) {
                        Some(batch) => batch,
                        None => continue,
                    }
                } else {
                    let upstream = &mut self.stations[s - 1];
                    match upstream
                        .find_blocked_with_batch(batch_size)
                        .and_then(|u| upstream.release(u))
                    {
                        Some(batch) => batch,
                        None => continue,
                    }
                };

                self.start_batch(s, m, batch);
            }
        }
    }

    /// Load `batch` onto machine `machine` of station `station`.
    ///
    /// A refused batch is scrapped and its pieces stop being tracked, so the
    /// live piece count still matches what machines and buffers hold.
    pub(crate) fn start_batch(&mut self, station: usize, machine: usize, batch: Vec<Piece>) -> bool {
        self.tracker
            .relocate(&batch, PieceLocation::Machine { station, machine });
        match self.stations[station].try_start_batch(machine, batch, &mut self.rng) {
            Ok(_) => true,
            Err(refused) => {
                warn!(
                    "[Line:{}] station {} machine {} refused a batch of {}, scrapping it",
                    self.run_id,
                    self.stations[station].id,
                    machine,
                    refused.len()
                );
                for piece in &refused {
                    self.tracker.retire(piece.id);
                }
                false
            }
        }
    }

    /// Mint a batch for the first station if the CONWIP cap leaves room for it
    fn admit(&mut self, now: Tick, machine: usize, batch_size: usize) -> Option<Vec<Piece>> {
        if self.total_wip() + batch_size > self.config.wip {
            return None;
        }
        let location = PieceLocation::Machine { station: 0, machine };
        let batch: Vec<Piece> = (0..batch_size).map(|_| self.tracker.mint(now, location)).collect();
        self.metrics.record_entry(now, batch_size);
        Some(batch)
    }

    fn take_sample(&mut self, wip: usize) {
        let was_converged = self.metrics.convergence().is_converged();
        let Some(sample) = self.metrics.record_sample(self.current_time, wip) else {
            return;
        };

        let entry = self.log_entry(&sample);
        self.metrics.push_log(entry);
        debug!(
            "[Line:{}] T={} throughput={:.1}/h wip={} lead={:.1}",
            self.run_id, sample.time, sample.throughput, sample.wip, sample.lead_time
        );

        let status = self.metrics.convergence();
        if status.is_converged() != was_converged {
            info!("[Line:{}] T={}: {}", self.run_id, self.current_time, status);
        }
    }

    fn log_entry(&self, sample: &MetricSample) -> MetricsLogEntry {
        let stations = self
            .stations
            .iter()
            .map(|station| {
                let free = station.count_with_status(MachineStatus::Free);
                let blocked = station.count_with_status(MachineStatus::Blocked);
                StationLogEntry {
                    id: station.id.clone(),
                    distribution: station.distribution,
                    oee: station.oee,
                    batch_size: station.batch_size,
                    parallel_machines: station.machines().len(),
                    free,
                    busy: station.machines().len() - free,
                    blocked,
                    pieces: station
                        .machines()
                        .iter()
                        .flat_map(|m| m.batch().iter().map(|p| p.id))
                        .collect(),
                }
            })
            .collect();

        let buffers = self
            .buffers
            .iter()
            .map(|buffer| BufferLogEntry {
                capacity: buffer.capacity,
                count: buffer.current_count(),
                pieces: buffer.pieces().map(|p| p.id).collect(),
                average_utilization: buffer.average_utilization(self.current_time),
            })
            .collect();

        MetricsLogEntry {
            time: sample.time,
            warmup_period: self.config.warmup_period,
            throughput: sample.throughput,
            wip: sample.wip,
            wip_cap: self.config.wip,
            lead_time: sample.lead_time,
            stations,
            buffers,
        }
    }

    /// Clear all stations, buffers, pieces, metrics and the clock, keeping the
    /// configuration. A seeded engine is re-seeded so the run replays.
    pub fn reset(&mut self) {
        for station in &mut self.stations {
            station.reset();
        }
        for buffer in &mut self.buffers {
            buffer.clear();
        }
        self.tracker.clear();
        self.metrics.clear();
        self.current_time = 0;
        self.completed = 0;
        if let Some(seed) = self.config.random_seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        info!("[Line:{}] reset", self.run_id);
    }

    pub fn snapshot(&self) -> LineSnapshot {
        LineSnapshot {
            time: self.current_time,
            completed: self.completed,
            stations: self.stations.iter().map(StationSnapshot::from).collect(),
            buffers: self.buffers.iter().map(BufferSnapshot::from).collect(),
            pieces: self
                .tracker
                .iter()
                .map(|(&id, tracked)| PieceSnapshot {
                    id,
                    created_at: tracked.created_at,
                    location: tracked.location,
                })
                .collect(),
            metrics: MetricsSnapshot {
                throughput: self.throughput(),
                average_lead_time: self.average_lead_time(),
                wip: self.total_wip(),
                wip_cap: self.config.wip,
                convergence: self.convergence(),
            },
        }
    }

    /// Pieces held by machines plus pieces queued in buffers
    pub fn total_wip(&self) -> usize {
        let in_machines: usize = self.stations.iter().map(Station::occupancy).sum();
        let in_buffers: usize = self.buffers.iter().map(Buffer::current_count).sum();
        in_machines + in_buffers
    }

    pub fn throughput(&self) -> f64 {
        self.metrics.throughput(self.current_time)
    }

    pub fn average_lead_time(&self) -> f64 {
        self.metrics.average_lead_time()
    }

    pub fn convergence(&self) -> ConvergenceStatus {
        self.metrics.convergence()
    }

    pub fn littles_law(&self) -> Option<LittlesLaw> {
        self.metrics.littles_law()
    }

    pub fn lead_time_histogram(&self) -> Vec<HistogramBin> {
        analysis::lead_time_histogram(self.metrics.lead_times())
    }

    pub fn cumulative_flow(&self) -> Vec<FlowPoint> {
        analysis::cumulative_flow(self.metrics.entries(), self.metrics.exits(), self.current_time)
    }

    pub fn piece_location(&self, id: PieceId) -> Option<PieceLocation> {
        self.tracker.get(id).map(|t| t.location)
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn config(&self) -> &LineConfig {
        &self.config
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn buffers(&self) -> &[Buffer] {
        &self.buffers
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    pub fn current_time(&self) -> Tick {
        self.current_time
    }

    pub fn completed_count(&self) -> u64 {
        self.completed
    }

    /// Number of pieces minted since the last reset
    pub fn pieces_created(&self) -> u64 {
        self.tracker.minted()
    }
}

pub(crate) fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
