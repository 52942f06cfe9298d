use super::analysis::{FlowEvent, LittlesLaw};
use super::convergence::{ConvergenceDetector, ConvergenceStatus};
use super::report::MetricsLogEntry;
use crate::core::types::{PieceId, Tick};
use serde::{Deserialize, Serialize};

/// Number of most recent lead times averaged for the reported lead time
pub const LEAD_TIME_WINDOW: usize = 20;
const SECONDS_PER_HOUR: f64 = 3600.0;

/// A piece leaving the last station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub piece: PieceId,
    pub time: Tick,
    pub lead_time: Tick,
}

/// Values recorded at one sampling point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub time: Tick,
    pub throughput: f64,
    pub wip: usize,
    pub lead_time: f64,
}

/// Completion history and derived line metrics.
///
/// Completions stamped before the warm-up period ends stay in the history
/// but never count toward throughput, lead time or Little's Law.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    warmup_period: Tick,
    detector: ConvergenceDetector,
    completions: Vec<CompletionRecord>,
    reported_completions: u64,
    lead_times: Vec<Tick>,
    samples: Vec<MetricSample>,
    throughput_series: Vec<f64>,
    entries: Vec<FlowEvent>,
    exits: Vec<FlowEvent>,
    observed_ticks: u64,
    wip_ticks: u64,
    log: Vec<MetricsLogEntry>,
    status: ConvergenceStatus,
}

impl MetricsCollector {
    pub fn new(warmup_period: Tick) -> Self {
        Self::with_detector(warmup_period, ConvergenceDetector::default())
    }

    pub fn with_detector(warmup_period: Tick, detector: ConvergenceDetector) -> Self {
        Self {
            warmup_period,
            detector,
            completions: Vec::new(),
            reported_completions: 0,
            lead_times: Vec::new(),
            samples: Vec::new(),
            throughput_series: Vec::new(),
            entries: Vec::new(),
            exits: Vec::new(),
            observed_ticks: 0,
            wip_ticks: 0,
            log: Vec::new(),
            status: ConvergenceStatus::WarmingUp {
                current: 0,
                warmup: warmup_period,
            },
        }
    }

    pub fn warmup_period(&self) -> Tick {
        self.warmup_period
    }

    /// Whether the tick stamped `time` lies after the warm-up period.
    /// Tick `t` ends with the clock at `t + 1`, so it counts once that
    /// clock value passes `warmup_period`.
    fn counts(&self, time: Tick) -> bool {
        time + 1 > self.warmup_period
    }

    pub fn record_completion(&mut self, record: CompletionRecord) {
        if self.counts(record.time) {
            self.reported_completions += 1;
            self.lead_times.push(record.lead_time);
        }
        self.completions.push(record);
    }

    /// Pieces minted at the first station
    pub fn record_entry(&mut self, time: Tick, count: usize) {
        self.entries.push(FlowEvent { time, count });
    }

    /// Pieces leaving the last station in one batch
    pub fn record_exit(&mut self, time: Tick, count: usize) {
        self.exits.push(FlowEvent { time, count });
    }

    /// Account the WIP left at the end of tick `time`
    pub fn observe_tick(&mut self, time: Tick, wip: usize) {
        if self.counts(time) {
            self.observed_ticks += 1;
            self.wip_ticks += wip as u64;
        }
    }

    /// Pieces per hour completed after the warm-up period, with one tick taken as one second
    pub fn throughput(&self, current_time: Tick) -> f64 {
        if current_time <= self.warmup_period {
            return 0.0;
        }
        let window = (current_time - self.warmup_period) as f64;
        self.reported_completions as f64 / window * SECONDS_PER_HOUR
    }

    /// Mean of the most recent post-warm-up lead times, 0 if none yet
    pub fn average_lead_time(&self) -> f64 {
        let start = self.lead_times.len().saturating_sub(LEAD_TIME_WINDOW);
        mean(&self.lead_times[start..])
    }

    /// Take a periodic sample at `current_time`.
    ///
    /// Returns the sample when it was recorded, `None` during warm-up.
    pub fn record_sample(&mut self, current_time: Tick, wip: usize) -> Option<MetricSample> {
        if current_time <= self.warmup_period {
            self.status = ConvergenceStatus::WarmingUp {
                current: current_time,
                warmup: self.warmup_period,
            };
            return None;
        }

        let sample = MetricSample {
            time: current_time,
            throughput: self.throughput(current_time),
            wip,
            lead_time: self.average_lead_time(),
        };
        self.samples.push(sample);
        // whole pieces per hour, so sub-unit jitter does not move the CV
        self.throughput_series.push(sample.throughput.round());
        self.status = self.detector.evaluate(&self.throughput_series);
        Some(sample)
    }

    pub fn push_log(&mut self, entry: MetricsLogEntry) {
        self.log.push(entry);
    }

    pub fn convergence(&self) -> ConvergenceStatus {
        self.status
    }

    pub fn completions(&self) -> &[CompletionRecord] {
        &self.completions
    }

    /// Lead times of completions after the warm-up period, in completion order
    pub fn lead_times(&self) -> &[Tick] {
        &self.lead_times
    }

    pub fn samples(&self) -> &[MetricSample] {
        &self.samples
    }

    pub fn entries(&self) -> &[FlowEvent] {
        &self.entries
    }

    pub fn exits(&self) -> &[FlowEvent] {
        &self.exits
    }

    /// Full periodic log, oldest first
    pub fn log(&self) -> &[MetricsLogEntry] {
        &self.log
    }

    /// Compare time-averaged WIP with throughput times lead time over the
    /// post-warm-up period. `None` until something has completed.
    pub fn littles_law(&self) -> Option<LittlesLaw> {
        if self.observed_ticks == 0 || self.lead_times.is_empty() {
            return None;
        }
        let average_wip = self.wip_ticks as f64 / self.observed_ticks as f64;
        let throughput_per_tick = self.reported_completions as f64 / self.observed_ticks as f64;
        let lead_time = mean(&self.lead_times);
        Some(LittlesLaw::new(average_wip, throughput_per_tick, lead_time))
    }

    pub fn clear(&mut self) {
        *self = Self::with_detector(self.warmup_period, self.detector);
    }
}

fn mean(values: &[Tick]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<u64>() as f64 / values.len() as f64
    }
}
