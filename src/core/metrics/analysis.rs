use crate::core::types::Tick;
use serde::{Deserialize, Serialize};

pub const HISTOGRAM_BINS: usize = 10;
pub const PIECE_MILESTONES: [u64; 4] = [100, 500, 1000, 5000];
pub const TIME_MILESTONES: [Tick; 3] = [1000, 5000, 10000];

/// A batch crossing the line boundary at `time`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEvent {
    pub time: Tick,
    pub count: usize,
}

/// Cumulative arrivals and departures up to and including `time`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowPoint {
    pub time: Tick,
    pub entered: usize,
    pub exited: usize,
}

/// Cumulative flow diagram sampled at 0, every event time, and `current_time`.
///
/// Both event lists must be in time order, which is how the engine records them.
pub fn cumulative_flow(entries: &[FlowEvent], exits: &[FlowEvent], current_time: Tick) -> Vec<FlowPoint> {
    let mut times: Vec<Tick> = std::iter::once(0)
        .chain(entries.iter().map(|e| e.time))
        .chain(exits.iter().map(|e| e.time))
        .chain(std::iter::once(current_time))
        .collect();
    times.sort_unstable();
    times.dedup();

    let (mut entered, mut exited) = (0, 0);
    let (mut ei, mut xi) = (0, 0);
    times
        .into_iter()
        .map(|time| {
            while ei < entries.len() && entries[ei].time <= time {
                entered += entries[ei].count;
                ei += 1;
            }
            while xi < exits.len() && exits[xi].time <= time {
                exited += exits[xi].count;
                xi += 1;
            }
            FlowPoint {
                time,
                entered,
                exited,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width histogram of lead times between the observed min and max
pub fn lead_time_histogram(lead_times: &[Tick]) -> Vec<HistogramBin> {
    let (Some(&min), Some(&max)) = (lead_times.iter().min(), lead_times.iter().max()) else {
        return Vec::new();
    };

    let min = min as f64;
    let width = match (max as f64 - min) / HISTOGRAM_BINS as f64 {
        w if w > 0.0 => w,
        _ => 1.0,
    };

    let mut bins: Vec<HistogramBin> = (0..HISTOGRAM_BINS)
        .map(|i| HistogramBin {
            start: min + i as f64 * width,
            end: min + (i + 1) as f64 * width,
            count: 0,
        })
        .collect();

    for &lt in lead_times {
        let index = (((lt as f64 - min) / width) as usize).min(HISTOGRAM_BINS - 1);
        bins[index].count += 1;
    }
    bins
}

/// Little's Law check: average WIP against throughput times lead time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LittlesLaw {
    pub average_wip: f64,
    pub throughput_per_tick: f64,
    pub average_lead_time: f64,
    pub predicted_wip: f64,
    /// |observed - predicted| / observed, 0 when nothing was observed
    pub relative_error: f64,
}

impl LittlesLaw {
    pub fn new(average_wip: f64, throughput_per_tick: f64, average_lead_time: f64) -> Self {
        let predicted_wip = throughput_per_tick * average_lead_time;
        let relative_error = if average_wip > 0.0 {
            (average_wip - predicted_wip).abs() / average_wip
        } else {
            0.0
        };
        Self {
            average_wip,
            throughput_per_tick,
            average_lead_time,
            predicted_wip,
            relative_error,
        }
    }

    pub fn holds_within(&self, tolerance: f64) -> bool {
        self.relative_error <= tolerance
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Milestone {
    PiecesCompleted(u64),
    TimeReached(Tick),
}

impl std::fmt::Display for Milestone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Milestone::PiecesCompleted(n) => write!(f, "{} pieces completed", n),
            Milestone::TimeReached(t) => write!(f, "simulation reached T={}", t),
        }
    }
}

/// Milestones crossed by a tick that moved the completed count from
/// `completed_before` to `completed_after` and ended at `time`
pub fn milestones_crossed(completed_before: u64, completed_after: u64, time: Tick) -> Vec<Milestone> {
    PIECE_MILESTONES
        .iter()
        .filter(|&&m| completed_before < m && completed_after >= m)
        .map(|&m| Milestone::PiecesCompleted(m))
        .chain(
            TIME_MILESTONES
                .iter()
                .filter(|&&m| m == time)
                .map(|&m| Milestone::TimeReached(m)),
        )
        .collect()
}
