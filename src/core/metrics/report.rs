use crate::core::line::Distribution;
use crate::core::types::{PieceId, StationId, Tick};
use serde::{Deserialize, Serialize};

/// Station state at a sampling point, alongside the settings that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationLogEntry {
    pub id: StationId,
    pub distribution: Distribution,
    pub oee: f64,
    pub batch_size: usize,
    pub parallel_machines: usize,
    pub free: usize,
    /// Occupied plus blocked machines
    pub busy: usize,
    pub blocked: usize,
    pub pieces: Vec<PieceId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferLogEntry {
    pub capacity: usize,
    pub count: usize,
    pub pieces: Vec<PieceId>,
    /// Mean occupancy since the start of the run, as a fraction of capacity
    pub average_utilization: f64,
}

/// One row of the exported metrics log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsLogEntry {
    pub time: Tick,
    pub warmup_period: Tick,
    /// Pieces per hour
    pub throughput: f64,
    pub wip: usize,
    pub wip_cap: usize,
    pub lead_time: f64,
    pub stations: Vec<StationLogEntry>,
    pub buffers: Vec<BufferLogEntry>,
}
