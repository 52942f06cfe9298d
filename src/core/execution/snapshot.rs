use crate::core::line::{Buffer, Machine, MachineStatus, Station};
use crate::core::metrics::{CompletionRecord, ConvergenceStatus};
use crate::core::types::{PieceId, PieceLocation, StationId, Tick};
use serde::{Deserialize, Serialize};

/// Read-only copy of one machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineSnapshot {
    pub status: MachineStatus,
    pub remaining_time: u64,
    pub batch: Vec<PieceId>,
}

impl From<&Machine> for MachineSnapshot {
    fn from(machine: &Machine) -> Self {
        Self {
            status: machine.status(),
            remaining_time: machine.remaining_time(),
            batch: machine.batch().iter().map(|p| p.id).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSnapshot {
    pub id: StationId,
    pub index: usize,
    pub batch_size: usize,
    pub machines: Vec<MachineSnapshot>,
    pub working_time: u64,
    pub processing_time: u64,
    pub total_time: u64,
}

impl From<&Station> for StationSnapshot {
    fn from(station: &Station) -> Self {
        Self {
            id: station.id.clone(),
            index: station.index,
            batch_size: station.batch_size,
            machines: station.machines().iter().map(MachineSnapshot::from).collect(),
            working_time: station.working_time(),
            processing_time: station.processing_time(),
            total_time: station.total_time(),
        }
    }
}

impl StationSnapshot {
    pub fn occupancy(&self) -> usize {
        self.machines.iter().map(|m| m.batch.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferSnapshot {
    pub index: usize,
    pub capacity: usize,
    /// Queued pieces, oldest first
    pub pieces: Vec<PieceId>,
    pub cumulative_fill: u64,
}

impl From<&Buffer> for BufferSnapshot {
    fn from(buffer: &Buffer) -> Self {
        Self {
            index: buffer.index,
            capacity: buffer.capacity,
            pieces: buffer.pieces().map(|p| p.id).collect(),
            cumulative_fill: buffer.cumulative_fill(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSnapshot {
    pub id: PieceId,
    pub created_at: Tick,
    pub location: PieceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Pieces per hour since the warm-up period
    pub throughput: f64,
    pub average_lead_time: f64,
    pub wip: usize,
    pub wip_cap: usize,
    pub convergence: ConvergenceStatus,
}

/// State of the whole line between two ticks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSnapshot {
    pub time: Tick,
    pub completed: u64,
    pub stations: Vec<StationSnapshot>,
    pub buffers: Vec<BufferSnapshot>,
    /// Live pieces in creation order
    pub pieces: Vec<PieceSnapshot>,
    pub metrics: MetricsSnapshot,
}

impl LineSnapshot {
    /// WIP recomputed from machine batches and buffer contents
    pub fn recount_wip(&self) -> usize {
        let in_machines: usize = self.stations.iter().map(StationSnapshot::occupancy).sum();
        let in_buffers: usize = self.buffers.iter().map(|b| b.pieces.len()).sum();
        in_machines + in_buffers
    }
}

/// Outcome of a single tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// Pieces that left the last station during this tick
    pub completions: Vec<CompletionRecord>,
    pub snapshot: LineSnapshot,
}
