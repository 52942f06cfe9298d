use super::piece::Piece;
use serde::{Deserialize, Serialize};

/// Lifecycle of a single machine: Free -> Occupied -> Blocked -> Free
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineStatus {
    /// No batch loaded
    Free,
    /// Processing a batch, timer still running
    Occupied,
    /// Finished, waiting for downstream to accept the batch
    Blocked,
}

impl std::fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MachineStatus::Free => "free",
            MachineStatus::Occupied => "occupied",
            MachineStatus::Blocked => "blocked",
        };
        write!(f, "{}", name)
    }
}

/// One processing unit of a station. Holds at most one batch; the batch is
/// empty exactly when the machine is free.
#[derive(Debug, Clone)]
pub struct Machine {
    status: MachineStatus,
    batch: Vec<Piece>,
    remaining_time: u64,
}

impl Machine {
    pub fn new() -> Self {
        Self {
            status: MachineStatus::Free,
            batch: Vec::new(),
            remaining_time: 0,
        }
    }

    pub fn status(&self) -> MachineStatus {
        self.status
    }

    pub fn is_free(&self) -> bool {
        self.status == MachineStatus::Free
    }

    pub fn is_blocked(&self) -> bool {
        self.status == MachineStatus::Blocked
    }

    pub fn batch(&self) -> &[Piece] {
        &self.batch
    }

    pub fn remaining_time(&self) -> u64 {
        self.remaining_time
    }

    /// Load a batch for `duration` ticks. Refused unless the machine is free
    /// and the batch is non-empty; a refused batch is handed back.
    pub(crate) fn load(&mut self, batch: Vec<Piece>, duration: u64) -> Result<(), Vec<Piece>> {
        if !self.is_free() || batch.is_empty() {
            return Err(batch);
        }
        self.batch = batch;
        self.remaining_time = duration;
        self.status = MachineStatus::Occupied;
        Ok(())
    }

    /// Run the timer down by one tick. Returns true if the timer moved.
    pub(crate) fn tick(&mut self) -> bool {
        if self.batch.is_empty() || self.remaining_time == 0 {
            return false;
        }
        self.remaining_time -= 1;
        true
    }

    pub(crate) fn mark_blocked(&mut self) {
        if !self.batch.is_empty() && self.remaining_time == 0 {
            self.status = MachineStatus::Blocked;
        }
    }

    /// Hand over a finished batch and become free. Only a blocked machine releases.
    pub(crate) fn release(&mut self) -> Option<Vec<Piece>> {
        if !self.is_blocked() {
            return None;
        }
        self.status = MachineStatus::Free;
        self.remaining_time = 0;
        Some(std::mem::take(&mut self.batch))
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
