use super::distribution::{self, Distribution};
use super::machine::{Machine, MachineStatus};
use super::piece::Piece;
use crate::core::types::StationId;
use log::debug;
use rand::Rng;

/// A position in the line: a set of identical parallel machines sharing a
/// batch size and a processing-time distribution.
///
/// The station never drives itself; the engine calls its hooks once per tick.
#[derive(Debug, Clone)]
pub struct Station {
    pub id: StationId,
    pub index: usize,
    pub batch_size: usize,
    pub oee: f64,
    pub distribution: Distribution,
    machines: Vec<Machine>,
    working_time: u64,
    processing_time: u64,
    total_time: u64,
}

impl Station {
    pub fn new(
        id: StationId,
        index: usize,
        batch_size: usize,
        parallel_machines: usize,
        oee: f64,
        distribution: Distribution,
    ) -> Self {
        Self {
            id,
            index,
            batch_size,
            oee,
            distribution,
            machines: (0..parallel_machines).map(|_| Machine::new()).collect(),
            working_time: 0,
            processing_time: 0,
            total_time: 0,
        }
    }

    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    pub fn machine(&self, index: usize) -> Option<&Machine> {
        self.machines.get(index)
    }

    /// Ticks during which at least one machine held a batch
    pub fn working_time(&self) -> u64 {
        self.working_time
    }

    /// Ticks during which at least one machine's timer was running
    pub fn processing_time(&self) -> u64 {
        self.processing_time
    }

    pub fn total_time(&self) -> u64 {
        self.total_time
    }

    /// Step 1 of a tick: run every loaded timer down by one and block the
    /// machines whose timer just expired.
    pub fn advance_timers(&mut self) {
        self.total_time += 1;
        let mut any_working = false;
        let mut any_processing = false;

        for index in 0..self.machines.len() {
            let machine = &mut self.machines[index];
            if machine.batch().is_empty() {
                continue;
            }
            any_working = true;
            if machine.tick() {
                any_processing = true;
                if machine.remaining_time() == 0 {
                    self.on_timer_expired(index);
                }
            }
        }

        if any_working {
            self.working_time += 1;
        }
        if any_processing {
            self.processing_time += 1;
        }
    }

    /// Load `batch` onto a free machine with a freshly sampled duration.
    ///
    /// Returns the sampled duration; the batch comes back untouched if the
    /// machine is not free or the batch does not match the station's batch size.
    /// No randomness is consumed on refusal.
    pub fn try_start_batch<R: Rng + ?Sized>(
        &mut self,
        machine: usize,
        batch: Vec<Piece>,
        rng: &mut R,
    ) -> Result<u64, Vec<Piece>> {
        if batch.len() != self.batch_size {
            return Err(batch);
        }
        let Some(target) = self.machines.get_mut(machine) else {
            return Err(batch);
        };
        if !target.is_free() {
            return Err(batch);
        }

        let duration = distribution::sample(&self.distribution, self.oee, rng);
        target.load(batch, duration)?;
        debug!(
            "[Station:{}] machine {} started batch of {} for {} ticks",
            self.id, machine, self.batch_size, duration
        );
        Ok(duration)
    }

    /// Mark a machine whose timer reached zero as blocked
    pub fn on_timer_expired(&mut self, machine: usize) {
        if let Some(m) = self.machines.get_mut(machine) {
            m.mark_blocked();
        }
    }

    /// Take the finished batch off a blocked machine, freeing it
    pub fn release(&mut self, machine: usize) -> Option<Vec<Piece>> {
        self.machines.get_mut(machine)?.release()
    }

    /// First blocked machine holding a batch of exactly `batch_len` pieces
    pub fn find_blocked_with_batch(&self, batch_len: usize) -> Option<usize> {
        self.machines
            .iter()
            .position(|m| m.is_blocked() && m.batch().len() == batch_len)
    }

    pub fn count_with_status(&self, status: MachineStatus) -> usize {
        self.machines.iter().filter(|m| m.status() == status).count()
    }

    /// Pieces currently held by this station's machines
    pub fn occupancy(&self) -> usize {
        self.machines.iter().map(|m| m.batch().len()).sum()
    }

    pub fn utilization(&self) -> f64 {
        ratio(self.working_time, self.total_time)
    }

    pub fn processing_ratio(&self) -> f64 {
        ratio(self.processing_time, self.total_time)
    }

    pub fn reset(&mut self) {
        let count = self.machines.len();
        self.machines = (0..count).map(|_| Machine::new()).collect();
        self.working_time = 0;
        self.processing_time = 0;
        self.total_time = 0;
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
